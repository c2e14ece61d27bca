//! Completion monitor: polls a session until it reaches a terminal state.
//!
//! Each cycle fetches the session snapshot and, unless the snapshot already
//! carries a pull request output, the most recent activity. The output check
//! always runs first. A `sessionCompleted` activity only ends monitoring for
//! sessions that finish without publishing anything.
//!
//! Progress titles are surfaced as advisory [`MonitorEvent`]s and log lines;
//! they never influence control flow.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, Instrument};

use super::clock::{Clock, TokioClock};
use crate::client::{ActivityReader, SessionClient};
use crate::config::GlobalConfig;
use crate::models::Session;
use crate::{AppError, Result};

/// Polling bounds for one monitor call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorOptions {
    /// Delay between polls.
    pub interval: Duration,
    /// Total wall-clock budget.
    pub timeout: Duration,
}

impl MonitorOptions {
    /// Options with explicit bounds.
    #[must_use]
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Options taken from the `[monitor]` config section.
    #[must_use]
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self::new(config.monitor_interval(), config.monitor_timeout())
    }
}

/// Which signal ended monitoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionSignal {
    /// The session published a pull request.
    Artifact {
        /// Pull request link, when the service reported one.
        url: Option<String>,
    },
    /// The latest activity was `sessionCompleted`.
    Activity,
}

/// Result of a successful monitor call.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Snapshot fetched in the terminating cycle.
    pub session: Session,
    /// Signal that ended monitoring.
    pub signal: CompletionSignal,
    /// Number of poll cycles run, including the terminating one.
    pub cycles: u32,
    /// Time spent monitoring.
    pub elapsed: Duration,
}

/// Advisory notifications emitted while monitoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// A poll cycle started.
    Polled {
        /// Session being monitored.
        session_id: String,
        /// 1-based cycle number.
        cycle: u32,
    },
    /// The latest activity is a progress update.
    Progress {
        /// Session being monitored.
        session_id: String,
        /// Progress headline.
        title: String,
    },
    /// Monitoring finished successfully.
    Completed {
        /// Session being monitored.
        session_id: String,
        /// Signal that ended monitoring.
        signal: CompletionSignal,
    },
}

/// Drives the bounded polling loop for a session.
pub struct CompletionMonitor {
    client: SessionClient,
    activities: ActivityReader,
    clock: Arc<dyn Clock>,
    events: Option<mpsc::Sender<MonitorEvent>>,
}

impl CompletionMonitor {
    /// Monitor using `client` and the real clock.
    #[must_use]
    pub fn new(client: SessionClient) -> Self {
        let activities = client.activities();
        Self {
            client,
            activities,
            clock: Arc::new(TokioClock),
            events: None,
        }
    }

    /// Replace the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Publish advisory events on `tx`.
    ///
    /// Events are sent with `try_send`: a full or closed channel drops the
    /// event and never stalls the loop.
    #[must_use]
    pub fn with_events(mut self, tx: mpsc::Sender<MonitorEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Poll `session_id` until it completes, the budget runs out, or
    /// `cancel` fires.
    ///
    /// # Errors
    ///
    /// - `AppError::Config` if `options.interval` is zero.
    /// - `AppError::MonitorTimeout` once `options.timeout` has elapsed
    ///   without a terminal signal.
    /// - `AppError::Cancelled` if `cancel` fires during a fetch or sleep.
    /// - Any transport or decoding failure, which ends monitoring at once.
    pub async fn monitor(
        &self,
        session_id: &str,
        options: MonitorOptions,
        cancel: &CancellationToken,
    ) -> Result<Completion> {
        if options.interval.is_zero() {
            return Err(AppError::Config(
                "monitor interval must be greater than zero".into(),
            ));
        }

        self.run(session_id, options, cancel)
            .instrument(info_span!("completion_monitor", session_id))
            .await
    }

    async fn run(
        &self,
        session_id: &str,
        options: MonitorOptions,
        cancel: &CancellationToken,
    ) -> Result<Completion> {
        let started = self.clock.now();
        // A budget too large to represent as an instant has no deadline.
        let deadline = started.checked_add(options.timeout);
        let mut cycles: u32 = 0;

        info!(
            interval_secs = options.interval.as_secs(),
            timeout_secs = options.timeout.as_secs(),
            "monitoring session"
        );

        while before(deadline, self.clock.now()) {
            cycles += 1;
            self.emit(MonitorEvent::Polled {
                session_id: session_id.to_owned(),
                cycle: cycles,
            });

            let polled = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(cancelled(session_id, cycles)),
                polled = self.poll_once(session_id) => polled?,
            };

            if let Some((session, signal)) = polled {
                let elapsed = self.clock.now().saturating_duration_since(started);
                info!(cycles, elapsed_secs = elapsed.as_secs(), ?signal, "session complete");
                self.emit(MonitorEvent::Completed {
                    session_id: session_id.to_owned(),
                    signal: signal.clone(),
                });
                return Ok(Completion {
                    session,
                    signal,
                    cycles,
                    elapsed,
                });
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(cancelled(session_id, cycles)),
                () = self.clock.sleep(options.interval) => {}
            }
        }

        let elapsed = self.clock.now().saturating_duration_since(started);
        info!(cycles, elapsed_secs = elapsed.as_secs(), "monitor deadline elapsed");
        Err(AppError::MonitorTimeout {
            session_id: session_id.to_owned(),
            elapsed,
        })
    }

    /// One cycle: outputs first, then the latest activity.
    async fn poll_once(&self, session_id: &str) -> Result<Option<(Session, CompletionSignal)>> {
        let session = self.client.get_session(session_id).await?;

        if let Some(pr) = session.pull_request() {
            let url = pr.url.clone();
            info!(url = url.as_deref().unwrap_or("<none>"), "pull request created");
            return Ok(Some((session, CompletionSignal::Artifact { url })));
        }

        match self.activities.latest_activity(session_id).await? {
            Some(activity) if activity.is_terminal() => {
                info!("session completed");
                return Ok(Some((session, CompletionSignal::Activity)));
            }
            Some(activity) => {
                if let Some(title) = activity.progress_title() {
                    info!(title, "progress");
                    self.emit(MonitorEvent::Progress {
                        session_id: session_id.to_owned(),
                        title: title.to_owned(),
                    });
                } else {
                    debug!(kind = activity.kind.label(), "latest activity is not terminal");
                }
            }
            None => debug!("no activities yet"),
        }

        Ok(None)
    }

    fn emit(&self, event: MonitorEvent) {
        if let Some(tx) = &self.events {
            if let Err(err) = tx.try_send(event) {
                debug!(%err, "monitor event dropped");
            }
        }
    }
}

fn before(deadline: Option<Instant>, now: Instant) -> bool {
    match deadline {
        Some(deadline) => now < deadline,
        None => true,
    }
}

fn cancelled(session_id: &str, cycles: u32) -> AppError {
    info!(cycles, "monitoring cancelled");
    AppError::Cancelled {
        session_id: session_id.to_owned(),
    }
}
