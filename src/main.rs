#![forbid(unsafe_code)]

//! `jules-relay`: command-line front end for the session client.
//!
//! Every subcommand maps to one client or monitor operation. Results are
//! printed as JSON on stdout; diagnostics and progress go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use jules_relay::models::{AutomationMode, Collection, CreateSessionRequest, Page};
use jules_relay::orchestrator::{CompletionSignal, MonitorEvent};
use jules_relay::{
    AppError, CompletionMonitor, GlobalConfig, MonitorOptions, Paginator, Result, SessionClient,
};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "jules-relay", about = "Jules session client", version, long_about = None)]
struct Cli {
    /// Jules API key (falls back to the keychain, then `JULES_API_KEY`).
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Path to an optional TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct PageArgs {
    /// Items per page (defaults come from the config file).
    #[arg(long)]
    page_size: Option<u32>,

    /// Token returned as `nextPageToken` by a previous call.
    #[arg(long, conflicts_with = "all")]
    page_token: Option<String>,

    /// Follow pagination to the end and print every item.
    #[arg(long)]
    all: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List available sources.
    ListSources(PageArgs),

    /// Print the source name for a GitHub repository.
    GetSource {
        /// Repository owner.
        #[arg(long)]
        owner: String,
        /// Repository name.
        #[arg(long)]
        repo: String,
    },

    /// Create a new session.
    CreateSession {
        /// Source name (e.g. `sources/github/owner/repo`).
        #[arg(long)]
        source: String,
        /// Task prompt.
        #[arg(long)]
        prompt: String,
        /// Session title.
        #[arg(long)]
        title: String,
        /// Starting branch.
        #[arg(long, default_value = "main")]
        branch: String,
        /// Don't auto-create a pull request.
        #[arg(long)]
        no_auto_pr: bool,
        /// Stop for plan approval before working.
        #[arg(long)]
        require_plan_approval: bool,
    },

    /// Show session details.
    GetSession {
        /// Session ID.
        session_id: String,
    },

    /// List sessions.
    ListSessions(PageArgs),

    /// Poll a session until it completes or the timeout elapses.
    Monitor {
        /// Session ID.
        session_id: String,
        /// Check interval in seconds.
        #[arg(long)]
        interval: Option<u64>,
        /// Timeout in seconds.
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// List a session's activities.
    ListActivities {
        /// Session ID.
        session_id: String,
        #[command(flatten)]
        page: PageArgs,
    },

    /// Approve the pending plan of a session.
    ApprovePlan {
        /// Session ID.
        session_id: String,
    },

    /// Send a follow-up message to a session.
    SendMessage {
        /// Session ID.
        session_id: String,
        /// Message text.
        #[arg(long)]
        prompt: String,
    },
}

fn main() -> ExitCode {
    let args = Cli::parse();
    if let Err(err) = init_tracing(args.log_format) {
        eprintln!("Error: {err}");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Error: failed to build tokio runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Timeouts and cancellations get their own codes so scripts can tell
/// them apart from request failures.
fn exit_code(err: &AppError) -> u8 {
    match err {
        AppError::MonitorTimeout { .. } => 2,
        AppError::Cancelled { .. } => 130,
        _ => 1,
    }
}

async fn run(args: Cli) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => GlobalConfig::load_from_path(path)?,
        None => GlobalConfig::default(),
    };
    config.load_credentials(args.api_key).await?;
    debug!(endpoint = %config.api.endpoint(), "configuration loaded");

    let client = SessionClient::from_config(&config)?;
    let paging = client.paging().clone();

    match args.command {
        Command::ListSources(page) => {
            let pages = client.source_pages(page.page_size.unwrap_or(paging.sources_page_size));
            print_listing(pages, page).await
        }
        Command::GetSource { owner, repo } => {
            let source = client.find_source_by_repo(&owner, &repo).await?;
            println!("{}", source.name);
            Ok(())
        }
        Command::CreateSession {
            source,
            prompt,
            title,
            branch,
            no_auto_pr,
            require_plan_approval,
        } => {
            let mode = if no_auto_pr {
                AutomationMode::Manual
            } else {
                AutomationMode::AutoCreatePr
            };
            let request = CreateSessionRequest::new(prompt, source, title)
                .starting_branch(branch)
                .automation_mode(mode)
                .require_plan_approval(require_plan_approval);
            print_json(&client.create_session(&request).await?)
        }
        Command::GetSession { session_id } => print_json(&client.get_session(&session_id).await?),
        Command::ListSessions(page) => {
            let pages = client.session_pages(page.page_size.unwrap_or(paging.sessions_page_size));
            print_listing(pages, page).await
        }
        Command::Monitor {
            session_id,
            interval,
            timeout,
        } => {
            let mut options = MonitorOptions::from_config(&config);
            if let Some(secs) = interval {
                options.interval = Duration::from_secs(secs);
            }
            if let Some(secs) = timeout {
                options.timeout = Duration::from_secs(secs);
            }
            monitor(client, &session_id, options).await
        }
        Command::ListActivities { session_id, page } => {
            let pages = client.activities().pages(
                &session_id,
                page.page_size.unwrap_or(paging.activities_page_size),
            )?;
            print_listing(pages, page).await
        }
        Command::ApprovePlan { session_id } => {
            print_json(&client.approve_plan(&session_id).await?)
        }
        Command::SendMessage { session_id, prompt } => {
            print_json(&client.send_message(&session_id, &prompt).await?)
        }
    }
}

async fn monitor(client: SessionClient, session_id: &str, options: MonitorOptions) -> Result<()> {
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    let signal_task = tokio::spawn(async move {
        shutdown_signal().await;
        info!("interrupt received, stopping monitor");
        signal_cancel.cancel();
    });

    let (tx, mut rx) = mpsc::channel(32);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                MonitorEvent::Progress { title, .. } => eprintln!("Progress: {title}"),
                MonitorEvent::Completed {
                    signal: CompletionSignal::Artifact { url: Some(url) },
                    ..
                } => eprintln!("PR created: {url}"),
                MonitorEvent::Completed {
                    signal: CompletionSignal::Artifact { url: None },
                    ..
                } => eprintln!("PR created"),
                MonitorEvent::Completed {
                    signal: CompletionSignal::Activity,
                    ..
                } => eprintln!("Session completed!"),
                MonitorEvent::Polled { .. } => {}
            }
        }
    });

    let monitor = CompletionMonitor::new(client).with_events(tx);
    let outcome = monitor.monitor(session_id, options, &cancel).await;
    signal_task.abort();
    // Dropping the monitor closes the channel so the printer drains and exits.
    drop(monitor);
    if let Err(err) = printer.await {
        tracing::warn!(%err, "progress printer task failed");
    }

    print_json(&outcome?.session)
}

async fn print_listing<T>(mut pages: Paginator<T>, args: PageArgs) -> Result<()>
where
    T: Collection + Serialize + serde::de::DeserializeOwned,
{
    let page = if args.all {
        Page {
            items: pages.collect_all().await?,
            next_page_token: None,
        }
    } else {
        if let Some(token) = args.page_token {
            pages = pages.resume_from(token);
        }
        pages.next_page().await?.unwrap_or_default()
    };
    print_json(&page.to_json()?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable. The default level is
/// `warn`; set `RUST_LOG=info` for per-cycle monitor logs.
fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
