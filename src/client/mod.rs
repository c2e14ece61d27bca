//! Session lifecycle client.
//!
//! Creates, fetches, lists and drives sessions over a [`Transport`]. Every
//! operation is exactly one transport call except
//! [`find_source_by_repo`](SessionClient::find_source_by_repo), which walks
//! the whole source listing.

pub mod activities;
pub mod paginator;

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::{GlobalConfig, PagingConfig};
use crate::models::{CreateSessionRequest, Page, Session, Source};
use crate::transport::http::HttpTransport;
use crate::transport::{ApiRequest, Transport};
use crate::{AppError, Result};

pub use activities::ActivityReader;
pub use paginator::Paginator;

/// Client for the `sources` and `sessions` resources.
#[derive(Clone)]
pub struct SessionClient {
    transport: Arc<dyn Transport>,
    paging: PagingConfig,
}

impl SessionClient {
    /// Client over an arbitrary transport with default page sizes.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            paging: PagingConfig::default(),
        }
    }

    /// Client talking HTTP to the endpoint described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the HTTP transport cannot be built
    /// (for example when no API key has been loaded).
    pub fn from_config(config: &GlobalConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config.api)?;
        info!(endpoint = transport.endpoint(), "session client ready");
        Ok(Self::new(Arc::new(transport)).with_paging(config.paging.clone()))
    }

    /// Override default page sizes.
    #[must_use]
    pub fn with_paging(mut self, paging: PagingConfig) -> Self {
        self.paging = paging;
        self
    }

    /// Default page sizes in effect.
    #[must_use]
    pub fn paging(&self) -> &PagingConfig {
        &self.paging
    }

    /// Reader for session activities sharing this client's transport.
    #[must_use]
    pub fn activities(&self) -> ActivityReader {
        ActivityReader::new(Arc::clone(&self.transport), self.paging.activities_page_size)
    }

    /// Fetch one page of sources.
    ///
    /// # Errors
    ///
    /// Propagates transport and decoding failures.
    pub async fn list_sources(&self, page_size: u32, page_token: Option<&str>) -> Result<Page<Source>> {
        self.source_pages(page_size).fetch_page(page_token).await
    }

    /// Paginator over every source at the given page size.
    #[must_use]
    pub fn source_pages(&self, page_size: u32) -> Paginator<Source> {
        Paginator::new(Arc::clone(&self.transport), "sources", page_size)
    }

    /// Find the source backed by GitHub repository `owner/repo`.
    ///
    /// Scans every page of the source listing and returns the first exact,
    /// case-sensitive match on both owner and repository name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` when no page contains a match, and
    /// propagates transport failures unchanged.
    pub async fn find_source_by_repo(&self, owner: &str, repo: &str) -> Result<Source> {
        require_non_empty("owner", owner)?;
        require_non_empty("repo", repo)?;

        let mut pages = self.source_pages(self.paging.sources_page_size);
        while let Some(page) = pages.next_page().await? {
            if let Some(source) = page
                .items
                .into_iter()
                .find(|source| source.matches_repo(owner, repo))
            {
                debug!(owner, repo, source = %source.name, "source resolved");
                return Ok(source);
            }
        }

        Err(AppError::NotFound(format!("source for {owner}/{repo}")))
    }

    /// Create a session, which starts remote work.
    ///
    /// Issues exactly one create call; deduplication is the service's
    /// concern.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for an empty prompt or source, otherwise
    /// propagates transport and decoding failures.
    pub async fn create_session(&self, request: &CreateSessionRequest) -> Result<Session> {
        require_non_empty("prompt", &request.prompt)?;
        require_non_empty("source", &request.source)?;

        let response = self
            .transport
            .call(ApiRequest::post("sessions").json(request.to_body()))
            .await?;
        let session: Session = decode_session(response)?;
        info!(
            session_id = %session.id,
            title = %session.title,
            require_plan_approval = request.require_plan_approval,
            "session created"
        );
        Ok(session)
    }

    /// Fetch the current snapshot of a session.
    ///
    /// # Errors
    ///
    /// Propagates transport and decoding failures.
    pub async fn get_session(&self, session_id: &str) -> Result<Session> {
        let path = session_path(session_id)?;
        let response = self.transport.call(ApiRequest::get(path)).await?;
        decode_session(response)
    }

    /// Fetch one page of sessions.
    ///
    /// # Errors
    ///
    /// Propagates transport and decoding failures.
    pub async fn list_sessions(
        &self,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<Page<Session>> {
        self.session_pages(page_size).fetch_page(page_token).await
    }

    /// Paginator over every session at the given page size.
    #[must_use]
    pub fn session_pages(&self, page_size: u32) -> Paginator<Session> {
        Paginator::new(Arc::clone(&self.transport), "sessions", page_size)
    }

    /// Let a session proceed past its plan approval gate.
    ///
    /// Only meaningful for sessions created with plan approval required.
    ///
    /// # Errors
    ///
    /// Propagates transport failures.
    pub async fn approve_plan(&self, session_id: &str) -> Result<Value> {
        let path = format!("{}:approvePlan", session_path(session_id)?);
        let response = self.transport.call(ApiRequest::post(path)).await?;
        info!(session_id, "plan approved");
        Ok(response)
    }

    /// Send a follow-up instruction to an in-progress session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for an empty prompt, otherwise propagates
    /// transport failures.
    pub async fn send_message(&self, session_id: &str, prompt: &str) -> Result<Value> {
        require_non_empty("prompt", prompt)?;
        let path = format!("{}:sendMessage", session_path(session_id)?);
        let response = self
            .transport
            .call(ApiRequest::post(path).json(json!({ "prompt": prompt })))
            .await?;
        info!(session_id, "message sent");
        Ok(response)
    }
}

/// Resolve `abc` or `sessions/abc` to the resource path `sessions/abc`.
///
/// # Errors
///
/// Returns `AppError::Config` if the id is empty or contains a path
/// separator or action suffix.
pub fn session_path(session_id: &str) -> Result<String> {
    let id = session_id.trim();
    let id = id.strip_prefix("sessions/").unwrap_or(id);
    require_non_empty("session id", id)?;
    if id.contains(['/', ':', '?', '#']) {
        return Err(AppError::Config(format!("invalid session id: {session_id}")));
    }
    Ok(format!("sessions/{id}"))
}

fn decode_session(response: Value) -> Result<Session> {
    serde_json::from_value(response)
        .map_err(|err| AppError::Decode(format!("session: {err}")))
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::Config(format!("{field} must not be empty")));
    }
    Ok(())
}
