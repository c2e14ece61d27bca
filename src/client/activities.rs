//! Activity listing for a single session.

use std::sync::Arc;

use super::{session_path, Paginator};
use crate::models::{Activity, Page};
use crate::transport::Transport;
use crate::Result;

/// Reads a session's activity timeline.
#[derive(Clone)]
pub struct ActivityReader {
    transport: Arc<dyn Transport>,
    page_size: u32,
}

impl ActivityReader {
    /// Reader over `transport` using `page_size` for full listings.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, page_size: u32) -> Self {
        Self {
            transport,
            page_size,
        }
    }

    /// Default page size for [`pages`](Self::pages).
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Paginator over a session's activities.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for an invalid session id.
    pub fn pages(&self, session_id: &str, page_size: u32) -> Result<Paginator<Activity>> {
        let path = format!("{}/activities", session_path(session_id)?);
        Ok(Paginator::new(Arc::clone(&self.transport), path, page_size))
    }

    /// Fetch one page of activities.
    ///
    /// # Errors
    ///
    /// Propagates transport and decoding failures.
    pub async fn list_activities(
        &self,
        session_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<Page<Activity>> {
        self.pages(session_id, page_size)?
            .fetch_page(page_token)
            .await
    }

    /// The most recent activity, or `None` if the session has none yet.
    ///
    /// # Errors
    ///
    /// Propagates transport and decoding failures.
    pub async fn latest_activity(&self, session_id: &str) -> Result<Option<Activity>> {
        let page = self.list_activities(session_id, 1, None).await?;
        Ok(page.items.into_iter().next())
    }
}
