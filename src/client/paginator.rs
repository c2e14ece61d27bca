//! Cursor-based traversal over any listing endpoint.

use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::stream::{self, Stream};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::models::{Collection, Page};
use crate::transport::{ApiRequest, Transport};
use crate::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    Start,
    At(String),
    Exhausted,
}

/// Walks a listing one page per transport call.
///
/// The only state carried between calls is the current cursor, so a walk
/// can be resumed from any token previously observed with
/// [`resume_from`](Self::resume_from). Transport failures propagate
/// unchanged; nothing is retried.
pub struct Paginator<T> {
    transport: Arc<dyn Transport>,
    path: String,
    page_size: u32,
    cursor: Cursor,
    _items: PhantomData<fn() -> T>,
}

impl<T: Collection + DeserializeOwned> Paginator<T> {
    /// Paginator over `path` starting at the first page.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, path: impl Into<String>, page_size: u32) -> Self {
        Self {
            transport,
            path: path.into(),
            page_size,
            cursor: Cursor::Start,
            _items: PhantomData,
        }
    }

    /// Continue from a token returned by an earlier page.
    #[must_use]
    pub fn resume_from(mut self, page_token: impl Into<String>) -> Self {
        let token = page_token.into();
        self.cursor = if token.is_empty() {
            Cursor::Start
        } else {
            Cursor::At(token)
        };
        self
    }

    /// Token the next call to [`next_page`](Self::next_page) will send.
    #[must_use]
    pub fn cursor(&self) -> Option<&str> {
        match &self.cursor {
            Cursor::At(token) => Some(token),
            Cursor::Start | Cursor::Exhausted => None,
        }
    }

    /// Whether the walk has reached the last page.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor == Cursor::Exhausted
    }

    /// Fetch a single page at `page_token` without touching the cursor.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for a zero page size, otherwise whatever
    /// the transport or page decoding reports.
    pub async fn fetch_page(&self, page_token: Option<&str>) -> Result<Page<T>> {
        if self.page_size == 0 {
            return Err(AppError::Config(format!(
                "{}: page size must be greater than zero",
                self.path
            )));
        }

        let mut request =
            ApiRequest::get(self.path.as_str()).query("pageSize", self.page_size.to_string());
        if let Some(token) = page_token.filter(|token| !token.is_empty()) {
            request = request.query("pageToken", token);
        }

        let response = self.transport.call(request).await?;
        let page = Page::<T>::from_response(response)?;
        debug!(
            path = %self.path,
            items = page.items.len(),
            has_more = page.has_more(),
            "fetched page"
        );
        Ok(page)
    }

    /// Fetch the page at the cursor and advance it.
    ///
    /// Returns `Ok(None)` once the previous page carried no token.
    ///
    /// # Errors
    ///
    /// Propagates transport and decoding failures; the cursor is left
    /// unchanged so the same page can be requested again. Returns
    /// `AppError::Decode` if the service hands back the token it was just
    /// sent, which would otherwise loop forever.
    pub async fn next_page(&mut self) -> Result<Option<Page<T>>> {
        let requested = match &self.cursor {
            Cursor::Exhausted => return Ok(None),
            Cursor::Start => None,
            Cursor::At(token) => Some(token.clone()),
        };

        let page = self.fetch_page(requested.as_deref()).await?;

        self.cursor = match &page.next_page_token {
            None => Cursor::Exhausted,
            Some(next) if requested.as_deref() == Some(next.as_str()) => {
                return Err(AppError::Decode(format!(
                    "{}: service returned the same page token twice",
                    self.path
                )));
            }
            Some(next) => Cursor::At(next.clone()),
        };

        Ok(Some(page))
    }

    /// Follow the cursor to exhaustion and concatenate every page in order.
    ///
    /// # Errors
    ///
    /// Fails on the first page that fails; items gathered so far are dropped.
    pub async fn collect_all(mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await? {
            items.extend(page.items);
        }
        Ok(items)
    }

    /// Lazily yield pages until the cursor is exhausted.
    ///
    /// The stream ends after the first error.
    #[must_use]
    pub fn into_stream(self) -> impl Stream<Item = Result<Page<T>>> {
        stream::try_unfold(self, |mut paginator| async move {
            Ok(paginator
                .next_page()
                .await?
                .map(|page| (page, paginator)))
        })
    }
}
