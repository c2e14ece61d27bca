//! Domain model module declarations.

pub mod activity;
pub mod page;
pub mod session;
pub mod source;

pub use activity::{Activity, ActivityKind};
pub use page::Page;
pub use session::{AutomationMode, CreateSessionRequest, Output, PullRequest, Session};
pub use source::{GitHubRepo, Source};

/// A resource that is listed under a fixed collection key
/// (`{"sources": [...], "nextPageToken": "..."}`).
pub trait Collection {
    /// JSON key holding the items in a listing response.
    const KEY: &'static str;
}
