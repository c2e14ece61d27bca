//! Source model: a connectable upstream repository.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Collection;

/// GitHub descriptor attached to GitHub-backed sources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GitHubRepo {
    /// Repository owner (user or organisation).
    #[serde(default)]
    pub owner: String,
    /// Repository name.
    #[serde(default)]
    pub repo: String,
    /// Fields this client does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A source listed by the service. Read-only to this client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Opaque resource name passed back on session creation.
    #[serde(default)]
    pub name: String,
    /// Short identifier (e.g. `github/owner/repo`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Provider descriptor; absent for non-GitHub sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_repo: Option<GitHubRepo>,
    /// Fields this client does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Source {
    /// Exact, case-sensitive match against the GitHub descriptor.
    #[must_use]
    pub fn matches_repo(&self, owner: &str, repo: &str) -> bool {
        self.github_repo
            .as_ref()
            .is_some_and(|gh| gh.owner == owner && gh.repo == repo)
    }
}

impl Collection for Source {
    const KEY: &'static str = "sources";
}
