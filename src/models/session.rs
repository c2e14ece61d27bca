//! Session model, outputs, and creation request.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

use super::Collection;

/// How the service publishes the result of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AutomationMode {
    /// Open a pull request automatically when work finishes.
    #[default]
    AutoCreatePr,
    /// Leave publishing to the operator.
    Manual,
    /// No automation.
    None,
    /// A mode this client does not know, kept verbatim.
    Unrecognized(String),
}

impl AutomationMode {
    /// Wire value for this mode.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::AutoCreatePr => "AUTO_CREATE_PR",
            Self::Manual => "MANUAL",
            Self::None => "NONE",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for AutomationMode {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "AUTO_CREATE_PR" => Self::AutoCreatePr,
            "MANUAL" => Self::Manual,
            "NONE" => Self::None,
            _ => Self::Unrecognized(raw),
        }
    }
}

impl From<AutomationMode> for String {
    fn from(mode: AutomationMode) -> Self {
        match mode {
            AutomationMode::Unrecognized(raw) => raw,
            other => other.as_str().to_owned(),
        }
    }
}

/// Branch context for GitHub-backed sources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GitHubRepoContext {
    /// Branch the remote agent starts from.
    #[serde(default)]
    pub starting_branch: String,
}

/// Which source a session runs against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceContext {
    /// Source resource name.
    #[serde(default)]
    pub source: String,
    /// GitHub-specific context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_repo_context: Option<GitHubRepoContext>,
}

/// Pull request published by a session.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
    /// Link to the pull request, when reported.
    pub url: Option<String>,
    /// Pull request title, when reported.
    pub title: Option<String>,
    /// Pull request body, when reported.
    pub description: Option<String>,
    raw: Value,
}

/// Terminal artifact reference attached to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Output {
    /// A pull request was created; this is the artifact-creation signal.
    /// Presence of the `pullRequest` key is enough, with or without a link.
    PullRequest(PullRequest),
    /// Any other output kind, kept verbatim.
    Other(Value),
}

impl Output {
    /// Whether this output signals that an artifact was created.
    #[must_use]
    pub fn is_artifact(&self) -> bool {
        matches!(self, Self::PullRequest(_))
    }
}

impl From<Value> for Output {
    fn from(raw: Value) -> Self {
        let Some(pr) = raw.get("pullRequest") else {
            return Self::Other(raw);
        };
        let text = |key: &str| pr.get(key).and_then(Value::as_str).map(str::to_owned);
        Self::PullRequest(PullRequest {
            url: text("url"),
            title: text("title"),
            description: text("description"),
            raw,
        })
    }
}

impl From<Output> for Value {
    fn from(output: Output) -> Self {
        match output {
            Output::PullRequest(pr) => pr.raw,
            Output::Other(raw) => raw,
        }
    }
}

/// Decode `outputs`, treating a missing or malformed collection as empty.
fn lenient_outputs<'de, D>(deserializer: D) -> std::result::Result<Vec<Output>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::Array(items) => items.into_iter().map(Output::from).collect(),
        _ => Vec::new(),
    })
}

/// Decode a scalar text field; `null` or a non-scalar value becomes empty.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    })
}

/// Decode an optional field, dropping values of the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).ok())
}

/// Snapshot of a remote session.
///
/// Snapshots are replaced wholesale on every poll; fields this client does
/// not model are preserved in `extra` so a snapshot re-serialises intact.
/// Only `outputs` drives control flow, so every modelled field decodes
/// leniently: a malformed value is dropped instead of failing the fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Resource name (`sessions/{id}`).
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub name: String,
    /// Service-assigned identifier; immutable after creation.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    /// Human-readable title.
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    /// Originating task description.
    #[serde(default, deserialize_with = "lenient_string")]
    pub prompt: String,
    /// Source and starting branch.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_context: Option<SourceContext>,
    /// Publishing behaviour.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub automation_mode: Option<AutomationMode>,
    /// Whether the plan must be approved before work proceeds.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub require_plan_approval: Option<bool>,
    /// Outputs produced so far.
    #[serde(
        default,
        deserialize_with = "lenient_outputs",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub outputs: Vec<Output>,
    /// Creation timestamp.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub create_time: Option<DateTime<Utc>>,
    /// Last server-side update.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub update_time: Option<DateTime<Utc>>,
    /// Fields this client does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    /// First pull request among the outputs, if any.
    #[must_use]
    pub fn pull_request(&self) -> Option<&PullRequest> {
        self.outputs.iter().find_map(|output| match output {
            Output::PullRequest(pr) => Some(pr),
            Output::Other(_) => None,
        })
    }

    /// Whether any output signals artifact creation.
    #[must_use]
    pub fn has_artifact(&self) -> bool {
        self.outputs.iter().any(Output::is_artifact)
    }

    /// Source resource name, when known.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source_context.as_ref().map(|ctx| ctx.source.as_str())
    }

    /// Starting branch, when known.
    #[must_use]
    pub fn starting_branch(&self) -> Option<&str> {
        self.source_context
            .as_ref()
            .and_then(|ctx| ctx.github_repo_context.as_ref())
            .map(|gh| gh.starting_branch.as_str())
    }
}

impl Collection for Session {
    const KEY: &'static str = "sessions";
}

/// Parameters for creating a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSessionRequest {
    /// Task description.
    pub prompt: String,
    /// Source resource name (e.g. `sources/github/owner/repo`).
    pub source: String,
    /// Session title.
    pub title: String,
    /// Branch to start from.
    pub starting_branch: String,
    /// Publishing behaviour.
    pub automation_mode: AutomationMode,
    /// Whether to stop for plan approval.
    pub require_plan_approval: bool,
}

impl CreateSessionRequest {
    /// Request with default branch `main`, automatic PR creation, and no
    /// plan approval gate.
    #[must_use]
    pub fn new(
        prompt: impl Into<String>,
        source: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            source: source.into(),
            title: title.into(),
            starting_branch: "main".into(),
            automation_mode: AutomationMode::default(),
            require_plan_approval: false,
        }
    }

    /// Override the starting branch.
    #[must_use]
    pub fn starting_branch(mut self, branch: impl Into<String>) -> Self {
        self.starting_branch = branch.into();
        self
    }

    /// Override the automation mode.
    #[must_use]
    pub fn automation_mode(mut self, mode: AutomationMode) -> Self {
        self.automation_mode = mode;
        self
    }

    /// Require plan approval before work proceeds.
    #[must_use]
    pub fn require_plan_approval(mut self, required: bool) -> Self {
        self.require_plan_approval = required;
        self
    }

    /// Wire body for `POST sessions`.
    #[must_use]
    pub fn to_body(&self) -> Value {
        json!({
            "prompt": self.prompt,
            "sourceContext": {
                "source": self.source,
                "githubRepoContext": {
                    "startingBranch": self.starting_branch,
                },
            },
            "automationMode": self.automation_mode.as_str(),
            "title": self.title,
            "requirePlanApproval": self.require_plan_approval,
        })
    }
}
