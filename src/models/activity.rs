//! Activity records and kind classification.
//!
//! The remote activity vocabulary is open-ended: a record's kind is only
//! discoverable by which payload field is present. Records are decoded from
//! the raw JSON without assuming a fixed schema, and anything unrecognised
//! is classified as [`ActivityKind::Other`] rather than rejected.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Collection;

/// Top-level keys that carry record metadata rather than a kind payload.
const METADATA_KEYS: &[&str] = &[
    "name",
    "id",
    "createTime",
    "originator",
    "description",
    "artifacts",
];

/// Closed classification of an activity record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityKind {
    /// The agent reported progress.
    ProgressUpdated {
        /// Short progress headline (empty when the service omitted it).
        title: String,
        /// Optional longer description.
        description: Option<String>,
    },
    /// The session finished.
    SessionCompleted,
    /// Any kind this client does not interpret. Never terminal.
    Other {
        /// First payload key found on the record, if any.
        kind: Option<String>,
    },
}

impl ActivityKind {
    /// Classify a raw activity payload by field presence.
    #[must_use]
    pub fn classify(raw: &Value) -> Self {
        let Some(fields) = raw.as_object() else {
            return Self::Other { kind: None };
        };

        if fields.contains_key("sessionCompleted") {
            return Self::SessionCompleted;
        }

        if let Some(progress) = fields.get("progressUpdated") {
            let text = |key: &str| progress.get(key).and_then(Value::as_str).map(str::to_owned);
            return Self::ProgressUpdated {
                title: text("title").unwrap_or_default(),
                description: text("description"),
            };
        }

        let kind = fields
            .keys()
            .find(|key| !METADATA_KEYS.contains(&key.as_str()))
            .cloned();
        Self::Other { kind }
    }

    /// Whether this kind ends a session.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::SessionCompleted)
    }

    /// Stable label for logs and CLI output.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::ProgressUpdated { .. } => "progressUpdated",
            Self::SessionCompleted => "sessionCompleted",
            Self::Other { kind: Some(kind) } => kind,
            Self::Other { kind: None } => "unknown",
        }
    }
}

/// One immutable event in a session's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct Activity {
    /// Resource name (`sessions/{sid}/activities/{aid}`).
    pub name: String,
    /// Activity identifier.
    pub id: String,
    /// Creation timestamp as reported by the service.
    pub create_time: Option<String>,
    /// Who produced the record (`agent`, `user`, ...).
    pub originator: Option<String>,
    /// Classified kind.
    pub kind: ActivityKind,
    raw: Value,
}

impl Activity {
    /// Progress headline when this is a `progressUpdated` record.
    #[must_use]
    pub fn progress_title(&self) -> Option<&str> {
        match &self.kind {
            ActivityKind::ProgressUpdated { title, .. } => Some(title),
            _ => None,
        }
    }

    /// Whether this record ends the session.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }

    /// The record exactly as received.
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl From<Value> for Activity {
    fn from(raw: Value) -> Self {
        let text = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_owned);
        Self {
            name: text("name").unwrap_or_default(),
            id: text("id").unwrap_or_default(),
            create_time: text("createTime"),
            originator: text("originator"),
            kind: ActivityKind::classify(&raw),
            raw,
        }
    }
}

impl From<Activity> for Value {
    fn from(activity: Activity) -> Self {
        activity.raw
    }
}

impl Collection for Activity {
    const KEY: &'static str = "activities";
}
