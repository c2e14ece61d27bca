//! Error types shared across the application.

use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing, validation, or argument failure.
    Config(String),
    /// The request never produced an HTTP response (connect, TLS, timeout).
    Transport(String),
    /// The remote API answered with a non-success status.
    Remote {
        /// HTTP status code returned by the service.
        status: u16,
        /// Raw response body, kept verbatim for diagnostics.
        body: String,
    },
    /// A response body could not be decoded into the expected shape.
    Decode(String),
    /// Requested entity does not exist.
    NotFound(String),
    /// The monitor deadline elapsed without a terminal signal.
    MonitorTimeout {
        /// Session that was being monitored.
        session_id: String,
        /// Wall-clock time spent polling.
        elapsed: Duration,
    },
    /// The caller cancelled a monitor loop before it finished.
    Cancelled {
        /// Session that was being monitored.
        session_id: String,
    },
    /// File-system or I/O operation failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::Remote { status, body } => write!(f, "remote: HTTP {status}: {body}"),
            Self::Decode(msg) => write!(f, "decode: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::MonitorTimeout {
                session_id,
                elapsed,
            } => write!(
                f,
                "monitor timeout: session {session_id} not complete after {}s",
                elapsed.as_secs()
            ),
            Self::Cancelled { session_id } => {
                write!(f, "cancelled: monitoring of session {session_id} was aborted")
            }
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// HTTP status for [`AppError::Remote`] failures, `None` otherwise.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
