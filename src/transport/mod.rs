//! Request/response boundary to the remote API.
//!
//! The [`Transport`] trait decouples the session client and monitor from
//! the wire. [`http::HttpTransport`] talks to the real service; tests plug
//! in scripted implementations.

pub mod http;

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::Result;

/// HTTP verbs used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Read a resource or listing.
    Get,
    /// Create a resource or invoke a custom action.
    Post,
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// A single exchange with the API, relative to the versioned endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP verb.
    pub method: Method,
    /// Resource path without leading slash (e.g. `sessions/123`).
    pub path: String,
    /// Query parameters in insertion order.
    pub query: Vec<(String, String)>,
    /// Optional JSON body.
    pub body: Option<Value>,
}

impl ApiRequest {
    /// `GET {path}`.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// `POST {path}` with no body.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            ..Self::get(path)
        }
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Look up a query parameter by key.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl Display for ApiRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Performs one request/response exchange.
///
/// Implementations must be safe to call concurrently from several monitor
/// loops and must not retry on their own.
pub trait Transport: Send + Sync {
    /// Execute `request` and return the decoded JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Remote`](crate::AppError::Remote) with the status
    /// and raw body for non-success responses,
    /// [`AppError::Transport`](crate::AppError::Transport) when no response
    /// was received, and [`AppError::Decode`](crate::AppError::Decode) when
    /// the body is not JSON.
    fn call(&self, request: ApiRequest) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + '_>>;
}
