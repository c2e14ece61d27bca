//! `reqwest`-backed transport for the Jules REST API.

use std::future::Future;
use std::pin::Pin;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use serde_json::Value;
use tracing::{debug, warn};

use super::{ApiRequest, Method, Transport};
use crate::config::ApiConfig;
use crate::{AppError, Result};

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP transport bound to one endpoint and one credential.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Build a transport from explicit endpoint settings.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the API key is empty or cannot be used
    /// as a header value, or if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AppError::Config("API key is required".into()));
        }

        let mut api_key = HeaderValue::from_str(config.api_key.trim())
            .map_err(|err| AppError::Config(format!("invalid API key header: {err}")))?;
        api_key.set_sensitive(true);

        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|err| AppError::Config(format!("invalid user agent: {err}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert(USER_AGENT, user_agent);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| AppError::Config(format!("failed to build http client: {err}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint(),
        })
    }

    /// Versioned root URL requests are resolved against.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute(&self, request: ApiRequest) -> Result<Value> {
        let url = format!("{}/{}", self.endpoint, request.path.trim_start_matches('/'));
        let mut builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(method = %request.method, path = %request.path, "sending request");
        let response = builder
            .send()
            .await
            .map_err(|err| AppError::Transport(format!("{request}: {err}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| AppError::Transport(format!("{request}: failed to read body: {err}")))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), path = %request.path, "request failed");
            return Err(AppError::Remote {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }

        serde_json::from_str(&text)
            .map_err(|err| AppError::Decode(format!("{request}: invalid JSON response: {err}")))
    }
}

impl Transport for HttpTransport {
    fn call(&self, request: ApiRequest) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + '_>> {
        Box::pin(self.execute(request))
    }
}
