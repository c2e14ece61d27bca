//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

/// Keychain service name used for credential lookup.
pub const KEYRING_SERVICE: &str = "jules-relay";

/// Keychain entry holding the API key.
pub const KEYRING_API_KEY: &str = "jules_api_key";

/// Environment variable consulted when the keychain has no API key.
pub const API_KEY_ENV: &str = "JULES_API_KEY";

/// Remote endpoint settings.
///
/// The API key is loaded at runtime from the command line, the OS keychain,
/// or the environment; it is never read from the TOML file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", default)]
pub struct ApiConfig {
    /// Scheme and host of the service, without the version segment.
    pub base_url: String,
    /// Fixed API version path segment (e.g. `v1alpha`).
    pub api_version: String,
    /// Per-request timeout.
    pub request_timeout_seconds: u64,
    /// `User-Agent` header attached to every request.
    pub user_agent: String,
    /// API key attached to every request (populated at runtime).
    #[serde(skip)]
    pub api_key: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://jules.googleapis.com".into(),
            api_version: "v1alpha".into(),
            request_timeout_seconds: 60,
            user_agent: concat!("jules-relay/", env!("CARGO_PKG_VERSION")).into(),
            api_key: String::new(),
        }
    }
}

impl ApiConfig {
    /// Root URL every resource path is joined onto.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_version.trim_matches('/')
        )
    }

    /// Per-request timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Default polling cadence for the completion monitor.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", default)]
pub struct MonitorConfig {
    /// Delay between polls.
    pub interval_seconds: u64,
    /// Total wall-clock budget for one monitor call.
    pub timeout_seconds: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 30,
            timeout_seconds: 3600,
        }
    }
}

/// Default page sizes per listing endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", default)]
pub struct PagingConfig {
    /// Page size for `sources`.
    pub sources_page_size: u32,
    /// Page size for `sessions`.
    pub sessions_page_size: u32,
    /// Page size for `sessions/{id}/activities`.
    pub activities_page_size: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            sources_page_size: 10,
            sessions_page_size: 10,
            activities_page_size: 30,
        }
    }
}

/// Global configuration parsed from an optional `config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", default)]
pub struct GlobalConfig {
    /// Remote endpoint settings.
    pub api: ApiConfig,
    /// Completion monitor defaults.
    pub monitor: MonitorConfig,
    /// Listing page sizes.
    pub paging: PagingConfig,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the API key.
    ///
    /// An explicit value (from `--api-key`) wins. Otherwise the
    /// `jules-relay` keyring service is tried first, then the
    /// `JULES_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if no source provides a non-empty key.
    pub async fn load_credentials(&mut self, explicit: Option<String>) -> Result<()> {
        self.api.api_key = match explicit.filter(|key| !key.trim().is_empty()) {
            Some(key) => key,
            None => load_credential(KEYRING_API_KEY, API_KEY_ENV).await?,
        };
        Ok(())
    }

    /// Default delay between monitor polls.
    #[must_use]
    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.monitor.interval_seconds)
    }

    /// Default monitor budget.
    #[must_use]
    pub fn monitor_timeout(&self) -> Duration {
        Duration::from_secs(self.monitor.timeout_seconds)
    }

    fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(AppError::Config("api.base_url must not be empty".into()));
        }

        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"))
        {
            return Err(AppError::Config(format!(
                "api.base_url must be an http(s) URL, got {}",
                self.api.base_url
            )));
        }

        if self.api.api_version.trim_matches('/').is_empty() {
            return Err(AppError::Config("api.api_version must not be empty".into()));
        }

        if self.api.request_timeout_seconds == 0 {
            return Err(AppError::Config(
                "api.request_timeout_seconds must be greater than zero".into(),
            ));
        }

        if self.monitor.interval_seconds == 0 {
            return Err(AppError::Config(
                "monitor.interval_seconds must be greater than zero".into(),
            ));
        }

        let paging = &self.paging;
        if paging.sources_page_size == 0
            || paging.sessions_page_size == 0
            || paging.activities_page_size == 0
        {
            return Err(AppError::Config(
                "paging page sizes must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let key = keyring_key.to_owned();

    // keyring is synchronous I/O.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(value),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    match env::var(env_key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Config(format!(
            "API key required: pass --api-key, store {keyring_key} in the keychain, \
             or set the {env_key} env var"
        ))),
    }
}
