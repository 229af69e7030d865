//! Backend configuration.
//!
//! [`BackendConfig`] is built once (usually from the environment) and handed
//! to [`MessagesBackend::new`](crate::backend::MessagesBackend::new). Nothing
//! in the crate reads credentials from process-wide state after that.

use crate::error::BackendError;
use std::time::Duration;

/// Default Messages-style endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";

/// Default value for the `anthropic-version` header.
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

/// Environment variable holding the backend API key.
pub const API_KEY_ENV: &str = "CASEGEN_API_KEY";

/// Connection settings and baseline generation parameters for the backend.
#[derive(Clone)]
pub struct BackendConfig {
    /// Messages endpoint URL. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,
    pub api_key: String,
    /// Default: [`DEFAULT_MODEL`].
    pub model: String,
    /// Sent as the `anthropic-version` header.
    pub api_version: String,
    /// Time allowed to establish a connection. Default: 10 s.
    pub connect_timeout: Duration,
    /// Time allowed between reads of the response stream. Default: 280 s.
    pub read_timeout: Duration,
    /// Baseline `max_tokens`. Default: 50 000.
    pub max_tokens: u32,
    /// Baseline sampling temperature. Default: 0.2.
    pub temperature: f32,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_version", &self.api_version)
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl BackendConfig {
    /// Create a config with the given API key and default everything else.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(280),
            max_tokens: 50_000,
            temperature: 0.2,
        }
    }

    /// Build a config from `CASEGEN_*` environment variables.
    ///
    /// `CASEGEN_API_KEY` is required. `CASEGEN_BASE_URL`, `CASEGEN_MODEL`,
    /// `CASEGEN_CONNECT_TIMEOUT_SECS` and `CASEGEN_READ_TIMEOUT_SECS` are
    /// optional overrides.
    pub fn from_env() -> Result<Self, BackendError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BackendError> {
        let api_key = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            BackendError::Misconfiguration(format!("{API_KEY_ENV} is not set"))
        })?;

        let mut config = Self::new(api_key);
        if let Some(url) = lookup("CASEGEN_BASE_URL") {
            config.base_url = url;
        }
        if let Some(model) = lookup("CASEGEN_MODEL") {
            config.model = model;
        }
        if let Some(secs) = lookup("CASEGEN_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout = parse_secs("CASEGEN_CONNECT_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = lookup("CASEGEN_READ_TIMEOUT_SECS") {
            config.read_timeout = parse_secs("CASEGEN_READ_TIMEOUT_SECS", &secs)?;
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }
}

fn parse_secs(key: &str, value: &str) -> Result<Duration, BackendError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| BackendError::Misconfiguration(format!("{key}={value:?}: {e}")))
}
