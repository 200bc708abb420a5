//! Client configuration
//!
//! Loaded from `COMPOSER_*` environment variables or a YAML file.

use std::env;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use composer_core::{ComposerError, ComposerResult};

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the automation backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent with every request
    #[serde(default)]
    pub api_key: Option<String>,

    /// Default request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Relay prefix for link probes, e.g. `https://relay.example/?url=`
    #[serde(default)]
    pub cors_relay_url: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:5678".to_string()
}

fn default_timeout_ms() -> u64 {
    120_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_ms: default_timeout_ms(),
            cors_relay_url: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn load() -> ComposerResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ComposerResult<Self> {
        let mut config = Self::default();

        if let Some(base_url) = lookup("COMPOSER_BACKEND_URL") {
            config.base_url = base_url;
        }

        if let Some(api_key) = lookup("COMPOSER_API_KEY") {
            if !api_key.is_empty() {
                config.api_key = Some(api_key);
            }
        }

        if let Some(timeout) = lookup("COMPOSER_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(ms) if ms > 0 => config.timeout_ms = ms,
                _ => warn!("Invalid COMPOSER_TIMEOUT_MS value: {}", timeout),
            }
        }

        if let Some(relay) = lookup("COMPOSER_CORS_RELAY_URL") {
            if !relay.is_empty() {
                config.cors_relay_url = Some(relay);
            }
        }

        config.validate()?;

        if config.api_key.is_none() {
            warn!("No COMPOSER_API_KEY provided - requests will be sent without authorization");
        }

        info!(base_url = %config.base_url, "Loaded client configuration");
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ComposerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ComposerError::Configuration(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> ComposerResult<Self> {
        let config: Self = serde_yaml::from_str(text)
            .map_err(|e| ComposerError::Configuration(format!("Invalid YAML config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Check that the base URL is an absolute http(s) URL
    pub fn validate(&self) -> ComposerResult<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            ComposerError::Configuration(format!("Invalid backend URL {}: {}", self.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ComposerError::Configuration(format!(
                "Backend URL must use http or https: {}",
                self.base_url
            )));
        }
        if self.timeout_ms == 0 {
            return Err(ComposerError::Configuration(
                "Timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// WebSocket URL of the progress stream
    pub fn progress_url(&self) -> ComposerResult<Url> {
        let mut url = Url::parse(&format!("{}/progress", self.base())).map_err(|e| {
            ComposerError::Configuration(format!("Invalid backend URL {}: {}", self.base_url, e))
        })?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme).map_err(|_| {
            ComposerError::Configuration(format!("Cannot derive progress URL from {}", self.base_url))
        })?;
        Ok(url)
    }
}
