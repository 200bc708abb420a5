//! Logging setup shared by the Composer binaries.

use std::env;

use serde::{Deserialize, Serialize};

pub mod logging;

pub use logging::{init_logging, LogExt};

/// Configuration for initializing logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Service name attached to the startup event
    pub service_name: String,

    /// Filter directives used when `RUST_LOG` is unset
    pub log_filter: String,

    /// JSON output instead of the pretty format
    pub enable_json_logging: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            service_name: "composer".to_string(),
            log_filter: "info".to_string(),
            enable_json_logging: false,
        }
    }
}

impl MonitoringConfig {
    /// Defaults overridden by `LOG_FILTER` and `COMPOSER_LOG_JSON`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(filter) = lookup("LOG_FILTER") {
            if !filter.trim().is_empty() {
                config.log_filter = filter;
            }
        }
        if let Some(json) = lookup("COMPOSER_LOG_JSON") {
            config.enable_json_logging = json.eq_ignore_ascii_case("true") || json == "1";
        }
        config
    }

    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = service_name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_switches_json_and_filter() {
        let config = MonitoringConfig::from_lookup(|key| match key {
            "LOG_FILTER" => Some("composer_core=debug".to_string()),
            "COMPOSER_LOG_JSON" => Some("TRUE".to_string()),
            _ => None,
        });
        assert_eq!(config.log_filter, "composer_core=debug");
        assert!(config.enable_json_logging);
    }

    #[test]
    fn blank_filter_keeps_default() {
        let config = MonitoringConfig::from_lookup(|key| (key == "LOG_FILTER").then(|| " ".to_string()));
        assert_eq!(config, MonitoringConfig::default());
    }
}
