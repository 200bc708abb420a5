use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;

use composer_core::domain::{LinkReport, LinkStatus};

use crate::blocklist::CompetitorBlocklist;
use crate::error::ValidatorError;

const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Validator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Per-probe timeout
    pub probe_timeout: Duration,
    /// Pause between consecutive probes
    pub request_delay: Duration,
    /// Relay prefix; the target URL is appended percent-encoded
    pub cors_relay_url: Option<String>,
    /// Probe over HTTP; when false only URL syntax and the blocklist are checked
    pub use_network_check: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(10),
            request_delay: Duration::ZERO,
            cors_relay_url: None,
            use_network_check: true,
        }
    }
}

impl ValidatorConfig {
    pub fn offline() -> Self {
        Self {
            use_network_check: false,
            ..Self::default()
        }
    }
}

/// Outcome of checking one URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub url: String,
    /// HTTP status, 0 when no response was received
    pub status: u16,
    pub is_valid: bool,
    pub is_competitor: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    fn competitor(url: &str) -> Self {
        Self {
            url: url.to_string(),
            status: 0,
            is_valid: false,
            is_competitor: true,
            error: None,
        }
    }

    fn failed(url: &str, error: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            status: 0,
            is_valid: false,
            is_competitor: false,
            error: Some(error.into()),
        }
    }

    fn responded(url: &str, status: StatusCode) -> Self {
        Self {
            url: url.to_string(),
            status: status.as_u16(),
            is_valid: status.is_success(),
            is_competitor: false,
            error: None,
        }
    }

    /// Competitor wins over validity
    pub fn link_status(&self) -> LinkStatus {
        if self.is_competitor {
            LinkStatus::Competitor
        } else if self.is_valid {
            LinkStatus::Valid
        } else {
            LinkStatus::Invalid
        }
    }
}

/// Sequential link checker
#[derive(Debug, Clone)]
pub struct LinkValidator {
    config: ValidatorConfig,
    blocklist: CompetitorBlocklist,
    http: Client,
}

impl LinkValidator {
    pub fn new(config: ValidatorConfig) -> Result<Self, ValidatorError> {
        if let Some(relay) = &config.cors_relay_url {
            let parsed =
                Url::parse(relay).map_err(|_| ValidatorError::InvalidRelay(relay.clone()))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ValidatorError::InvalidRelay(relay.clone()));
            }
        }
        let http = Client::builder()
            .build()
            .map_err(|e| ValidatorError::Client(e.to_string()))?;
        Ok(Self {
            config,
            blocklist: CompetitorBlocklist::default(),
            http,
        })
    }

    pub fn with_blocklist(mut self, blocklist: CompetitorBlocklist) -> Self {
        self.blocklist = blocklist;
        self
    }

    pub fn blocklist(&self) -> &CompetitorBlocklist {
        &self.blocklist
    }

    pub fn blocklist_mut(&mut self) -> &mut CompetitorBlocklist {
        &mut self.blocklist
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate a list of URLs without progress reporting
    pub async fn validate<S: AsRef<str>>(&self, urls: &[S]) -> LinkReport {
        self.validate_with_progress(urls, |_, _| {}).await
    }

    /// Validate URLs in order, reporting `(percent, url)` before each check
    /// and `(100, "Complete")` at the end
    #[instrument(skip(self, urls, on_progress), fields(count = urls.len()))]
    pub async fn validate_with_progress<S: AsRef<str>>(
        &self,
        urls: &[S],
        on_progress: impl FnMut(u8, &str),
    ) -> LinkReport {
        let results = self.sweep(urls, on_progress).await;
        let mut report = LinkReport::default();
        for result in results {
            let status = result.link_status();
            report.push(result.url, status);
        }
        info!(
            valid = report.valid_links.len(),
            invalid = report.invalid_links.len(),
            competitor = report.competitor_links.len(),
            "Link validation complete"
        );
        report
    }

    /// Check every URL and return the individual results in input order
    pub async fn sweep<S: AsRef<str>>(
        &self,
        urls: &[S],
        mut on_progress: impl FnMut(u8, &str),
    ) -> Vec<ValidationResult> {
        let total = urls.len();
        let mut results = Vec::with_capacity(total);
        for (index, url) in urls.iter().enumerate() {
            let url = url.as_ref();
            let percent = ((index as f64 / total as f64) * 100.0).round() as u8;
            on_progress(percent, url);

            if index > 0 && !self.config.request_delay.is_zero() {
                tokio::time::sleep(self.config.request_delay).await;
            }

            let result = if self.config.use_network_check {
                self.check_url(url).await
            } else {
                self.check_url_basic(url)
            };
            results.push(result);
        }
        on_progress(100, "Complete");
        results
    }

    /// Probe one URL over HTTP. Competitor domains are not probed.
    pub async fn check_url(&self, url: &str) -> ValidationResult {
        if self.blocklist.is_competitor(url) {
            debug!(%url, "Competitor domain, skipping probe");
            return ValidationResult::competitor(url);
        }

        match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => return ValidationResult::failed(url, "Invalid URL format"),
        }

        let target = self.probe_target(url);
        match self.probe(&target).await {
            Ok(status) => {
                debug!(%url, status = status.as_u16(), "Probed link");
                ValidationResult::responded(url, status)
            }
            Err(e) => {
                warn!(%url, "Link probe failed: {}", e);
                ValidationResult::failed(url, e.to_string())
            }
        }
    }

    /// Classify by syntax and blocklist only
    pub fn check_url_basic(&self, url: &str) -> ValidationResult {
        if self.blocklist.is_competitor(url) {
            return ValidationResult::competitor(url);
        }
        match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
                ValidationResult::responded(url, StatusCode::OK)
            }
            Ok(parsed) => ValidationResult::failed(
                url,
                format!("Unsupported URL scheme: {}", parsed.scheme()),
            ),
            Err(_) => ValidationResult::failed(url, "Invalid URL format"),
        }
    }

    fn probe_target(&self, url: &str) -> String {
        match &self.config.cors_relay_url {
            Some(relay) => format!("{}{}", relay, urlencoding::encode(url)),
            None => url.to_string(),
        }
    }

    /// HEAD first; servers that refuse HEAD get a GET
    async fn probe(&self, target: &str) -> Result<StatusCode, reqwest::Error> {
        let status = self.send(self.http.head(target)).await?;
        if status == StatusCode::METHOD_NOT_ALLOWED || status == StatusCode::NOT_IMPLEMENTED {
            debug!(%target, "HEAD refused, retrying with GET");
            return self.send(self.http.get(target)).await;
        }
        Ok(status)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<StatusCode, reqwest::Error> {
        let response = request
            .header(ACCEPT, BROWSER_ACCEPT)
            .timeout(self.config.probe_timeout)
            .send()
            .await?;
        Ok(response.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline() -> LinkValidator {
        LinkValidator::new(ValidatorConfig::offline()).unwrap()
    }

    #[test]
    fn basic_check_accepts_http_urls() {
        let result = offline().check_url_basic("https://www.nature.com/articles/1");
        assert!(result.is_valid);
        assert_eq!(result.status, 200);
        assert_eq!(result.link_status(), LinkStatus::Valid);
    }

    #[test]
    fn basic_check_rejects_malformed_urls() {
        let result = offline().check_url_basic("nature dot com");
        assert!(!result.is_valid);
        assert_eq!(result.status, 0);
        assert_eq!(result.error.as_deref(), Some("Invalid URL format"));
    }

    #[test]
    fn basic_check_flags_competitors() {
        let result = offline().check_url_basic("https://www.glassdoor.com/Reviews");
        assert!(result.is_competitor);
        assert!(!result.is_valid);
        assert_eq!(result.link_status(), LinkStatus::Competitor);
    }

    #[test]
    fn relay_prefix_encodes_the_target() {
        let validator = LinkValidator::new(ValidatorConfig {
            cors_relay_url: Some("https://relay.example/raw?url=".to_string()),
            ..ValidatorConfig::default()
        })
        .unwrap();
        assert_eq!(
            validator.probe_target("https://a.org/x?y=1"),
            "https://relay.example/raw?url=https%3A%2F%2Fa.org%2Fx%3Fy%3D1"
        );
    }

    #[test]
    fn invalid_relay_is_rejected() {
        let result = LinkValidator::new(ValidatorConfig {
            cors_relay_url: Some("relay".to_string()),
            ..ValidatorConfig::default()
        });
        assert!(matches!(result, Err(ValidatorError::InvalidRelay(_))));
    }
}
