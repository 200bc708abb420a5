use thiserror::Error;

/// Result alias used across the composer crates
pub type ComposerResult<T> = Result<T, ComposerError>;

/// Error type for workflow, backend and export operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposerError {
    /// Transport failure (connection refused, DNS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Backend answered with a non-2xx status
    #[error("HTTP {status}: {reason}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Reason phrase or response body excerpt
        reason: String,
    },

    /// Response body was not the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Backend reported `success: false`
    #[error("{0}")]
    Backend(String),

    /// Input or precondition rejected before any call was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation invoked at a step where it is not available
    #[error("{operation} is not available at the {step} step")]
    WrongStep {
        /// Operation name
        operation: String,
        /// Current step name
        step: String,
    },

    /// Another call is still in flight
    #[error("Another workflow call is still in progress")]
    Busy,

    /// Local export conversion failed
    #[error("Export error: {0}")]
    Export(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ComposerError {
    /// Whether the error came from the transport rather than the backend's answer
    pub fn is_transport(&self) -> bool {
        matches!(self, ComposerError::Network(_))
    }
}

impl From<serde_json::Error> for ComposerError {
    fn from(err: serde_json::Error) -> Self {
        ComposerError::Parse(err.to_string())
    }
}

impl From<url::ParseError> for ComposerError {
    fn from(err: url::ParseError) -> Self {
        ComposerError::Validation(format!("Invalid URL: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let errors = vec![
            (ComposerError::Network("refused".to_string()), "Network error: refused"),
            (
                ComposerError::Status { status: 502, reason: "Bad Gateway".to_string() },
                "HTTP 502: Bad Gateway",
            ),
            (ComposerError::Parse("eof".to_string()), "Parse error: eof"),
            (ComposerError::Backend("Research failed".to_string()), "Research failed"),
            (ComposerError::Validation("no draft".to_string()), "Validation error: no draft"),
            (
                ComposerError::WrongStep { operation: "Draft".to_string(), step: "Keywords".to_string() },
                "Draft is not available at the Keywords step",
            ),
            (ComposerError::Busy, "Another workflow call is still in progress"),
            (ComposerError::Export("pdf".to_string()), "Export error: pdf"),
            (ComposerError::Configuration("url".to_string()), "Configuration error: url"),
        ];

        for (error, expected_msg) in errors {
            assert_eq!(error.to_string(), expected_msg);
        }
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: ComposerError = json_error.into();

        match error {
            ComposerError::Parse(msg) => assert!(msg.contains("key must be a string")),
            _ => panic!("Expected Parse variant"),
        }
    }

    #[test]
    fn test_is_transport() {
        assert!(ComposerError::Network("timeout".to_string()).is_transport());
        assert!(!ComposerError::Status { status: 404, reason: "Not Found".to_string() }.is_transport());
    }
}
