use thiserror::Error;

/// Validator construction errors. Individual link failures are results, not
/// errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidatorError {
    /// CORS relay prefix is not an http(s) URL
    #[error("Invalid CORS relay URL: {0}")]
    InvalidRelay(String),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let cases = vec![
            (
                ValidatorError::InvalidRelay("relay".to_string()),
                "Invalid CORS relay URL: relay",
            ),
            (
                ValidatorError::Client("tls".to_string()),
                "HTTP client error: tls",
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }
}
