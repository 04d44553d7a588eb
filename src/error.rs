//! Fatal error type for setup-time failures.
//!
//! Per-invocation failures (timeouts, rate limits, malformed bodies) are NOT
//! errors at this level: they are recorded inside
//! [`crate::adapter::Invocation`] records and the comparison run continues.
//! `MedirError` covers only conditions detected before any invocation begins,
//! such as missing credentials or an unusable HTTP client.

use thiserror::Error;

/// Error type for fatal, setup-time failures
#[derive(Debug, Error)]
pub enum MedirError {
    /// Credentials were not provided
    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    /// Configuration is unusable and has no safe correction
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// JSON serialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias using [`MedirError`]
pub type Result<T> = std::result::Result<T, MedirError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MedirError::MissingCredentials("MEDIR_API_KEY not set".to_string());
        assert_eq!(
            err.to_string(),
            "missing credentials: MEDIR_API_KEY not set"
        );

        let err = MedirError::InvalidConfig("repeats must be >= 1".to_string());
        assert!(err.to_string().contains("invalid configuration"));
    }

    #[test]
    fn test_serde_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: MedirError = parse_err.into();
        assert!(matches!(err, MedirError::Serialization(_)));
    }
}
