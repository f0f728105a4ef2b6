//! Error types for neato-core.
//!
//! Every failure talking to the Neato cloud surfaces as an [`Error`].
//! Callers polling on an interval treat all of them as transient: the
//! next poll simply tries again.

use thiserror::Error;

/// Errors that can occur when talking to the Neato cloud.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Transport-level HTTP failure (DNS, TLS, timeout, connection reset).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The cloud answered with a non-success status.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("Failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The payload decoded but is not acceptable.
    #[error(transparent)]
    Parse(#[from] neato_types::ParseError),

    /// The client was configured with an unusable value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failure injected by [`crate::MockApi`].
    #[error("Mock failure: {0}")]
    Mock(String),
}

/// Result type alias using neato-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = Error::Api {
            status: 401,
            message: "unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "API error 401: unauthorized");
    }

    #[test]
    fn test_decode_error_display() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::Decode {
            what: "robot state",
            source,
        };
        assert!(err.to_string().starts_with("Failed to decode robot state"));
    }

    #[test]
    fn test_parse_error_is_transparent() {
        let err: Error = neato_types::ParseError::CommandFailed("ko".to_string()).into();
        assert_eq!(err.to_string(), "Robot reported result 'ko'");
    }
}
