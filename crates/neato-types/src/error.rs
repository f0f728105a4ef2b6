//! Error types for data parsing in neato-types.

use thiserror::Error;

/// Errors that can occur when interpreting Neato cloud payloads.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The payload is structurally valid JSON but violates an expectation.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The cloud reported a command result other than `ok`.
    #[error("Robot reported result '{0}'")]
    CommandFailed(String),
}

/// Result type alias using neato-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
