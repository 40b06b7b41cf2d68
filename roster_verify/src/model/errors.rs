//! Model error types.

use thiserror::Error;

/// Errors raised while building or transforming keys and decoding row values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// All three key segments were empty
    #[error("Invalid key: event, team and player ids cannot all be empty")]
    InvalidKey,

    /// Elevation requested on a wildcard key
    #[error("Cannot elevate non-primary key \"{0}\"")]
    NotPrimary(String),

    /// Unknown level, unknown status code, or malformed input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for key and decode operations
pub type KeyResult<T> = Result<T, KeyError>;
