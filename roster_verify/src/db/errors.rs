//! Store error types.

use thiserror::Error;

/// Errors raised by a `TournamentStore`
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An update matched no row
    #[error("No {table} row for key \"{key}\"")]
    RowNotFound { table: &'static str, key: String },

    /// Failure reported by a non-SQL backend
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
