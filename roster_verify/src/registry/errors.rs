//! Registry error types.

use thiserror::Error;

use crate::db::StoreError;
use crate::model::KeyError;
use crate::remote::RemoteError;

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Invalid key, non-primary elevation, or undecodable value
    #[error(transparent)]
    Key(#[from] KeyError),

    /// A batch mixed key shapes
    #[error("Mixed key shapes in batch: expected {expected}, found {found}")]
    MixedKeyShape { expected: String, found: String },

    /// Underlying store failure on a read path
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// The remote platform could not be reached or returned garbage
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// A returned row could not be matched to its parent
    #[error("Internal consistency error: {0}")]
    InternalConsistency(String),
}

impl RegistryError {
    /// Get a client-safe error message that doesn't leak storage details
    pub fn client_message(&self) -> String {
        match self {
            RegistryError::Storage(_) => "Unable to read from the database".to_string(),
            RegistryError::Remote(_) => "Unable to reach the tournament platform".to_string(),
            RegistryError::InternalConsistency(_) => "Internal error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;
