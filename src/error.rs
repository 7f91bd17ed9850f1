//! Store-level errors

use crate::codec::CodecError;
use crate::config::ConfigError;
use crate::persistence::StorageError;
use thiserror::Error;

/// Errors surfaced by store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// A value could not be encoded, or a stored key could not be decoded
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Backend failure, including retries running out
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The operation needs more bound positions than it was given
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// The operation would fan out wider than allowed
    #[error("Operation addresses {requested} contexts, the limit is {max}")]
    Capacity { requested: usize, max: usize },
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Transient backend unavailability, as opposed to a usage or data error
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Storage(StorageError::Unavailable { .. }))
    }
}
