//! Error types for the consensus caches

use hg_01_consensus_types::ModelError;
use shared_types::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;
