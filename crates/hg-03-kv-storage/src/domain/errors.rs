//! # Domain Errors
//!
//! Error types for the key-value layer and the typed consensus store.

use hg_02_consensus_caches::CacheError;
use thiserror::Error;

/// Errors raised by a `KeyValueStore` or the `ConsensusStore` above it.
///
/// A missing key is always `KeyNotFound`, never an `IOError`, so callers can
/// tell "absent" from "broken".
#[derive(Debug, Error)]
pub enum KVStoreError {
    #[error("key not found: {key}")]
    KeyNotFound { key: String },

    #[error("I/O error: {message}")]
    IOError { message: String },

    #[error("batch full: {max} pending operations")]
    BatchFull { max: usize },

    #[error("store is closed")]
    Closed,

    #[error("serialization error: {message}")]
    Serialization { message: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cache rebuild failed: {0}")]
    Cache(#[from] CacheError),
}

impl KVStoreError {
    /// Build `KeyNotFound`, rendering the key as text when it is UTF-8.
    pub fn key_not_found(key: &[u8]) -> Self {
        let key = match std::str::from_utf8(key) {
            Ok(text) => text.to_string(),
            Err(_) => format!("{key:02x?}"),
        };
        KVStoreError::KeyNotFound { key }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, KVStoreError::KeyNotFound { .. })
    }
}

impl From<hg_01_consensus_types::ModelError> for KVStoreError {
    fn from(e: hg_01_consensus_types::ModelError) -> Self {
        KVStoreError::Serialization {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for KVStoreError {
    fn from(e: serde_json::Error) -> Self {
        KVStoreError::Serialization {
            message: e.to_string(),
        }
    }
}

pub type KVResult<T> = Result<T, KVStoreError>;
