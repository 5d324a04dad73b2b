//! Error types for the consensus data model
//!
//! Verification failures that are not structural (a well-formed signature
//! that does not match) are reported as `Ok(false)` by the `verify`
//! methods, not as errors; the caller decides to discard the item.

use shared_crypto::CryptoError;
use shared_types::{PeerId, StoreError};
use thiserror::Error;

/// Consensus model error types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Missing parent: event {hash} has no other-parent")]
    MissingParent { hash: String },

    #[error("Invalid signature on internal transaction at position {position}")]
    InvalidInternalTransactionSignature { position: usize },

    #[error("Signature not found for validator {0}")]
    SignatureNotFound(String),

    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Unknown peer ID: {0}")]
    UnknownPeer(PeerId),

    #[error("Commit failed: {0}")]
    Commit(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<CryptoError> for ModelError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::InvalidPublicKey => ModelError::InvalidPublicKey,
            CryptoError::SigningFailed(reason) => ModelError::Signing(reason),
            CryptoError::InvalidPrivateKey => ModelError::Signing(err.to_string()),
            other => ModelError::Encoding(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Encoding(err.to_string())
    }
}

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;
