//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Hex text was malformed (missing prefix, odd length, bad digit)
    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),

    /// Invalid signature format (wrong length)
    #[error("Invalid signature format: expected {expected} bytes, got {actual}")]
    InvalidSignatureFormat {
        /// Expected signature length in bytes
        expected: usize,
        /// Actual signature length in bytes
        actual: usize,
    },

    /// Trailing recovery byte is not 0 or 1
    #[error("Invalid recovery ID: {0}")]
    InvalidRecoveryId(u8),

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Signing failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}
