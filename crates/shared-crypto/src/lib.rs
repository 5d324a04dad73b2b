//! # Shared Crypto - Consensus Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Keccak-256 | Content hashes of events, blocks, peer sets |
//! | `ecdsa` | secp256k1 (recoverable) | Event, block and internal transaction signing |
//! | `encoding` | hex | Textual forms of hashes, signatures, identities |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic, low-S normalization (EIP-2)
//! - **Total decoding**: malformed hex, lengths and keys return errors

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod encoding;
pub mod errors;
pub mod hashing;

// Re-exports
pub use ecdsa::{
    public_key_identity, verify_signature, RecoverableSignature, Secp256k1KeyPair,
    Secp256k1PublicKey, COMPRESSED_PUBKEY_LENGTH, SIGNATURE_LENGTH,
};
pub use encoding::{decode_hex, encode_hex, encode_hex_upper, normalize_identity};
pub use errors::CryptoError;
pub use hashing::{keccak256, keccak256_many, Hash, KeccakHasher};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
