//! # Core Primitives
//!
//! Fixed-size primitives shared by every consensus crate.

pub use shared_crypto::Hash;

/// A 20-byte account/contract address.
///
/// Carried by parachain governance transactions.
pub type Address = [u8; 20];

/// Numeric participant identifier derived from a peer's public key.
pub type PeerId = u32;

/// Index in a creator's sequence of events (0-based); `-1` means "none".
pub type EventIndex = i64;

/// Consensus round number.
pub type Round = i64;

/// Block sequence number.
pub type BlockIndex = i64;
