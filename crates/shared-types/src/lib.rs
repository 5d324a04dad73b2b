//! # Shared Types Crate
//!
//! Primitives, validator rosters and the store error vocabulary used by
//! every consensus crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: cross-crate types are defined here.
//! - **Immutable Rosters**: `PeerSet` values are never mutated in place; a
//!   roster change produces a new set.
//! - **Named Failures**: every cache/store error carries the store name, a
//!   `StoreErrorKind`, and the offending key.

pub mod entities;
pub mod errors;
pub mod peers;

pub use entities::*;
pub use errors::*;
pub use peers::{canonical_identity, Peer, PeerSet};
