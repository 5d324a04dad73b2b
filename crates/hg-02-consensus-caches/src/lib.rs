//! # hg-02-consensus-caches
//!
//! Indexing caches the ordering algorithm queries while it builds consensus:
//!
//! | Cache | Question it answers |
//! |-------|---------------------|
//! | `ParticipantEventsCache` | What has participant P created since index N? |
//! | `PeerSetCache` | Which roster was in effect at round R? |
//! | `PendingRoundsCache` | Which rounds still await a decision? |
//! | `SigPool` | Which block signatures are waiting to be attached? |
//!
//! `ConsensusCaches` bundles them for one store and resolves wire events
//! against the cached history.
//!
//! ## Concurrency
//!
//! The caches hold no locks. They belong to a single owner; sharing them
//! across threads requires an external mutex.

pub mod domain;
pub mod service;

// Re-export main types
pub use domain::{
    CacheConfig, CacheError, CacheResult, ParticipantEventsCache, PeerSetCache, PendingRound,
    PendingRoundsCache, RollingIndex, RollingIndexMap, SigPool,
};
pub use service::ConsensusCaches;
