//! # Store Configuration
//!
//! Backend selection, batch limits and the key layout of the consensus store.

use super::errors::{KVResult, KVStoreError};
use shared_crypto::normalize_identity;
use std::path::PathBuf;

/// Number of queued writes after which a batch is worth flushing.
pub const IDEAL_BATCH_SIZE: usize = 25;

/// Configuration for the key-value backend.
///
/// `path == None` selects the in-memory store; a path selects the on-disk
/// store (RocksDB, behind the `rocksdb` feature).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub path: Option<PathBuf>,

    /// Upper bound on operations buffered in one `WriteBatch` (default: 10k).
    pub max_pending_txns: usize,

    /// fsync every write (default: false).
    pub sync_writes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_pending_txns: 10_000,
            sync_writes: false,
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_max_pending_txns(mut self, max: usize) -> Self {
        self.max_pending_txns = max;
        self
    }

    pub fn with_sync_writes(mut self, sync: bool) -> Self {
        self.sync_writes = sync;
        self
    }

    pub fn validate(&self) -> KVResult<()> {
        if self.max_pending_txns == 0 {
            return Err(KVStoreError::InvalidConfig(
                "max_pending_txns cannot be 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Key prefixes for the consensus store.
///
/// Numeric suffixes are encoded order-preserving (sign bit flipped,
/// big-endian) so that a forward scan visits them in ascending order,
/// negative values included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPrefix {
    /// `e:{hex}` -> Event
    Event,
    /// `p:{identity}:{index}` -> event hex
    ParticipantEvent,
    /// `o:{topological index}` -> event hex
    Topological,
    /// `b:{index}` -> Block
    Block,
    /// `f:{round}` -> Frame
    Frame,
    /// `s:{round}` -> PeerSet
    PeerSet,
}

impl KeyPrefix {
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            KeyPrefix::Event => b"e:",
            KeyPrefix::ParticipantEvent => b"p:",
            KeyPrefix::Topological => b"o:",
            KeyPrefix::Block => b"b:",
            KeyPrefix::Frame => b"f:",
            KeyPrefix::PeerSet => b"s:",
        }
    }

    pub fn key(&self, suffix: &[u8]) -> Vec<u8> {
        let mut key = self.as_bytes().to_vec();
        key.extend_from_slice(suffix);
        key
    }

    /// Key under `self` for a signed counter.
    pub fn indexed_key(&self, index: i64) -> Vec<u8> {
        self.key(&encode_index(index))
    }

    pub fn event_key(hex: &str) -> Vec<u8> {
        KeyPrefix::Event.key(hex.as_bytes())
    }

    /// Prefix shared by every event of `participant`.
    pub fn participant_prefix(participant: &str) -> Vec<u8> {
        let mut key = KeyPrefix::ParticipantEvent.key(normalize_identity(participant).as_bytes());
        key.push(b':');
        key
    }

    pub fn participant_event_key(participant: &str, index: i64) -> Vec<u8> {
        let mut key = Self::participant_prefix(participant);
        key.extend_from_slice(&encode_index(index));
        key
    }
}

/// Order-preserving encoding of a signed counter.
pub fn encode_index(index: i64) -> [u8; 8] {
    ((index as u64) ^ (1 << 63)).to_be_bytes()
}

/// Inverse of `encode_index`. `None` unless `bytes` is exactly 8 long.
pub fn decode_index(bytes: &[u8]) -> Option<i64> {
    let raw: [u8; 8] = bytes.try_into().ok()?;
    Some((u64::from_be_bytes(raw) ^ (1 << 63)) as i64)
}
