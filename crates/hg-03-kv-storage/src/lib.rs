//! # hg-03-kv-storage
//!
//! Persistence for the consensus records.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ ConsensusStore (events, blocks, frames,      │
//! │                 peer sets, cache bootstrap)  │
//! └──────────────────────┬───────────────────────┘
//!                        │ KeyValueStore port
//!          ┌─────────────┴─────────────┐
//!          ▼                           ▼
//!    MemoryStore               RocksDbStore
//!  (BTreeMap + RwLock)      (feature = "rocksdb")
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut store = ConsensusStore::open(&StoreConfig::new().with_path("./data/hg"))?;
//! store.put_event(&mut event)?;
//! let caches = store.restore_caches(&CacheConfig::default())?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export main types
pub use adapters::{open_store, MemoryStore, SnapshotIterator, StoreBatch};
#[cfg(feature = "rocksdb")]
pub use adapters::RocksDbStore;
pub use domain::{KVResult, KVStoreError, KeyPrefix, StoreConfig, IDEAL_BATCH_SIZE};
pub use ports::{BatchOperation, KeyValueStore, KvIterator, WriteBatch};
pub use service::ConsensusStore;
