//! # Storage Adapters
//!
//! Implementations of the `KeyValueStore` port.

mod batch;
mod iterator;
mod memory;
#[cfg(feature = "rocksdb")]
mod rocksdb;

pub use batch::StoreBatch;
pub use iterator::SnapshotIterator;
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb")]
pub use self::rocksdb::RocksDbStore;

use crate::domain::{KVResult, StoreConfig};
use crate::ports::KeyValueStore;

/// Open the backend `config` selects.
pub fn open_store(config: &StoreConfig) -> KVResult<Box<dyn KeyValueStore>> {
    config.validate()?;
    match &config.path {
        None => Ok(Box::new(MemoryStore::new(config))),
        Some(path) => open_on_disk(config, path),
    }
}

#[cfg(feature = "rocksdb")]
fn open_on_disk(config: &StoreConfig, _path: &std::path::Path) -> KVResult<Box<dyn KeyValueStore>> {
    Ok(Box::new(RocksDbStore::open(config)?))
}

#[cfg(not(feature = "rocksdb"))]
fn open_on_disk(_config: &StoreConfig, path: &std::path::Path) -> KVResult<Box<dyn KeyValueStore>> {
    Err(crate::domain::KVStoreError::InvalidConfig(format!(
        "cannot open {}: built without the rocksdb feature",
        path.display()
    )))
}
