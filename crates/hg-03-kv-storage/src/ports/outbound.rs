//! # Outbound Ports (Driven Ports)
//!
//! The key-value contract the consensus store is written against.
//!
//! Production: `RocksDbStore` (`rocksdb` feature)
//! Testing: `MemoryStore`

use crate::domain::KVResult;
use std::path::Path;

/// Abstract interface for key-value database operations.
///
/// Every method takes `&self`; backends synchronize internally. After
/// `close` every operation fails with `KVStoreError::Closed`.
pub trait KeyValueStore: Send + Sync {
    fn put(&self, key: &[u8], value: &[u8]) -> KVResult<()>;

    /// Fails with `KeyNotFound` when the key is absent.
    fn get(&self, key: &[u8]) -> KVResult<Vec<u8>>;

    fn has(&self, key: &[u8]) -> KVResult<bool>;

    /// Deleting an absent key is not an error.
    fn delete(&self, key: &[u8]) -> KVResult<()>;

    /// Iterator over a point-in-time view of the store, positioned on the
    /// first key (the last key when `reverse`).
    fn new_iterator(&self, reverse: bool) -> KVResult<Box<dyn KvIterator + '_>>;

    fn new_batch(&self) -> Box<dyn WriteBatch + '_>;

    /// Apply all operations or none of them.
    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> KVResult<()>;

    fn close(&self) -> KVResult<()>;

    /// On-disk location, `None` for in-memory stores.
    fn db_path(&self) -> Option<&Path>;
}

/// Cursor over the store's keys in byte order.
pub trait KvIterator {
    fn valid(&self) -> bool;

    fn valid_for_prefix(&self, prefix: &[u8]) -> bool {
        self.key().is_some_and(|key| key.starts_with(prefix))
    }

    fn next(&mut self);

    /// Move to the first key `>= key` (`<= key` for a reverse iterator).
    fn seek(&mut self, key: &[u8]);

    /// Back to the first position.
    fn rewind(&mut self);

    /// `None` once the iterator is exhausted.
    fn key(&self) -> Option<&[u8]>;

    fn value(&self) -> Option<&[u8]>;
}

/// Buffered writes applied in one atomic step on `commit`.
pub trait WriteBatch {
    /// Fails with `BatchFull` once `max_pending_txns` operations are queued.
    fn set(&mut self, key: &[u8], value: &[u8]) -> KVResult<()>;

    fn delete(&mut self, key: &[u8]) -> KVResult<()>;

    /// Apply and clear the queued operations.
    fn commit(&mut self) -> KVResult<()>;

    /// Drop the queued operations.
    fn cancel(&mut self);

    fn set_max_pending_txns(&mut self, max: usize);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}
