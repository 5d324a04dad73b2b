//! # In-Memory Store
//!
//! `BTreeMap` behind a `parking_lot::RwLock`. Used for tests and for nodes
//! that do not persist their history.
//!
//! The map is shared copy-on-write: an iterator takes a reference to the
//! current version and a write after that works on a fresh copy.

use super::batch::StoreBatch;
use super::iterator::{MemoryMap, SnapshotIterator};
use crate::domain::{KVResult, KVStoreError, StoreConfig};
use crate::ports::{BatchOperation, KeyValueStore, KvIterator, WriteBatch};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Default)]
struct MemoryState {
    data: Arc<MemoryMap>,
    closed: bool,
}

#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    max_pending_txns: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(&StoreConfig::default())
    }
}

impl MemoryStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            max_pending_txns: config.max_pending_txns,
        }
    }

    pub fn len(&self) -> usize {
        self.state.read().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn put(&self, key: &[u8], value: &[u8]) -> KVResult<()> {
        let mut state = self.state.write();
        if state.closed {
            return Err(KVStoreError::Closed);
        }
        Arc::make_mut(&mut state.data).insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &[u8]) -> KVResult<Vec<u8>> {
        let state = self.state.read();
        if state.closed {
            return Err(KVStoreError::Closed);
        }
        state
            .data
            .get(key)
            .cloned()
            .ok_or_else(|| KVStoreError::key_not_found(key))
    }

    fn has(&self, key: &[u8]) -> KVResult<bool> {
        let state = self.state.read();
        if state.closed {
            return Err(KVStoreError::Closed);
        }
        Ok(state.data.contains_key(key))
    }

    fn delete(&self, key: &[u8]) -> KVResult<()> {
        let mut state = self.state.write();
        if state.closed {
            return Err(KVStoreError::Closed);
        }
        if state.data.contains_key(key) {
            Arc::make_mut(&mut state.data).remove(key);
        }
        Ok(())
    }

    fn new_iterator(&self, reverse: bool) -> KVResult<Box<dyn KvIterator + '_>> {
        let state = self.state.read();
        if state.closed {
            return Err(KVStoreError::Closed);
        }
        Ok(Box::new(SnapshotIterator::new(Arc::clone(&state.data), reverse)))
    }

    fn new_batch(&self) -> Box<dyn WriteBatch + '_> {
        Box::new(StoreBatch::new(self, self.max_pending_txns))
    }

    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> KVResult<()> {
        let mut state = self.state.write();
        if state.closed {
            return Err(KVStoreError::Closed);
        }
        let data = Arc::make_mut(&mut state.data);
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn close(&self) -> KVResult<()> {
        let mut state = self.state.write();
        state.closed = true;
        state.data = Arc::default();
        Ok(())
    }

    fn db_path(&self) -> Option<&Path> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_basic_operations() {
        let store = MemoryStore::default();

        store.put(b"key1", b"value1").unwrap();
        store.put(b"key2", b"value2").unwrap();

        assert_eq!(store.get(b"key1").unwrap(), b"value1".to_vec());
        assert!(store.get(b"key3").unwrap_err().is_not_found());
        assert!(store.has(b"key2").unwrap());
        assert!(!store.has(b"key3").unwrap());

        store.delete(b"key1").unwrap();
        store.delete(b"key1").unwrap();
        assert!(!store.has(b"key1").unwrap());
        assert_eq!(store.db_path(), None);
    }

    #[test]
    fn test_batch_is_invisible_until_commit() {
        let store = MemoryStore::default();
        store.put(b"stale", b"x").unwrap();

        let mut batch = store.new_batch();
        batch.set(b"a", b"1").unwrap();
        batch.set(b"b", b"2").unwrap();
        batch.delete(b"stale").unwrap();
        assert_eq!(batch.len(), 3);
        assert!(!store.has(b"a").unwrap());

        batch.commit().unwrap();

        assert!(batch.is_empty());
        assert_eq!(store.get(b"b").unwrap(), b"2".to_vec());
        assert!(!store.has(b"stale").unwrap());
    }

    #[test]
    fn test_batch_cancel_and_limit() {
        let store = MemoryStore::default();
        let mut batch = store.new_batch();
        batch.set_max_pending_txns(2);

        batch.set(b"a", b"1").unwrap();
        batch.set(b"b", b"2").unwrap();
        assert!(matches!(
            batch.set(b"c", b"3"),
            Err(KVStoreError::BatchFull { max: 2 })
        ));

        batch.cancel();
        batch.commit().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_iterator_is_a_snapshot() {
        let store = MemoryStore::default();
        store.put(b"b:1", b"one").unwrap();
        store.put(b"b:2", b"two").unwrap();

        let mut it = store.new_iterator(false).unwrap();
        store.put(b"b:3", b"three").unwrap();

        let mut seen = Vec::new();
        it.seek(b"b:");
        while it.valid_for_prefix(b"b:") {
            seen.push(it.value().map(<[u8]>::to_vec));
            it.next();
        }
        assert_eq!(seen, vec![Some(b"one".to_vec()), Some(b"two".to_vec())]);

        let mut rev = store.new_iterator(true).unwrap();
        assert_eq!(rev.key(), Some(&b"b:3"[..]));
        rev.rewind();
        assert!(rev.valid());
    }

    #[test]
    fn test_closed_store_rejects_everything() {
        let store = MemoryStore::default();
        store.put(b"k", b"v").unwrap();
        store.close().unwrap();

        assert!(matches!(store.get(b"k"), Err(KVStoreError::Closed)));
        assert!(matches!(store.put(b"k", b"v"), Err(KVStoreError::Closed)));
        assert!(store.new_iterator(false).is_err());

        let mut batch = store.new_batch();
        batch.set(b"k", b"v").unwrap();
        assert!(matches!(batch.commit(), Err(KVStoreError::Closed)));
    }
}
