//! Write batch shared by every backend: operations are buffered here and
//! handed to `KeyValueStore::atomic_batch_write` on commit.

use crate::domain::{KVResult, KVStoreError};
use crate::ports::{BatchOperation, KeyValueStore, WriteBatch};
use tracing::debug;

pub struct StoreBatch<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
    pending: Vec<BatchOperation>,
    max_pending: usize,
}

impl<'a, S: KeyValueStore + ?Sized> StoreBatch<'a, S> {
    pub fn new(store: &'a S, max_pending: usize) -> Self {
        Self {
            store,
            pending: Vec::new(),
            max_pending,
        }
    }

    fn push(&mut self, operation: BatchOperation) -> KVResult<()> {
        if self.pending.len() >= self.max_pending {
            return Err(KVStoreError::BatchFull {
                max: self.max_pending,
            });
        }
        self.pending.push(operation);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> WriteBatch for StoreBatch<'_, S> {
    fn set(&mut self, key: &[u8], value: &[u8]) -> KVResult<()> {
        self.push(BatchOperation::put(key, value))
    }

    fn delete(&mut self, key: &[u8]) -> KVResult<()> {
        self.push(BatchOperation::delete(key))
    }

    fn commit(&mut self) -> KVResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let operations = std::mem::take(&mut self.pending);
        debug!(operations = operations.len(), "committing batch");
        self.store.atomic_batch_write(operations)
    }

    fn cancel(&mut self) {
        self.pending.clear();
    }

    fn set_max_pending_txns(&mut self, max: usize) {
        self.max_pending = max;
    }

    fn len(&self) -> usize {
        self.pending.len()
    }
}
