//! # RocksDB Store
//!
//! On-disk `KeyValueStore`. Snappy compression, bloom filters, and a single
//! column family: the consensus store namespaces its records by key prefix.
//!
//! Iterators are thin wrappers over `DBRawIterator`: they read the version
//! of the database current when they were created and seek inside it
//! without loading anything beyond the entry they sit on.
//!
//! `close` flushes the memtables and fails every later call with
//! `Closed`; the directory lock is released when the store is dropped.

use super::batch::StoreBatch;
use crate::domain::{KVResult, KVStoreError, StoreConfig};
use crate::ports::{BatchOperation, KeyValueStore, KvIterator, WriteBatch};
use rocksdb::{BlockBasedOptions, DBCompressionType, DBRawIterator, Options, WriteOptions, DB};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

pub struct RocksDbStore {
    db: DB,
    closed: AtomicBool,
    path: PathBuf,
    sync_writes: bool,
    max_pending_txns: usize,
}

fn io_error(operation: &str, e: rocksdb::Error) -> KVStoreError {
    KVStoreError::IOError {
        message: format!("RocksDB {operation} failed: {e}"),
    }
}

impl RocksDbStore {
    /// Open or create the database at `config.path`.
    pub fn open(config: &StoreConfig) -> KVResult<Self> {
        config.validate()?;
        let path = config.path.clone().ok_or_else(|| {
            KVStoreError::InvalidConfig("RocksDB store needs a path".to_string())
        })?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_compression_type(DBCompressionType::Snappy);

        let mut block_opts = BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        opts.set_block_based_table_factory(&block_opts);

        let db = DB::open(&opts, &path).map_err(|e| io_error("open", e))?;
        info!(path = %path.display(), "opened RocksDB store");

        Ok(Self {
            db,
            closed: AtomicBool::new(false),
            path,
            sync_writes: config.sync_writes,
            max_pending_txns: config.max_pending_txns,
        })
    }

    fn db(&self) -> KVResult<&DB> {
        if self.closed.load(Ordering::Acquire) {
            return Err(KVStoreError::Closed);
        }
        Ok(&self.db)
    }

    fn write_options(&self) -> WriteOptions {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.sync_writes);
        write_opts
    }
}

impl KeyValueStore for RocksDbStore {
    fn put(&self, key: &[u8], value: &[u8]) -> KVResult<()> {
        self.db()?
            .put_opt(key, value, &self.write_options())
            .map_err(|e| io_error("put", e))
    }

    fn get(&self, key: &[u8]) -> KVResult<Vec<u8>> {
        self.db()?
            .get(key)
            .map_err(|e| io_error("get", e))?
            .ok_or_else(|| KVStoreError::key_not_found(key))
    }

    fn has(&self, key: &[u8]) -> KVResult<bool> {
        self.db()?
            .get_pinned(key)
            .map(|v| v.is_some())
            .map_err(|e| io_error("has", e))
    }

    fn delete(&self, key: &[u8]) -> KVResult<()> {
        self.db()?
            .delete_opt(key, &self.write_options())
            .map_err(|e| io_error("delete", e))
    }

    fn new_iterator(&self, reverse: bool) -> KVResult<Box<dyn KvIterator + '_>> {
        let mut it = RocksDbIterator {
            raw: self.db()?.raw_iterator(),
            reverse,
        };
        it.rewind();
        it.raw.status().map_err(|e| io_error("iterator", e))?;
        Ok(Box::new(it))
    }

    fn new_batch(&self) -> Box<dyn WriteBatch + '_> {
        Box::new(StoreBatch::new(self, self.max_pending_txns))
    }

    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> KVResult<()> {
        let db = self.db()?;

        let mut batch = rocksdb::WriteBatch::default();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => batch.put(&key, &value),
                BatchOperation::Delete { key } => batch.delete(&key),
            }
        }
        db.write_opt(batch, &self.write_options())
            .map_err(|e| io_error("batch write", e))
    }

    fn close(&self) -> KVResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.db.flush().map_err(|e| io_error("flush", e))?;
        info!(path = %self.path.display(), "closed RocksDB store");
        Ok(())
    }

    fn db_path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Cursor over the live database. A read error ends the iteration and is
/// logged.
struct RocksDbIterator<'a> {
    raw: DBRawIterator<'a>,
    reverse: bool,
}

impl RocksDbIterator<'_> {
    fn check_status(&self) {
        if let Err(e) = self.raw.status() {
            warn!(error = %e, "RocksDB iterator stopped");
        }
    }
}

impl KvIterator for RocksDbIterator<'_> {
    fn valid(&self) -> bool {
        self.raw.valid()
    }

    fn next(&mut self) {
        if !self.raw.valid() {
            return;
        }
        if self.reverse {
            self.raw.prev();
        } else {
            self.raw.next();
        }
        self.check_status();
    }

    fn seek(&mut self, key: &[u8]) {
        if self.reverse {
            self.raw.seek_for_prev(key);
        } else {
            self.raw.seek(key);
        }
        self.check_status();
    }

    fn rewind(&mut self) {
        if self.reverse {
            self.raw.seek_to_last();
        } else {
            self.raw.seek_to_first();
        }
    }

    fn key(&self) -> Option<&[u8]> {
        self.raw.key()
    }

    fn value(&self) -> Option<&[u8]> {
        self.raw.value()
    }
}
