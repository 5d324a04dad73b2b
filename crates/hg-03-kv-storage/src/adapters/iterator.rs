//! Cursor over a shared, immutable version of the in-memory map.
//!
//! The iterator holds the map version current when it was created and
//! steps with `BTreeMap::range`, so it never copies more than the entry it
//! sits on. Writers clone the map only while such a version is still held.

use crate::ports::KvIterator;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

pub type MemoryMap = BTreeMap<Vec<u8>, Vec<u8>>;

pub struct SnapshotIterator {
    data: Arc<MemoryMap>,
    reverse: bool,
    current: Option<(Vec<u8>, Vec<u8>)>,
}

impl SnapshotIterator {
    /// Positioned on the first key (the last key when `reverse`).
    pub fn new(data: Arc<MemoryMap>, reverse: bool) -> Self {
        let mut it = Self {
            data,
            reverse,
            current: None,
        };
        it.rewind();
        it
    }

    fn land(&mut self, entry: Option<(&Vec<u8>, &Vec<u8>)>) {
        self.current = entry.map(|(k, v)| (k.clone(), v.clone()));
    }
}

impl KvIterator for SnapshotIterator {
    fn valid(&self) -> bool {
        self.current.is_some()
    }

    fn next(&mut self) {
        let Some((key, _)) = self.current.take() else {
            return;
        };
        let entry = if self.reverse {
            self.data
                .range::<[u8], _>((Bound::Unbounded, Bound::Excluded(key.as_slice())))
                .next_back()
        } else {
            self.data
                .range::<[u8], _>((Bound::Excluded(key.as_slice()), Bound::Unbounded))
                .next()
        };
        self.current = entry.map(|(k, v)| (k.clone(), v.clone()));
    }

    fn seek(&mut self, key: &[u8]) {
        let data = Arc::clone(&self.data);
        let entry = if self.reverse {
            data.range::<[u8], _>((Bound::Unbounded, Bound::Included(key)))
                .next_back()
        } else {
            data.range::<[u8], _>((Bound::Included(key), Bound::Unbounded))
                .next()
        };
        self.land(entry);
    }

    fn rewind(&mut self) {
        let data = Arc::clone(&self.data);
        let entry = if self.reverse {
            data.iter().next_back()
        } else {
            data.iter().next()
        };
        self.land(entry);
    }

    fn key(&self) -> Option<&[u8]> {
        self.current.as_ref().map(|(k, _)| k.as_slice())
    }

    fn value(&self) -> Option<&[u8]> {
        self.current.as_ref().map(|(_, v)| v.as_slice())
    }
}
