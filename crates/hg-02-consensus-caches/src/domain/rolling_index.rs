//! # Rolling Index
//!
//! A bounded log of items addressed by a strictly increasing index. The log
//! holds at most `2 * size` items; when full, the oldest `size` items are
//! dropped in one step, so callers can always read back at least the last
//! `size` entries.
//!
//! ## Rules
//!
//! - Indices have no gaps: `set` beyond `last + 1` is `SkippedIndex`.
//! - The first `set` on an empty log fixes the starting index.
//! - Indices older than the retained window are `TooLate`.
//! - An in-window index is overwritten in place.

use shared_types::{EventIndex, StoreError, StoreErrorKind};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Bounded, gap-free log.
#[derive(Debug, Clone)]
pub struct RollingIndex<T> {
    name: String,
    size: usize,
    last_index: EventIndex,
    items: Vec<T>,
}

impl<T: Clone> RollingIndex<T> {
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
            last_index: -1,
            items: Vec::with_capacity(2 * size),
        }
    }

    fn error(&self, kind: StoreErrorKind, key: impl Display) -> StoreError {
        StoreError::new(self.name.clone(), kind, key.to_string())
    }

    /// Index of the oldest retained item.
    fn oldest_index(&self) -> EventIndex {
        self.last_index - self.items.len() as EventIndex + 1
    }

    /// The retained window and the last index (-1 when nothing was set).
    pub fn last_window(&self) -> (&[T], EventIndex) {
        (&self.items, self.last_index)
    }

    pub fn last_index(&self) -> EventIndex {
        self.last_index
    }

    /// Items with index greater than `skip_index`, oldest first.
    pub fn get(&self, skip_index: EventIndex) -> Result<&[T], StoreError> {
        if skip_index > self.last_index {
            return Ok(&[]);
        }

        let oldest = self.oldest_index();
        if skip_index + 1 < oldest {
            return Err(self.error(StoreErrorKind::TooLate, skip_index));
        }

        let start = (skip_index + 1 - oldest) as usize;
        Ok(&self.items[start..])
    }

    pub fn get_item(&self, index: EventIndex) -> Result<&T, StoreError> {
        let oldest = self.oldest_index();
        if index < oldest {
            return Err(self.error(StoreErrorKind::TooLate, index));
        }

        self.items
            .get((index - oldest) as usize)
            .ok_or_else(|| self.error(StoreErrorKind::KeyNotFound, index))
    }

    pub fn set(&mut self, item: T, index: EventIndex) -> Result<(), StoreError> {
        if self.last_index >= 0 && index > self.last_index + 1 {
            return Err(self.error(StoreErrorKind::SkippedIndex, index));
        }

        if self.last_index < 0 || index == self.last_index + 1 {
            if self.items.len() >= 2 * self.size {
                self.roll();
            }
            self.items.push(item);
            self.last_index = index;
            return Ok(());
        }

        let oldest = self.oldest_index();
        if index < oldest {
            return Err(self.error(StoreErrorKind::TooLate, index));
        }

        let position = (index - oldest) as usize;
        self.items[position] = item;
        Ok(())
    }

    /// Drop the oldest `size` items.
    fn roll(&mut self) {
        let drop = self.size.min(self.items.len());
        self.items.drain(..drop);
    }
}

/// A [`RollingIndex`] per key.
#[derive(Debug, Clone)]
pub struct RollingIndexMap<K, T> {
    name: String,
    size: usize,
    mapping: BTreeMap<K, RollingIndex<T>>,
}

impl<K, T> RollingIndexMap<K, T>
where
    K: Ord + Copy + Display,
    T: Clone,
{
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
            mapping: BTreeMap::new(),
        }
    }

    fn error(&self, kind: StoreErrorKind, key: K) -> StoreError {
        StoreError::new(self.name.clone(), kind, key.to_string())
    }

    fn index(&self, key: K) -> Result<&RollingIndex<T>, StoreError> {
        self.mapping
            .get(&key)
            .ok_or_else(|| self.error(StoreErrorKind::KeyNotFound, key))
    }

    /// Register a key with an empty log.
    pub fn add_key(&mut self, key: K) -> Result<(), StoreError> {
        if self.mapping.contains_key(&key) {
            return Err(self.error(StoreErrorKind::KeyAlreadyExists, key));
        }
        self.mapping
            .insert(key, RollingIndex::new(self.name.clone(), self.size));
        Ok(())
    }

    pub fn contains_key(&self, key: K) -> bool {
        self.mapping.contains_key(&key)
    }

    pub fn get(&self, key: K, skip_index: EventIndex) -> Result<&[T], StoreError> {
        self.index(key)?.get(skip_index)
    }

    pub fn get_item(&self, key: K, index: EventIndex) -> Result<&T, StoreError> {
        self.index(key)?.get_item(index)
    }

    pub fn get_last(&self, key: K) -> Result<&T, StoreError> {
        let (window, _) = self.index(key)?.last_window();
        window
            .last()
            .ok_or_else(|| self.error(StoreErrorKind::Empty, key))
    }

    /// Write `item` at `index`; an unregistered key is registered first.
    pub fn set(&mut self, key: K, item: T, index: EventIndex) -> Result<(), StoreError> {
        let (name, size) = (&self.name, self.size);
        self.mapping
            .entry(key)
            .or_insert_with(|| RollingIndex::new(name.clone(), size))
            .set(item, index)
    }

    /// Last recorded index per key (-1 for keys without items).
    pub fn known(&self) -> BTreeMap<K, EventIndex> {
        self.mapping
            .iter()
            .map(|(key, index)| (*key, index.last_index()))
            .collect()
    }

    /// Forget every key.
    pub fn reset(&mut self) {
        self.mapping.clear();
    }
}
