//! # Signature Pool
//!
//! Block signatures waiting to be gossiped or attached to their block. One
//! entry per (block index, validator); a newer signature replaces an older
//! one.

use hg_01_consensus_types::BlockSignature;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct SigPool {
    items: HashMap<String, BlockSignature>,
}

impl SigPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, signature: BlockSignature) {
        self.items.insert(signature.key(), signature);
    }

    pub fn remove(&mut self, key: &str) -> Option<BlockSignature> {
        self.items.remove(key)
    }

    /// Drop pooled copies of signatures that made it into a block.
    pub fn remove_slice(&mut self, signatures: &[BlockSignature]) {
        for signature in signatures {
            self.items.remove(&signature.key());
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &HashMap<String, BlockSignature> {
        &self.items
    }

    /// Pooled signatures in no particular order.
    pub fn slice(&self) -> Vec<BlockSignature> {
        self.items.values().cloned().collect()
    }
}
