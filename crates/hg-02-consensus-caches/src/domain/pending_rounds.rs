//! # Pending-Rounds Cache
//!
//! Rounds queued for a consensus decision. Keyed by round index, so
//! re-queuing a round replaces its entry and the ordered view never holds
//! duplicates.

use serde::{Deserialize, Serialize};
use shared_types::Round;
use std::collections::BTreeMap;

/// A round awaiting (or past) its fame decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PendingRound {
    pub index: Round,
    pub decided: bool,
}

impl PendingRound {
    pub fn new(index: Round) -> Self {
        Self {
            index,
            decided: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PendingRoundsCache {
    items: BTreeMap<Round, PendingRound>,
}

impl PendingRoundsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queued(&self, round: Round) -> bool {
        self.items.contains_key(&round)
    }

    /// Insert or replace the entry for `pending.index`.
    pub fn set(&mut self, pending: PendingRound) {
        self.items.insert(pending.index, pending);
    }

    /// Pending rounds, lowest index first.
    pub fn get_ordered_pending_rounds(&self) -> Vec<PendingRound> {
        self.items.values().copied().collect()
    }

    /// Mark the listed rounds decided. Rounds not queued are ignored.
    pub fn update(&mut self, decided_rounds: &[Round]) {
        for round in decided_rounds {
            if let Some(pending) = self.items.get_mut(round) {
                pending.decided = true;
            }
        }
    }

    /// Remove the listed rounds.
    pub fn clean(&mut self, processed_rounds: &[Round]) {
        for round in processed_rounds {
            self.items.remove(round);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(cache: &PendingRoundsCache) -> Vec<Round> {
        cache
            .get_ordered_pending_rounds()
            .iter()
            .map(|p| p.index)
            .collect()
    }

    #[test]
    fn test_ordered_view() {
        let mut cache = PendingRoundsCache::new();
        cache.set(PendingRound::new(3));
        cache.set(PendingRound::new(1));
        cache.set(PendingRound::new(2));

        assert_eq!(indices(&cache), vec![1, 2, 3]);
        assert!(cache.queued(2));
        assert!(!cache.queued(4));
    }

    #[test]
    fn test_update_only_touches_listed_rounds() {
        let mut cache = PendingRoundsCache::new();
        for i in 1..=3 {
            cache.set(PendingRound::new(i));
        }

        cache.update(&[2, 9]);

        let decided: Vec<bool> = cache
            .get_ordered_pending_rounds()
            .iter()
            .map(|p| p.decided)
            .collect();
        assert_eq!(decided, vec![false, true, false]);
        assert!(!cache.queued(9));
    }

    #[test]
    fn test_clean_keeps_order() {
        let mut cache = PendingRoundsCache::new();
        for i in 1..=3 {
            cache.set(PendingRound::new(i));
        }

        cache.clean(&[2]);

        assert_eq!(indices(&cache), vec![1, 3]);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_set_twice_is_upsert() {
        let mut cache = PendingRoundsCache::new();
        cache.set(PendingRound::new(4));
        cache.set(PendingRound {
            index: 4,
            decided: true,
        });

        let rounds = cache.get_ordered_pending_rounds();
        assert_eq!(rounds.len(), 1);
        assert!(rounds[0].decided);
    }
}
