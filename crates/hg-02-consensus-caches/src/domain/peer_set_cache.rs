//! # Peer-Set History Cache
//!
//! Roster snapshots keyed by the round at which the roster changed. A round
//! between two changes resolves to the earlier snapshot; a round before the
//! first change resolves to the first snapshot.
//!
//! The repertoires are cumulative: a peer removed in a later round stays
//! resolvable so that its historical events can still be verified.

use shared_types::{Peer, PeerId, PeerSet, Round, StoreError, StoreErrorKind};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

const CACHE_NAME: &str = "PeerSetCache";

#[derive(Debug, Clone, Default)]
pub struct PeerSetCache {
    peer_sets: BTreeMap<Round, PeerSet>,
    repertoire_by_pub_key: HashMap<String, Peer>,
    repertoire_by_id: HashMap<PeerId, Peer>,
    first_rounds: HashMap<PeerId, Round>,
}

impl PeerSetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the roster in effect from `round`. Snapshots are immutable.
    pub fn set(&mut self, round: Round, peer_set: PeerSet) -> Result<(), StoreError> {
        if self.peer_sets.contains_key(&round) {
            return Err(StoreError::new(
                CACHE_NAME,
                StoreErrorKind::KeyAlreadyExists,
                round.to_string(),
            ));
        }

        for peer in peer_set.peers() {
            let id = peer.id();
            self.repertoire_by_pub_key
                .insert(peer.pub_key_string(), peer.clone());
            self.repertoire_by_id.insert(id, peer.clone());
            self.first_rounds
                .entry(id)
                .and_modify(|first| *first = (*first).min(round))
                .or_insert(round);
        }

        debug!(round, peers = peer_set.len(), "peer set registered");
        self.peer_sets.insert(round, peer_set);
        Ok(())
    }

    /// Roster in effect at `round`.
    pub fn get(&self, round: Round) -> Result<&PeerSet, StoreError> {
        self.peer_sets
            .range(..=round)
            .next_back()
            .or_else(|| self.peer_sets.iter().next())
            .map(|(_, peer_set)| peer_set)
            .ok_or_else(|| {
                StoreError::new(CACHE_NAME, StoreErrorKind::KeyNotFound, round.to_string())
            })
    }

    /// Every snapshot, keyed by the round it took effect.
    pub fn get_all(&self) -> &BTreeMap<Round, PeerSet> {
        &self.peer_sets
    }

    pub fn repertoire_by_id(&self) -> &HashMap<PeerId, Peer> {
        &self.repertoire_by_id
    }

    /// Keyed by uppercase public key identity.
    pub fn repertoire_by_pub_key(&self) -> &HashMap<String, Peer> {
        &self.repertoire_by_pub_key
    }

    /// Earliest round at which the peer appears in any snapshot.
    pub fn first_round(&self, id: PeerId) -> Option<Round> {
        self.first_rounds.get(&id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.peer_sets.is_empty()
    }
}
