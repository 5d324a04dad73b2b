//! # Participant Events Cache
//!
//! Per-participant rolling log of event hashes, indexed by the creator-local
//! event index. Participants are addressed by their public key identity
//! (case-insensitive) and stored under their numeric peer ID.

use super::rolling_index::RollingIndexMap;
use shared_types::{EventIndex, Peer, PeerId, PeerSet, StoreError, StoreErrorKind};
use std::collections::BTreeMap;
use tracing::debug;

const CACHE_NAME: &str = "ParticipantEvents";

#[derive(Debug, Clone)]
pub struct ParticipantEventsCache {
    participants: PeerSet,
    rim: RollingIndexMap<PeerId, String>,
}

impl ParticipantEventsCache {
    /// Create an empty cache keeping at least `size` events per participant.
    pub fn new(size: usize) -> Self {
        Self {
            participants: PeerSet::default(),
            rim: RollingIndexMap::new(CACHE_NAME, size),
        }
    }

    /// Current roster.
    pub fn participants(&self) -> &PeerSet {
        &self.participants
    }

    /// Register `peer`. Fails with `KeyAlreadyExists` if its ID is known.
    pub fn add_peer(&mut self, peer: Peer) -> Result<(), StoreError> {
        let id = peer.id();
        self.rim.add_key(id)?;
        debug!(peer_id = id, moniker = %peer.moniker, "participant registered");
        self.participants = self.participants.with_new_peer(peer);
        Ok(())
    }

    fn participant_id(&self, participant: &str) -> Result<PeerId, StoreError> {
        self.participants
            .by_pub_key(participant)
            .map(Peer::id)
            .ok_or_else(|| {
                StoreError::new(CACHE_NAME, StoreErrorKind::UnknownParticipant, participant)
            })
    }

    /// Event hashes of `participant` with index greater than `skip_index`.
    pub fn get(&self, participant: &str, skip_index: EventIndex) -> Result<Vec<String>, StoreError> {
        let id = self.participant_id(participant)?;
        Ok(self.rim.get(id, skip_index)?.to_vec())
    }

    pub fn get_item(&self, participant: &str, index: EventIndex) -> Result<String, StoreError> {
        let id = self.participant_id(participant)?;
        self.rim.get_item(id, index).cloned()
    }

    pub fn get_last(&self, participant: &str) -> Result<String, StoreError> {
        let id = self.participant_id(participant)?;
        self.rim.get_last(id).cloned()
    }

    /// Record `hash` as the participant's event at `index`.
    pub fn set(&mut self, participant: &str, hash: impl Into<String>, index: EventIndex) -> Result<(), StoreError> {
        let id = self.participant_id(participant)?;
        self.rim.set(id, hash.into(), index)
    }

    /// Peer ID => last recorded index (-1 when none), for anti-entropy.
    pub fn known(&self) -> BTreeMap<PeerId, EventIndex> {
        self.rim.known()
    }
}
