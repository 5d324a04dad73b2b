//! # Consensus Caches
//!
//! The set of caches owned by one consensus store, plus the flows that
//! touch more than one of them: roster changes, event indexing, wire event
//! reconstruction and block commit.

use crate::domain::{
    CacheConfig, CacheResult, ParticipantEventsCache, PeerSetCache, PendingRoundsCache, SigPool,
};
use hg_01_consensus_types::{
    Block, BlockSignature, CommitHandler, Event, WireEvent, WireResolver,
};
use shared_types::{EventIndex, Peer, PeerId, PeerSet, Round, StoreError};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ConsensusCaches {
    pub participant_events: ParticipantEventsCache,
    pub peer_sets: PeerSetCache,
    pub pending_rounds: PendingRoundsCache,
    pub sig_pool: SigPool,
}

impl ConsensusCaches {
    pub fn new(config: &CacheConfig) -> CacheResult<Self> {
        config.validate()?;
        Ok(Self {
            participant_events: ParticipantEventsCache::new(config.participant_events_size),
            peer_sets: PeerSetCache::new(),
            pending_rounds: PendingRoundsCache::new(),
            sig_pool: SigPool::new(),
        })
    }

    /// Register the roster in effect from `round` and start tracking the
    /// events of any peer seen for the first time.
    pub fn set_peer_set(&mut self, round: Round, peer_set: PeerSet) -> CacheResult<()> {
        let new_peers: Vec<Peer> = peer_set
            .peers()
            .iter()
            .filter(|p| !self.participant_events.participants().contains(&p.pub_key_hex))
            .cloned()
            .collect();

        self.peer_sets.set(round, peer_set)?;
        for peer in new_peers {
            self.participant_events.add_peer(peer)?;
        }
        Ok(())
    }

    /// Index `event` under its creator.
    pub fn add_event(&mut self, event: &Event) -> CacheResult<()> {
        let hex = event.hex()?;
        self.participant_events
            .set(event.creator(), hex, event.index())?;
        debug!(creator = %event.creator(), index = event.index(), "event indexed");
        Ok(())
    }

    /// Rebuild a full event from the wire using the cached history.
    pub fn read_wire_event(&self, wire: &WireEvent) -> CacheResult<Event> {
        Ok(Event::from_wire(wire, self)?)
    }

    /// Hand `block` to the application and record its answer in the body.
    ///
    /// Must run before validators sign: the state hash is part of the
    /// signed body.
    pub fn commit_block<H: CommitHandler + ?Sized>(
        &self,
        block: &mut Block,
        handler: &mut H,
    ) -> CacheResult<()> {
        let response = handler.commit(block)?;
        block.apply_commit_response(&response);

        info!(
            index = block.index(),
            round_received = block.round_received(),
            receipts = block.internal_transaction_receipts().len(),
            "block committed"
        );
        Ok(())
    }

    /// Move pooled signatures for `block` onto it.
    ///
    /// Signatures that do not verify, or cannot be decoded, are dropped from
    /// the pool. Returns the number of signatures attached.
    pub fn apply_pooled_signatures(&mut self, block: &mut Block) -> CacheResult<usize> {
        let candidates: Vec<BlockSignature> = self
            .sig_pool
            .slice()
            .into_iter()
            .filter(|sig| sig.index == block.index())
            .collect();

        let mut attached = 0;
        for sig in &candidates {
            match block.verify(sig) {
                Ok(true) => {
                    block.set_signature(sig);
                    attached += 1;
                }
                Ok(false) => warn!(
                    index = sig.index,
                    validator = %sig.validator_compressed_hex(),
                    "discarding invalid block signature"
                ),
                Err(e) => warn!(
                    index = sig.index,
                    validator = %sig.validator_hex(),
                    error = %e,
                    "discarding malformed block signature"
                ),
            }
        }

        self.sig_pool.remove_slice(&candidates);
        Ok(attached)
    }
}

impl WireResolver for ConsensusCaches {
    fn peer_by_id(&self, id: PeerId) -> Option<Peer> {
        self.peer_sets.repertoire_by_id().get(&id).cloned()
    }

    fn participant_event(&self, participant: &str, index: EventIndex) -> Result<String, StoreError> {
        self.participant_events.get_item(participant, index)
    }
}
