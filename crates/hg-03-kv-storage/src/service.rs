//! # Consensus Store
//!
//! Typed persistence for the consensus records on top of any
//! `KeyValueStore`:
//!
//! | Record | Key | Value |
//! |--------|-----|-------|
//! | Event | `e:{hex}` | `Event::marshal` |
//! | Participant index | `p:{identity}:{index}` | event hex |
//! | Topological order | `o:{topological index}` | event hex |
//! | Block | `b:{index}` | `Block::marshal` |
//! | Frame | `f:{round}` | `Frame::marshal` |
//! | Peer set | `s:{round}` | JSON peer list |
//!
//! The store assigns topological indices: the n-th distinct event written
//! gets index n.

use crate::adapters::open_store;
use crate::domain::{
    decode_index, KVResult, KVStoreError, KeyPrefix, StoreConfig, IDEAL_BATCH_SIZE,
};
use crate::ports::{KeyValueStore, WriteBatch};
use hg_02_consensus_caches::{CacheConfig, CacheError, ConsensusCaches};
use hg_01_consensus_types::{Block, Event, Frame};
use shared_types::{BlockIndex, EventIndex, PeerSet, Round};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};

/// Past every encoded index under a prefix; a reverse seek lands on the last.
const SEEK_END: [u8; 9] = [0xff; 9];

pub struct ConsensusStore {
    db: Box<dyn KeyValueStore>,
    next_topological_index: i64,
}

impl ConsensusStore {
    /// Open the backend `config` selects.
    pub fn open(config: &StoreConfig) -> KVResult<Self> {
        let store = Self::new(open_store(config)?)?;
        info!(
            path = ?store.db_path(),
            next_topological_index = store.next_topological_index,
            "consensus store opened"
        );
        Ok(store)
    }

    /// Wrap an already opened backend, resuming its topological numbering.
    pub fn new(db: Box<dyn KeyValueStore>) -> KVResult<Self> {
        let next_topological_index = match last_indexed(db.as_ref(), KeyPrefix::Topological.as_bytes())? {
            Some(last) => last + 1,
            None => 0,
        };
        Ok(Self {
            db,
            next_topological_index,
        })
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db.db_path()
    }

    pub fn close(&self) -> KVResult<()> {
        self.db.close()?;
        info!(path = ?self.db_path(), "consensus store closed");
        Ok(())
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Persist `event` with its participant and topological index entries.
    ///
    /// A new event is assigned the next topological index; rewriting a
    /// stored event keeps the one it already has.
    pub fn put_event(&mut self, event: &mut Event) -> KVResult<()> {
        let mut batch = self.db.new_batch();
        let assigned = stage_event(
            batch.as_mut(),
            self.db.as_ref(),
            &mut HashMap::new(),
            event,
            self.next_topological_index,
        )?;
        batch.commit()?;
        if assigned {
            self.next_topological_index += 1;
        }
        Ok(())
    }

    /// Persist `events` in order, flushing every `IDEAL_BATCH_SIZE` events.
    /// An event listed twice is numbered once.
    pub fn put_events(&mut self, events: &mut [Event]) -> KVResult<()> {
        for chunk in events.chunks_mut(IDEAL_BATCH_SIZE) {
            let mut batch = self.db.new_batch();
            let mut staged = HashMap::new();
            let mut next = self.next_topological_index;
            for event in chunk.iter_mut() {
                if stage_event(batch.as_mut(), self.db.as_ref(), &mut staged, event, next)? {
                    next += 1;
                }
            }
            batch.commit()?;
            self.next_topological_index = next;
        }
        debug!(events = events.len(), "events persisted");
        Ok(())
    }

    pub fn get_event(&self, hex: &str) -> KVResult<Event> {
        let data = self.db.get(&KeyPrefix::event_key(hex))?;
        Ok(Event::unmarshal(&data)?)
    }

    pub fn has_event(&self, hex: &str) -> KVResult<bool> {
        self.db.has(&KeyPrefix::event_key(hex))
    }

    /// Hash of the event `participant` created at `index`.
    pub fn participant_event(&self, participant: &str, index: EventIndex) -> KVResult<String> {
        let data = self
            .db
            .get(&KeyPrefix::participant_event_key(participant, index))?;
        utf8(data)
    }

    /// Hashes of the events of `participant` with index greater than `skip`.
    pub fn participant_events(&self, participant: &str, skip: EventIndex) -> KVResult<Vec<String>> {
        Ok(self
            .scan_participant(participant, skip)?
            .into_iter()
            .map(|(_, hex)| hex)
            .collect())
    }

    /// Latest event of `participant`, if any.
    pub fn last_event_from(&self, participant: &str) -> KVResult<Option<(EventIndex, String)>> {
        let prefix = KeyPrefix::participant_prefix(participant);
        let mut seek = prefix.clone();
        seek.extend_from_slice(&SEEK_END);

        let mut it = self.db.new_iterator(true)?;
        it.seek(&seek);
        match (it.key(), it.value()) {
            (Some(key), Some(value)) if key.starts_with(&prefix) => {
                let index = decode_index(&key[prefix.len()..]).ok_or_else(|| corrupt_key(key))?;
                Ok(Some((index, utf8(value.to_vec())?)))
            }
            _ => Ok(None),
        }
    }

    /// Up to `limit` events in topological order, starting at index `start`.
    pub fn topological_events(&self, start: i64, limit: usize) -> KVResult<Vec<Event>> {
        let prefix = KeyPrefix::Topological.as_bytes();
        let mut it = self.db.new_iterator(false)?;
        it.seek(&KeyPrefix::Topological.indexed_key(start));

        let mut hashes = Vec::new();
        while hashes.len() < limit && it.valid_for_prefix(prefix) {
            if let Some(value) = it.value() {
                hashes.push(utf8(value.to_vec())?);
            }
            it.next();
        }
        drop(it);

        hashes.iter().map(|hex| self.get_event(hex)).collect()
    }

    fn scan_participant(
        &self,
        participant: &str,
        skip: EventIndex,
    ) -> KVResult<Vec<(EventIndex, String)>> {
        let prefix = KeyPrefix::participant_prefix(participant);
        let mut it = self.db.new_iterator(false)?;
        it.seek(&KeyPrefix::participant_event_key(
            participant,
            skip.saturating_add(1),
        ));

        let mut entries = Vec::new();
        while it.valid_for_prefix(&prefix) {
            if let (Some(key), Some(value)) = (it.key(), it.value()) {
                let index = decode_index(&key[prefix.len()..]).ok_or_else(|| corrupt_key(key))?;
                entries.push((index, utf8(value.to_vec())?));
            }
            it.next();
        }
        Ok(entries)
    }

    // =========================================================================
    // Blocks and frames
    // =========================================================================

    pub fn put_block(&self, block: &Block) -> KVResult<()> {
        self.db.put(
            &KeyPrefix::Block.indexed_key(block.index()),
            &block.marshal()?,
        )?;
        debug!(index = block.index(), "block persisted");
        Ok(())
    }

    pub fn get_block(&self, index: BlockIndex) -> KVResult<Block> {
        let data = self.db.get(&KeyPrefix::Block.indexed_key(index))?;
        Ok(Block::unmarshal(&data)?)
    }

    pub fn last_block_index(&self) -> KVResult<Option<BlockIndex>> {
        last_indexed(self.db.as_ref(), KeyPrefix::Block.as_bytes())
    }

    pub fn put_frame(&self, frame: &Frame) -> KVResult<()> {
        self.db.put(
            &KeyPrefix::Frame.indexed_key(frame.round),
            &frame.marshal()?,
        )
    }

    pub fn get_frame(&self, round: Round) -> KVResult<Frame> {
        let data = self.db.get(&KeyPrefix::Frame.indexed_key(round))?;
        Ok(Frame::unmarshal(&data)?)
    }

    // =========================================================================
    // Peer sets
    // =========================================================================

    pub fn put_peer_set(&self, round: Round, peer_set: &PeerSet) -> KVResult<()> {
        self.db.put(
            &KeyPrefix::PeerSet.indexed_key(round),
            &serde_json::to_vec(peer_set)?,
        )?;
        debug!(round, peers = peer_set.len(), "peer set persisted");
        Ok(())
    }

    pub fn get_peer_set(&self, round: Round) -> KVResult<PeerSet> {
        let data = self.db.get(&KeyPrefix::PeerSet.indexed_key(round))?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Every stored roster, keyed by the round it took effect.
    pub fn peer_sets(&self) -> KVResult<BTreeMap<Round, PeerSet>> {
        let prefix = KeyPrefix::PeerSet.as_bytes();
        let mut it = self.db.new_iterator(false)?;
        it.seek(prefix);

        let mut peer_sets = BTreeMap::new();
        while it.valid_for_prefix(prefix) {
            if let (Some(key), Some(value)) = (it.key(), it.value()) {
                let round = decode_index(&key[prefix.len()..]).ok_or_else(|| corrupt_key(key))?;
                peer_sets.insert(round, serde_json::from_slice(value)?);
            }
            it.next();
        }
        Ok(peer_sets)
    }

    // =========================================================================
    // Bootstrap
    // =========================================================================

    /// Rebuild the in-memory caches from the stored rosters and
    /// participant-event index.
    pub fn restore_caches(&self, config: &CacheConfig) -> KVResult<ConsensusCaches> {
        let mut caches = ConsensusCaches::new(config)?;
        for (round, peer_set) in self.peer_sets()? {
            caches.set_peer_set(round, peer_set)?;
        }

        let participants = caches.participant_events.participants().clone();
        let mut restored = 0usize;
        for peer in participants.peers() {
            for (index, hex) in self.scan_participant(&peer.pub_key_hex, EventIndex::MIN)? {
                caches
                    .participant_events
                    .set(&peer.pub_key_hex, hex, index)
                    .map_err(CacheError::from)?;
                restored += 1;
            }
        }

        info!(
            rounds = caches.peer_sets.get_all().len(),
            participants = participants.len(),
            events = restored,
            "caches restored from store"
        );
        Ok(caches)
    }
}

/// Queue the writes for `event`. Returns whether `next` was assigned to it.
///
/// An event already stored, or already queued in `staged`, keeps the
/// topological index it was given and its `o:` entry is left alone.
fn stage_event(
    batch: &mut (dyn WriteBatch + '_),
    db: &dyn KeyValueStore,
    staged: &mut HashMap<String, i64>,
    event: &mut Event,
    next: i64,
) -> KVResult<bool> {
    let hex = event.hex()?.to_string();
    let key = KeyPrefix::event_key(&hex);

    let known = match staged.get(&hex) {
        Some(index) => Some(*index),
        None => stored_topological_index(db, &key)?,
    };
    event.topological_index = known.unwrap_or(next);

    batch.set(&key, &event.marshal()?)?;
    batch.set(
        &KeyPrefix::participant_event_key(event.creator(), event.index()),
        hex.as_bytes(),
    )?;
    if known.is_some() {
        return Ok(false);
    }

    batch.set(
        &KeyPrefix::Topological.indexed_key(next),
        hex.as_bytes(),
    )?;
    staged.insert(hex, next);
    Ok(true)
}

fn stored_topological_index(db: &dyn KeyValueStore, key: &[u8]) -> KVResult<Option<i64>> {
    match db.get(key) {
        Ok(data) => Ok(Some(Event::unmarshal(&data)?.topological_index)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Highest index stored under `prefix`.
fn last_indexed(db: &dyn KeyValueStore, prefix: &[u8]) -> KVResult<Option<i64>> {
    let mut seek = prefix.to_vec();
    seek.extend_from_slice(&SEEK_END);

    let mut it = db.new_iterator(true)?;
    it.seek(&seek);
    match it.key() {
        Some(key) if key.starts_with(prefix) => decode_index(&key[prefix.len()..])
            .map(Some)
            .ok_or_else(|| corrupt_key(key)),
        _ => Ok(None),
    }
}

fn utf8(data: Vec<u8>) -> KVResult<String> {
    String::from_utf8(data).map_err(|e| KVStoreError::Serialization {
        message: e.to_string(),
    })
}

fn corrupt_key(key: &[u8]) -> KVStoreError {
    KVStoreError::Serialization {
        message: format!("malformed index in key {key:02x?}"),
    }
}
