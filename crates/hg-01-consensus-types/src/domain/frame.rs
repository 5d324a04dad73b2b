//! Frames
//!
//! A frame is the finalized slice of the DAG for one round-received: the
//! roster in effect plus the events, each annotated with the round,
//! Lamport timestamp and witness flag the ordering algorithm assigned.

use super::errors::ModelResult;
use super::event::Event;
use super::ordering::sort_frame_events;
use serde::{Deserialize, Serialize};
use shared_crypto::keccak256;
use shared_types::{Hash, Peer, Round};

/// An event as it appears in a finalized frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FrameEvent {
    pub core: Event,
    pub round: Round,
    pub lamport_timestamp: i64,
    pub witness: bool,
}

impl FrameEvent {
    pub fn new(core: Event, round: Round, lamport_timestamp: i64, witness: bool) -> Self {
        Self {
            core,
            round,
            lamport_timestamp,
            witness,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Frame {
    pub round: Round,
    pub peers: Vec<Peer>,
    /// Events in consensus order.
    pub events: Vec<FrameEvent>,
    /// Median timestamp of the round, in seconds.
    #[serde(default)]
    pub timestamp: i64,
}

impl Frame {
    /// Build a frame; events are put in consensus order.
    pub fn new(round: Round, peers: Vec<Peer>, mut events: Vec<FrameEvent>, timestamp: i64) -> Self {
        sort_frame_events(&mut events);
        Self {
            round,
            peers,
            events,
            timestamp,
        }
    }

    pub fn marshal(&self) -> ModelResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn unmarshal(data: &[u8]) -> ModelResult<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Keccak-256 of the persisted encoding.
    pub fn hash(&self) -> ModelResult<Hash> {
        Ok(keccak256(&self.marshal()?))
    }
}
