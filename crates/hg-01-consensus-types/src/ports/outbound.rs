//! Driven ports (Outbound dependencies)

use crate::domain::{Block, CommitResponse, ModelResult};
use shared_types::{EventIndex, Peer, PeerId, StoreError};

/// The application state machine.
///
/// Receives every finalized block, executes its transactions and decides
/// on its internal transactions.
pub trait CommitHandler {
    /// Execute `block` and return the resulting state hash and receipts.
    fn commit(&mut self, block: &Block) -> ModelResult<CommitResponse>;
}

/// Lookups needed to rebuild a full event from its wire form.
pub trait WireResolver {
    /// Any peer ever seen in the roster history, by numeric ID.
    fn peer_by_id(&self, id: PeerId) -> Option<Peer>;

    /// Hash of `participant`'s event at `index`.
    ///
    /// `participant` is the peer's public key identity.
    fn participant_event(&self, participant: &str, index: EventIndex) -> Result<String, StoreError>;
}
