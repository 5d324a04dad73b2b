//! Events
//!
//! An event is a vertex of the gossip DAG: a signed body carrying
//! transactions, internal transactions, the creator's block signatures and
//! up to two parent hashes.
//!
//! ## Canonical encoding
//!
//! The identity hash and the signature both cover the same byte string: the
//! JSON encoding of [`CanonicalEventBody`], which omits the four wire fields
//! (`CreatorID`, `OtherParentCreatorID`, `SelfParentIndex`,
//! `OtherParentIndex`). Those are filled in locally before transmission and
//! differ between nodes, so they never reach signed bytes. The persisted
//! encoding of [`EventBody`] does carry them.
//!
//! ## Memoization
//!
//! `hash`, `hex` and `creator` are computed once and cached. Every method
//! that can change the canonical bytes takes `&mut self` and drops the
//! cache. `Event` is `Send` but not `Sync`; it is owned by a single store.

use super::block_signature::BlockSignature;
use super::errors::{ModelError, ModelResult};
use super::internal_transaction::InternalTransaction;
use super::wire::{WireBody, WireEvent};
use crate::ports::WireResolver;
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};
use shared_crypto::{
    encode_hex, encode_hex_upper, keccak256, public_key_identity, verify_signature,
    Secp256k1KeyPair,
};
use shared_types::{EventIndex, Hash, PeerId, Round};
use std::cell::OnceCell;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Index value meaning "no such parent".
pub const NO_INDEX: EventIndex = -1;

fn no_index() -> EventIndex {
    NO_INDEX
}

// =============================================================================
// EVENT BODY
// =============================================================================

/// The signed content of an event, plus the transient wire fields.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventBody {
    #[serde_as(as = "Vec<Base64>")]
    #[serde(default)]
    pub transactions: Vec<Vec<u8>>,
    #[serde(default)]
    pub internal_transactions: Vec<InternalTransaction>,
    /// Self-parent first, other-parent second; empty for a genesis event.
    #[serde(default)]
    pub parents: Vec<String>,
    /// SEC1 public key of the creator.
    #[serde_as(as = "Base64")]
    pub creator: Vec<u8>,
    /// Position in the creator's own sequence, starting at 0.
    pub index: EventIndex,
    /// Block signatures authored by the creator only.
    #[serde(default)]
    pub block_signatures: Vec<BlockSignature>,

    // Wire fields, excluded from the canonical encoding.
    #[serde(rename = "CreatorID", default)]
    pub creator_id: PeerId,
    #[serde(rename = "OtherParentCreatorID", default)]
    pub other_parent_creator_id: PeerId,
    #[serde(default = "no_index")]
    pub self_parent_index: EventIndex,
    #[serde(default = "no_index")]
    pub other_parent_index: EventIndex,
}

/// Borrowed view of the fields that are hashed and signed.
#[serde_as]
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CanonicalEventBody<'a> {
    #[serde_as(as = "&Vec<Base64>")]
    transactions: &'a Vec<Vec<u8>>,
    internal_transactions: &'a [InternalTransaction],
    parents: &'a [String],
    #[serde_as(as = "Base64")]
    creator: &'a [u8],
    index: EventIndex,
    block_signatures: &'a [BlockSignature],
}

impl EventBody {
    fn canonical(&self) -> CanonicalEventBody<'_> {
        CanonicalEventBody {
            transactions: &self.transactions,
            internal_transactions: &self.internal_transactions,
            parents: &self.parents,
            creator: &self.creator,
            index: self.index,
            block_signatures: &self.block_signatures,
        }
    }

    /// Bytes covered by the identity hash and the creator's signature.
    pub fn canonical_bytes(&self) -> ModelResult<Vec<u8>> {
        Ok(serde_json::to_vec(&self.canonical())?)
    }

    /// Keccak-256 of the canonical bytes.
    pub fn hash(&self) -> ModelResult<Hash> {
        Ok(keccak256(&self.canonical_bytes()?))
    }

    /// Persisted encoding, wire fields included.
    pub fn marshal(&self) -> ModelResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn unmarshal(data: &[u8]) -> ModelResult<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}

// =============================================================================
// COORDINATES
// =============================================================================

/// Hash and creator-local index of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventCoordinates {
    pub hash: String,
    pub index: EventIndex,
}

/// Participant identity to coordinates.
pub type CoordinatesMap = BTreeMap<String, EventCoordinates>;

// =============================================================================
// EVENT
// =============================================================================

/// A signed event plus the bookkeeping the ordering algorithm attaches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Event {
    body: EventBody,
    /// Creator's signature over the canonical body hash.
    #[serde(default)]
    signature: String,

    /// Insertion position in the local DAG store.
    #[serde(default)]
    pub topological_index: i64,

    #[serde(skip)]
    round: Option<Round>,
    #[serde(default)]
    lamport_timestamp: Option<i64>,
    #[serde(default)]
    round_received: Option<Round>,

    /// Participant identity => last ancestor from that participant.
    #[serde(default)]
    pub last_ancestors: CoordinatesMap,
    /// Participant identity => first descendant from that participant.
    #[serde(default)]
    pub first_descendants: CoordinatesMap,

    #[serde(skip)]
    creator: OnceCell<String>,
    #[serde(skip)]
    hash: OnceCell<Hash>,
    #[serde(skip)]
    hex: OnceCell<String>,
}

impl Event {
    /// Build an unsigned event. Wire fields start out unset.
    pub fn new(
        transactions: Vec<Vec<u8>>,
        internal_transactions: Vec<InternalTransaction>,
        block_signatures: Vec<BlockSignature>,
        parents: Vec<String>,
        creator: Vec<u8>,
        index: EventIndex,
    ) -> Self {
        Self::from_body(
            EventBody {
                transactions,
                internal_transactions,
                parents,
                creator,
                index,
                block_signatures,
                creator_id: 0,
                other_parent_creator_id: 0,
                self_parent_index: NO_INDEX,
                other_parent_index: NO_INDEX,
            },
            String::new(),
        )
    }

    fn from_body(body: EventBody, signature: String) -> Self {
        Self {
            body,
            signature,
            topological_index: 0,
            round: None,
            lamport_timestamp: None,
            round_received: None,
            last_ancestors: CoordinatesMap::new(),
            first_descendants: CoordinatesMap::new(),
            creator: OnceCell::new(),
            hash: OnceCell::new(),
            hex: OnceCell::new(),
        }
    }

    pub fn body(&self) -> &EventBody {
        &self.body
    }

    /// Mutable access to the body. Drops every memoized value.
    pub fn body_mut(&mut self) -> &mut EventBody {
        self.clear();
        &mut self.body
    }

    fn clear(&mut self) {
        self.creator.take();
        self.hash.take();
        self.hex.take();
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn transactions(&self) -> &[Vec<u8>] {
        &self.body.transactions
    }

    pub fn internal_transactions(&self) -> &[InternalTransaction] {
        &self.body.internal_transactions
    }

    pub fn block_signatures(&self) -> &[BlockSignature] {
        &self.body.block_signatures
    }

    pub fn index(&self) -> EventIndex {
        self.body.index
    }

    /// Creator identity: `0X` + uppercase hex of the compressed creator key.
    ///
    /// Creator bytes that are not a valid key yield their raw uppercase hex.
    pub fn creator(&self) -> &str {
        self.creator.get_or_init(|| {
            public_key_identity(&self.body.creator)
                .unwrap_or_else(|_| encode_hex_upper(&self.body.creator))
        })
    }

    pub fn self_parent(&self) -> ModelResult<&str> {
        self.parent(0)
    }

    pub fn other_parent(&self) -> ModelResult<&str> {
        self.parent(1)
    }

    fn parent(&self, position: usize) -> ModelResult<&str> {
        match self.body.parents.get(position) {
            Some(parent) => Ok(parent),
            None => Err(ModelError::MissingParent {
                hash: self.hex().map(str::to_owned).unwrap_or_default(),
            }),
        }
    }

    /// True if the event carries a payload or is its creator's first event.
    pub fn is_loaded(&self) -> bool {
        self.body.index == 0
            || !self.body.transactions.is_empty()
            || !self.body.internal_transactions.is_empty()
    }

    // -------------------------------------------------------------------------
    // Hashing and signatures
    // -------------------------------------------------------------------------

    pub fn hash(&self) -> ModelResult<Hash> {
        if let Some(hash) = self.hash.get() {
            return Ok(*hash);
        }
        let hash = self.body.hash()?;
        Ok(*self.hash.get_or_init(|| hash))
    }

    /// `0x` + lowercase hex of the hash.
    pub fn hex(&self) -> ModelResult<&str> {
        if let Some(hex) = self.hex.get() {
            return Ok(hex);
        }
        let hex = encode_hex(&self.hash()?);
        Ok(self.hex.get_or_init(|| hex))
    }

    /// Sign the canonical body hash with the creator's key.
    pub fn sign(&mut self, keypair: &Secp256k1KeyPair) -> ModelResult<()> {
        let digest = self
            .body
            .hash()
            .map_err(|e| ModelError::Signing(e.to_string()))?;
        self.signature = keypair.sign_prehash(&digest)?.to_hex();
        Ok(())
    }

    /// Verify carried internal transactions, then the creator's signature.
    ///
    /// An internal transaction with a bad signature fails with
    /// `InvalidInternalTransactionSignature` at the first offender.
    pub fn verify(&self) -> ModelResult<bool> {
        for (position, itx) in self.body.internal_transactions.iter().enumerate() {
            if !itx.verify()? {
                warn!(position, creator = %self.creator(), "invalid internal transaction signature");
                return Err(ModelError::InvalidInternalTransactionSignature { position });
            }
        }

        let digest = self.hash()?;
        let valid = verify_signature(&self.body.creator, &digest, &self.signature)?;
        if !valid {
            debug!(creator = %self.creator(), index = self.body.index, "event signature mismatch");
        }
        Ok(valid)
    }

    // -------------------------------------------------------------------------
    // Ordering metadata
    // -------------------------------------------------------------------------

    pub fn round(&self) -> Option<Round> {
        self.round
    }

    pub fn set_round(&mut self, round: Round) {
        self.round = Some(round);
    }

    pub fn lamport_timestamp(&self) -> Option<i64> {
        self.lamport_timestamp
    }

    pub fn set_lamport_timestamp(&mut self, timestamp: i64) {
        self.lamport_timestamp = Some(timestamp);
    }

    pub fn round_received(&self) -> Option<Round> {
        self.round_received
    }

    pub fn set_round_received(&mut self, round: Round) {
        self.round_received = Some(round);
    }

    // -------------------------------------------------------------------------
    // Wire encoding
    // -------------------------------------------------------------------------

    /// Record the compact parent references used on the wire.
    ///
    /// These fields are not part of the canonical encoding, so the memoized
    /// hash survives.
    pub fn set_wire_info(
        &mut self,
        self_parent_index: EventIndex,
        other_parent_creator_id: PeerId,
        other_parent_index: EventIndex,
        creator_id: PeerId,
    ) {
        self.body.self_parent_index = self_parent_index;
        self.body.other_parent_creator_id = other_parent_creator_id;
        self.body.other_parent_index = other_parent_index;
        self.body.creator_id = creator_id;
    }

    pub fn to_wire(&self) -> WireEvent {
        WireEvent {
            body: WireBody {
                transactions: self.body.transactions.clone(),
                internal_transactions: self.body.internal_transactions.clone(),
                block_signatures: self
                    .body
                    .block_signatures
                    .iter()
                    .map(BlockSignature::to_wire)
                    .collect(),
                creator_id: self.body.creator_id,
                other_parent_creator_id: self.body.other_parent_creator_id,
                index: self.body.index,
                self_parent_index: self.body.self_parent_index,
                other_parent_index: self.body.other_parent_index,
            },
            signature: self.signature.clone(),
        }
    }

    /// Rebuild a full event from its wire form.
    ///
    /// Creator keys come from the resolver's peer repertoire and parent
    /// hashes from its participant event index. A creator's first event with
    /// no parent references gets no parents; otherwise a missing parent index
    /// becomes an empty hash.
    pub fn from_wire<R: WireResolver + ?Sized>(wire: &WireEvent, resolver: &R) -> ModelResult<Self> {
        let body = &wire.body;

        let creator = resolver
            .peer_by_id(body.creator_id)
            .ok_or(ModelError::UnknownPeer(body.creator_id))?;
        let creator_bytes = creator.pub_key_bytes()?;

        let self_parent = if body.self_parent_index >= 0 {
            resolver.participant_event(&creator.pub_key_string(), body.self_parent_index)?
        } else {
            String::new()
        };

        let other_parent = if body.other_parent_index >= 0 {
            let other = resolver
                .peer_by_id(body.other_parent_creator_id)
                .ok_or(ModelError::UnknownPeer(body.other_parent_creator_id))?;
            resolver.participant_event(&other.pub_key_string(), body.other_parent_index)?
        } else {
            String::new()
        };

        let genesis =
            body.index == 0 && body.self_parent_index < 0 && body.other_parent_index < 0;
        let parents = if genesis {
            Vec::new()
        } else {
            vec![self_parent, other_parent]
        };

        let block_signatures = wire.block_signatures(&creator_bytes);

        let event_body = EventBody {
            transactions: body.transactions.clone(),
            internal_transactions: body.internal_transactions.clone(),
            parents,
            creator: creator_bytes,
            index: body.index,
            block_signatures,
            creator_id: body.creator_id,
            other_parent_creator_id: body.other_parent_creator_id,
            self_parent_index: body.self_parent_index,
            other_parent_index: body.other_parent_index,
        };

        Ok(Self::from_body(event_body, wire.signature.clone()))
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    /// Persisted encoding: body, signature, topological index, timestamps and
    /// coordinate maps. The round and memoized values are not stored.
    pub fn marshal(&self) -> ModelResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn unmarshal(data: &[u8]) -> ModelResult<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.body == other.body
            && self.signature == other.signature
            && self.topological_index == other.topological_index
            && self.round == other.round
            && self.lamport_timestamp == other.lamport_timestamp
            && self.round_received == other.round_received
            && self.last_ancestors == other.last_ancestors
            && self.first_descendants == other.first_descendants
    }
}

impl Eq for Event {}
