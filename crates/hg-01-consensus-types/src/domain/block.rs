//! Blocks
//!
//! A block packages the payload of one finalized frame. Validators sign the
//! body hash, so signatures can be collected independently of each other;
//! the block hash covers the body and the signatures gathered so far.
//!
//! The frame hash is kept in the persisted body but is not part of the
//! hashed body.

use super::block_signature::BlockSignature;
use super::commit::CommitResponse;
use super::errors::{ModelError, ModelResult};
use super::frame::Frame;
use super::internal_transaction::{InternalTransaction, InternalTransactionReceipt};
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};
use shared_crypto::{
    decode_hex, encode_hex, keccak256, normalize_identity, verify_signature, Secp256k1KeyPair,
};
use shared_types::{BlockIndex, Hash, Peer, PeerSet, Round};
use std::cell::OnceCell;
use std::collections::BTreeMap;
use tracing::debug;

// =============================================================================
// BLOCK BODY
// =============================================================================

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlockBody {
    pub index: BlockIndex,
    pub round_received: Round,
    #[serde_as(as = "Base64")]
    #[serde(default)]
    pub state_hash: Vec<u8>,
    #[serde_as(as = "Base64")]
    #[serde(default)]
    pub frame_hash: Vec<u8>,
    #[serde_as(as = "Base64")]
    #[serde(default)]
    pub peers_hash: Vec<u8>,
    #[serde_as(as = "Vec<Base64>")]
    #[serde(default)]
    pub transactions: Vec<Vec<u8>>,
    #[serde(default)]
    pub internal_transactions: Vec<InternalTransaction>,
    #[serde(default)]
    pub internal_transaction_receipts: Vec<InternalTransactionReceipt>,
}

/// Borrowed view of the hashed body fields (everything but the frame hash).
#[serde_as]
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CanonicalBlockBody<'a> {
    index: BlockIndex,
    round_received: Round,
    #[serde_as(as = "Base64")]
    state_hash: &'a [u8],
    #[serde_as(as = "Base64")]
    peers_hash: &'a [u8],
    #[serde_as(as = "&Vec<Base64>")]
    transactions: &'a Vec<Vec<u8>>,
    internal_transactions: &'a [InternalTransaction],
    internal_transaction_receipts: &'a [InternalTransactionReceipt],
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CanonicalBlock<'a> {
    body: CanonicalBlockBody<'a>,
    signatures: &'a BTreeMap<String, String>,
}

impl BlockBody {
    fn canonical(&self) -> CanonicalBlockBody<'_> {
        CanonicalBlockBody {
            index: self.index,
            round_received: self.round_received,
            state_hash: &self.state_hash,
            peers_hash: &self.peers_hash,
            transactions: &self.transactions,
            internal_transactions: &self.internal_transactions,
            internal_transaction_receipts: &self.internal_transaction_receipts,
        }
    }

    /// Keccak-256 of the canonical body; this is what validators sign.
    pub fn hash(&self) -> ModelResult<Hash> {
        Ok(keccak256(&serde_json::to_vec(&self.canonical())?))
    }

    pub fn marshal(&self) -> ModelResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn unmarshal(data: &[u8]) -> ModelResult<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}

// =============================================================================
// BLOCK
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Block {
    body: BlockBody,
    /// Validator identity (`0X` + uppercase compressed key) => signature.
    #[serde(default)]
    signatures: BTreeMap<String, String>,

    #[serde(skip)]
    hash: OnceCell<Hash>,
    #[serde(skip)]
    hex: OnceCell<String>,
    #[serde(skip)]
    peer_set: Option<PeerSet>,
}

impl Block {
    /// Build a block; the peers hash is computed from `peers` in order.
    pub fn new(
        index: BlockIndex,
        round_received: Round,
        frame_hash: Vec<u8>,
        peers: Vec<Peer>,
        transactions: Vec<Vec<u8>>,
        internal_transactions: Vec<InternalTransaction>,
    ) -> ModelResult<Self> {
        let peer_set = PeerSet::new(peers);
        let peers_hash = peer_set.hash()?;

        Ok(Self {
            body: BlockBody {
                index,
                round_received,
                state_hash: Vec::new(),
                frame_hash,
                peers_hash: peers_hash.to_vec(),
                transactions,
                internal_transactions,
                internal_transaction_receipts: Vec::new(),
            },
            signatures: BTreeMap::new(),
            hash: OnceCell::new(),
            hex: OnceCell::new(),
            peer_set: Some(peer_set),
        })
    }

    /// Build the block for `frame`, flattening its events' payloads in
    /// consensus order.
    pub fn from_frame(index: BlockIndex, frame: &Frame) -> ModelResult<Self> {
        let frame_hash = frame.hash()?;

        let mut transactions = Vec::new();
        let mut internal_transactions = Vec::new();
        for event in &frame.events {
            transactions.extend_from_slice(event.core.transactions());
            internal_transactions.extend_from_slice(event.core.internal_transactions());
        }

        debug!(
            index,
            round = frame.round,
            transactions = transactions.len(),
            internal_transactions = internal_transactions.len(),
            "built block from frame"
        );

        Self::new(
            index,
            frame.round,
            frame_hash.to_vec(),
            frame.peers.clone(),
            transactions,
            internal_transactions,
        )
    }

    pub fn body(&self) -> &BlockBody {
        &self.body
    }

    /// Mutable access to the body. Drops the memoized hash.
    pub fn body_mut(&mut self) -> &mut BlockBody {
        self.clear();
        &mut self.body
    }

    fn clear(&mut self) {
        self.hash.take();
        self.hex.take();
    }

    pub fn index(&self) -> BlockIndex {
        self.body.index
    }

    pub fn round_received(&self) -> Round {
        self.body.round_received
    }

    pub fn state_hash(&self) -> &[u8] {
        &self.body.state_hash
    }

    pub fn frame_hash(&self) -> &[u8] {
        &self.body.frame_hash
    }

    pub fn peers_hash(&self) -> &[u8] {
        &self.body.peers_hash
    }

    pub fn transactions(&self) -> &[Vec<u8>] {
        &self.body.transactions
    }

    pub fn internal_transactions(&self) -> &[InternalTransaction] {
        &self.body.internal_transactions
    }

    pub fn internal_transaction_receipts(&self) -> &[InternalTransactionReceipt] {
        &self.body.internal_transaction_receipts
    }

    /// Roster the block was built with. Not persisted.
    pub fn peer_set(&self) -> Option<&PeerSet> {
        self.peer_set.as_ref()
    }

    pub fn append_transactions(&mut self, transactions: impl IntoIterator<Item = Vec<u8>>) {
        self.body.transactions.extend(transactions);
        self.clear();
    }

    /// Record the application's answer to the commit of this block.
    pub fn apply_commit_response(&mut self, response: &CommitResponse) {
        self.body.state_hash = response.state_hash.clone();
        self.body.internal_transaction_receipts = response.internal_transaction_receipts.clone();
        self.clear();
    }

    // -------------------------------------------------------------------------
    // Signatures
    // -------------------------------------------------------------------------

    /// Sign the body hash. The signature is returned, not attached.
    pub fn sign(&self, keypair: &Secp256k1KeyPair) -> ModelResult<BlockSignature> {
        let digest = self
            .body
            .hash()
            .map_err(|e| ModelError::Signing(e.to_string()))?;
        let signature = keypair.sign_prehash(&digest)?;

        Ok(BlockSignature::new(
            keypair.public_key().as_bytes().to_vec(),
            self.body.index,
            signature.to_hex(),
        ))
    }

    /// Attach a signature; a later signature from the same validator wins.
    pub fn set_signature(&mut self, signature: &BlockSignature) {
        self.signatures.insert(
            signature.validator_compressed_hex(),
            signature.signature.clone(),
        );
        self.clear();
    }

    pub fn signatures(&self) -> &BTreeMap<String, String> {
        &self.signatures
    }

    /// Attached signatures as block signatures, ordered by validator.
    pub fn get_signatures(&self) -> Vec<BlockSignature> {
        self.signatures
            .iter()
            .filter_map(|(validator, signature)| {
                let validator = decode_hex(validator).ok()?;
                Some(BlockSignature::new(validator, self.body.index, signature.clone()))
            })
            .collect()
    }

    /// Signature of one validator, looked up by identity (any case).
    pub fn get_signature(&self, validator: &str) -> ModelResult<BlockSignature> {
        let key = normalize_identity(validator);
        let signature = self
            .signatures
            .get(&key)
            .ok_or_else(|| ModelError::SignatureNotFound(key.clone()))?;

        Ok(BlockSignature::new(
            decode_hex(&key)?,
            self.body.index,
            signature.clone(),
        ))
    }

    /// Check `signature` against the body hash and the signer's key.
    pub fn verify(&self, signature: &BlockSignature) -> ModelResult<bool> {
        let digest = self.body.hash()?;
        let valid = verify_signature(&signature.validator, &digest, &signature.signature)?;
        if !valid {
            debug!(
                index = self.body.index,
                validator = %signature.validator_compressed_hex(),
                "block signature mismatch"
            );
        }
        Ok(valid)
    }

    // -------------------------------------------------------------------------
    // Hashing and persistence
    // -------------------------------------------------------------------------

    /// Keccak-256 over the canonical body and the attached signatures.
    pub fn hash(&self) -> ModelResult<Hash> {
        if let Some(hash) = self.hash.get() {
            return Ok(*hash);
        }
        let canonical = CanonicalBlock {
            body: self.body.canonical(),
            signatures: &self.signatures,
        };
        let hash = keccak256(&serde_json::to_vec(&canonical)?);
        Ok(*self.hash.get_or_init(|| hash))
    }

    pub fn hex(&self) -> ModelResult<&str> {
        if let Some(hex) = self.hex.get() {
            return Ok(hex);
        }
        let hex = encode_hex(&self.hash()?);
        Ok(self.hex.get_or_init(|| hex))
    }

    pub fn marshal(&self) -> ModelResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn unmarshal(data: &[u8]) -> ModelResult<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.body == other.body && self.signatures == other.signatures
    }
}

impl Eq for Block {}
