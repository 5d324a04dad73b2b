//! Internal (governance) transactions
//!
//! An internal transaction asks the network to change its own membership:
//! add or remove a validator, or add or remove a parachain. It is
//! self-attested: the signature is checked against the public key of the
//! peer carried in the body, not against whoever relayed it.

use super::errors::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use shared_crypto::{encode_hex, keccak256, verify_signature, Secp256k1KeyPair};
use shared_types::{Address, Hash, Peer};
use std::fmt;

/// Kind of membership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "PEER_ADD")]
    PeerAdd,
    #[serde(rename = "PEER_REMOVE")]
    PeerRemove,
    #[serde(rename = "PARACHAIN_ADD")]
    ParachainAdd,
    #[serde(rename = "PARACHAIN_DEL")]
    ParachainDel,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionType::PeerAdd => "PEER_ADD",
            TransactionType::PeerRemove => "PEER_REMOVE",
            TransactionType::ParachainAdd => "PARACHAIN_ADD",
            TransactionType::ParachainDel => "PARACHAIN_DEL",
        };
        f.write_str(name)
    }
}

/// The signed part of an internal transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InternalTransactionBody {
    #[serde(rename = "Type")]
    pub transaction_type: TransactionType,
    pub peer: Peer,
    /// Contract address voted on (parachain transactions only).
    #[serde(rename = "Id", default)]
    pub address: Option<Address>,
}

impl InternalTransactionBody {
    /// Canonical JSON encoding of the body.
    pub fn marshal(&self) -> ModelResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Keccak-256 of the canonical encoding.
    pub fn hash(&self) -> ModelResult<Hash> {
        Ok(keccak256(&self.marshal()?))
    }
}

/// A governance request plus the subject peer's signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InternalTransaction {
    pub body: InternalTransactionBody,
    #[serde(default)]
    pub signature: String,
}

impl InternalTransaction {
    pub fn new(transaction_type: TransactionType, peer: Peer, address: Option<Address>) -> Self {
        Self {
            body: InternalTransactionBody {
                transaction_type,
                peer,
                address,
            },
            signature: String::new(),
        }
    }

    /// Request to join the validator set.
    pub fn new_peer_add(peer: Peer) -> Self {
        Self::new(TransactionType::PeerAdd, peer, None)
    }

    /// Request to leave the validator set.
    pub fn new_peer_remove(peer: Peer) -> Self {
        Self::new(TransactionType::PeerRemove, peer, None)
    }

    pub fn new_parachain_add(peer: Peer, address: Address) -> Self {
        Self::new(TransactionType::ParachainAdd, peer, Some(address))
    }

    pub fn new_parachain_remove(peer: Peer, address: Address) -> Self {
        Self::new(TransactionType::ParachainDel, peer, Some(address))
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.body.transaction_type
    }

    /// Sign the body hash. The key should belong to `body.peer`.
    pub fn sign(&mut self, keypair: &Secp256k1KeyPair) -> ModelResult<()> {
        let digest = self
            .body
            .hash()
            .map_err(|e| ModelError::Signing(e.to_string()))?;
        self.signature = keypair.sign_prehash(&digest)?.to_hex();
        Ok(())
    }

    /// Verify the signature against the public key of the peer in the body.
    pub fn verify(&self) -> ModelResult<bool> {
        let pub_key = self.body.peer.pub_key_bytes()?;
        let digest = self.body.hash()?;
        Ok(verify_signature(&pub_key, &digest, &self.signature)?)
    }

    /// Hex of the body hash; stable key for tracking in-flight transactions.
    pub fn hash_string(&self) -> ModelResult<String> {
        Ok(encode_hex(&self.body.hash()?))
    }

    pub fn as_accepted(&self) -> InternalTransactionReceipt {
        InternalTransactionReceipt {
            internal_transaction: self.clone(),
            accepted: true,
        }
    }

    pub fn as_refused(&self) -> InternalTransactionReceipt {
        InternalTransactionReceipt {
            internal_transaction: self.clone(),
            accepted: false,
        }
    }

    pub fn marshal(&self) -> ModelResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn unmarshal(data: &[u8]) -> ModelResult<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}

/// The application's decision on an internal transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InternalTransactionReceipt {
    pub internal_transaction: InternalTransaction,
    pub accepted: bool,
}
