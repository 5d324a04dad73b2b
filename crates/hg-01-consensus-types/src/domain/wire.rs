//! Compact wire form of events
//!
//! Parent hashes and the creator key are replaced by small integers that
//! the receiver resolves against its own peer repertoire and event index.

use super::block_signature::{BlockSignature, WireBlockSignature};
use super::internal_transaction::InternalTransaction;
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};
use shared_types::{EventIndex, PeerId};

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireBody {
    #[serde_as(as = "Vec<Base64>")]
    #[serde(default)]
    pub transactions: Vec<Vec<u8>>,
    #[serde(default)]
    pub internal_transactions: Vec<InternalTransaction>,
    #[serde(default)]
    pub block_signatures: Vec<WireBlockSignature>,

    #[serde(rename = "CreatorID")]
    pub creator_id: PeerId,
    #[serde(rename = "OtherParentCreatorID")]
    pub other_parent_creator_id: PeerId,
    pub index: EventIndex,
    pub self_parent_index: EventIndex,
    pub other_parent_index: EventIndex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireEvent {
    pub body: WireBody,
    pub signature: String,
}

impl WireEvent {
    /// Reattach the creator's key to the carried block signatures.
    pub fn block_signatures(&self, validator: &[u8]) -> Vec<BlockSignature> {
        self.body
            .block_signatures
            .iter()
            .map(|bs| BlockSignature::new(validator.to_vec(), bs.index, bs.signature.clone()))
            .collect()
    }
}
