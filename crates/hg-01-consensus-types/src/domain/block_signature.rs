//! Block signatures
//!
//! One validator's signature over a block body hash. Pooled by
//! `"{index}-{validator identity}"` until the block is finalized.

use super::errors::ModelResult;
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};
use shared_crypto::{encode_hex_upper, public_key_identity};
use shared_types::BlockIndex;

/// A validator's signature on the block at `index`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlockSignature {
    /// SEC1 public key of the signer.
    #[serde_as(as = "Base64")]
    pub validator: Vec<u8>,
    pub index: BlockIndex,
    pub signature: String,
}

impl BlockSignature {
    pub fn new(validator: Vec<u8>, index: BlockIndex, signature: impl Into<String>) -> Self {
        Self {
            validator,
            index,
            signature: signature.into(),
        }
    }

    /// `0X` + uppercase hex of the raw validator bytes.
    pub fn validator_hex(&self) -> String {
        encode_hex_upper(&self.validator)
    }

    /// `0X` + uppercase hex of the compressed validator key.
    ///
    /// Bytes that do not parse as a public key fall back to
    /// [`validator_hex`](Self::validator_hex), so the pooling key is total.
    pub fn validator_compressed_hex(&self) -> String {
        public_key_identity(&self.validator).unwrap_or_else(|_| self.validator_hex())
    }

    /// Pooling key: one entry per (block index, validator).
    pub fn key(&self) -> String {
        format!("{}-{}", self.index, self.validator_compressed_hex())
    }

    /// Drop the validator bytes for transmission; the receiver knows the
    /// creator of the carrying event.
    pub fn to_wire(&self) -> WireBlockSignature {
        WireBlockSignature {
            index: self.index,
            signature: self.signature.clone(),
        }
    }

    pub fn marshal(&self) -> ModelResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn unmarshal(data: &[u8]) -> ModelResult<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}

/// Block signature without the validator key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireBlockSignature {
    pub index: BlockIndex,
    pub signature: String,
}
