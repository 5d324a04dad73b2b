use super::internal_transaction::InternalTransactionReceipt;
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};

/// What the application returns after executing a finalized block.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CommitResponse {
    #[serde_as(as = "Base64")]
    pub state_hash: Vec<u8>,
    #[serde(default)]
    pub internal_transaction_receipts: Vec<InternalTransactionReceipt>,
}

impl CommitResponse {
    pub fn new(state_hash: Vec<u8>, receipts: Vec<InternalTransactionReceipt>) -> Self {
        Self {
            state_hash,
            internal_transaction_receipts: receipts,
        }
    }
}
