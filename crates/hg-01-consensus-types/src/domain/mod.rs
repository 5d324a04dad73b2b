//! Domain layer for the consensus data model
//!
//! - event / wire / ordering: DAG vertices, their compact wire form and the
//!   orders the consensus algorithm sorts them by
//! - block / block_signature: finalized blocks and validator signatures
//! - internal_transaction: self-attested membership changes
//! - frame / commit: the input and output of a block commit

mod block;
mod block_signature;
mod commit;
mod errors;
mod event;
mod frame;
mod internal_transaction;
mod ordering;
mod wire;

pub use block::*;
pub use block_signature::*;
pub use commit::*;
pub use errors::*;
pub use event::*;
pub use frame::*;
pub use internal_transaction::*;
pub use ordering::*;
pub use wire::*;
