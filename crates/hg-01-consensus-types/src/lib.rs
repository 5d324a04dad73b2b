//! # hg-01-consensus-types
//!
//! Data model of the consensus core: events, blocks, block signatures,
//! internal transactions and frames, with their hashing, signing and wire
//! encoding rules.
//!
//! ## Architecture
//!
//! ```text
//!  network ──WireEvent──→ Event::from_wire(WireResolver) ──→ Event
//!                                                             │
//!  ordering algorithm ──→ Frame ──→ Block::from_frame ──→ Block
//!                                                             │
//!  validators ──sign──→ BlockSignature      CommitHandler ←───┘
//! ```
//!
//! ## Canonical encodings
//!
//! - Event identity hash and event signature cover the same bytes: the body
//!   without its wire fields.
//! - Validators sign the block body hash (frame hash excluded); the block
//!   hash additionally covers the attached signatures.
//! - Signatures are `0x` + hex of 65 bytes `r || s || v`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hg_01_consensus_types::{Block, Event};
//!
//! let mut event = Event::new(txs, vec![], vec![], parents, creator, index);
//! event.sign(&keypair)?;
//! assert!(event.verify()?);
//!
//! let block = Block::from_frame(index, &frame)?;
//! let signature = block.sign(&keypair)?;
//! ```

pub mod domain;
pub mod ports;

// Re-export main types
pub use domain::{
    by_lamport_timestamp, by_topological_order, frame_event_order, sort_frame_events,
    sort_lamport, sort_topological, Block, BlockBody, BlockSignature, CommitResponse,
    CoordinatesMap, Event, EventBody, EventCoordinates, Frame, FrameEvent, InternalTransaction,
    InternalTransactionBody, InternalTransactionReceipt, ModelError, ModelResult,
    TransactionType, WireBlockSignature, WireBody, WireEvent, NO_INDEX,
};
pub use ports::{CommitHandler, WireResolver};
