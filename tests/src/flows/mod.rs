//! # Cross-Crate Flows
//!
//! Each module drives a small simulated network through one path of the
//! consensus bookkeeping.

mod blocks;
mod gossip;
mod storage;
