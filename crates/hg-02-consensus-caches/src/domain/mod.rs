//! Domain layer for the consensus caches
//!
//! Every cache is owned by a single store and takes `&mut self` for writes;
//! none of them lock internally.

mod config;
mod errors;
mod participant_events;
mod peer_set_cache;
mod pending_rounds;
mod rolling_index;
mod sig_pool;

pub use config::*;
pub use errors::*;
pub use participant_events::*;
pub use peer_set_cache::*;
pub use pending_rounds::*;
pub use rolling_index::*;
pub use sig_pool::*;
