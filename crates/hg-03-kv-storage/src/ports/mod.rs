//! # Ports Layer
//!
//! Driven ports implemented by the storage backends.

mod outbound;

pub use outbound::*;
