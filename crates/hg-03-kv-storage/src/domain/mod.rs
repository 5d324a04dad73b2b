//! # Domain Layer
//!
//! Errors, configuration and key layout of the store.

mod config;
mod errors;

pub use config::*;
pub use errors::*;
