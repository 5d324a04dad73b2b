//! # Hashgraph Core Test Suite
//!
//! Unified test crate for flows that cross crate boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Simulated nodes, tracing setup
//! └── flows/            # Cross-crate choreography
//!     ├── gossip.rs     # event -> wire -> peer caches
//!     ├── blocks.rs     # frame -> block -> commit -> signatures
//!     └── storage.rs    # persistence and cache bootstrap
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p hg-tests
//! cargo test -p hg-tests flows::gossip
//!
//! # Benchmarks
//! cargo bench -p hg-tests
//! ```

pub mod fixtures;
pub mod flows;
