//! # Memory Management
//!
//! Pre-allocated pools for zero-allocation simulation.
//!
//! ## Design Philosophy
//!
//! All memory is allocated once at startup. During a frame:
//! - No heap allocations
//! - No slot ever moves
//! - A full pool means "skip", never "grow"

mod pool;

pub use pool::{ActiveIter, IntrusivePool, PoolHandle};
