//! # SQUALL Core
//!
//! Fixed-capacity storage for per-frame simulation.
//!
//! ## Architecture Rules
//!
//! 1. **No heap allocations in hot path** - pools are sized at startup
//! 2. **No copying between slots** - handles stay valid while allocated
//! 3. **Exhaustion is not an error** - callers skip the spawn

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod memory;

pub use memory::{IntrusivePool, PoolHandle};
