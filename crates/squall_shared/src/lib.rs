//! # SQUALL Shared Types
//!
//! Math primitives and tuning constants used by the pool and the weather
//! simulation.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod constants;
pub mod math;

pub use math::Vec3;
