//! Pooled secondary particles spawned by effect volumes.

mod particle;
mod system;

pub use particle::{Particle, ParticleKind, ParticleType};
pub use system::{ParticleSystem, PARTICLE_SHADER};
