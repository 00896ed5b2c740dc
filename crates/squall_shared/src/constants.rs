//! # Weather Tuning Constants
//!
//! **CRITICAL:** These values set visual density and fall behaviour.
//! They are tuned together; do not "simplify" one in isolation.

// =============================================================================
// WORLD
// =============================================================================

/// Default gravity in world units per second squared.
pub const DEFAULT_GRAVITY: f32 = 800.0;

// =============================================================================
// PRIMARY PRECIPITATION (full-sky rain and snow)
// =============================================================================

/// Hard cap on primary drops/flakes, and the drop array capacity.
pub const MAX_ATMOSPHERIC_PARTICLES: usize = 4000;

/// Horizontal radius around the viewer in which drops live.
pub const MAX_ATMOSPHERIC_DISTANCE: f32 = 1000.0;

/// Closest horizontal spawn distance from the viewer.
pub const MIN_SPAWN_DISTANCE: f32 = 20.0;

/// Maximum number of materials registered for one effect.
pub const MAX_ATMOSPHERIC_EFFECT_SHADERS: usize = 6;

/// Cooldown (ms) stamped on a drop whose regeneration failed.
pub const ATMOSPHERIC_DROP_DELAY_MS: u32 = 1000;

/// Rain fall speed.
pub const ATMOSPHERIC_RAIN_SPEED: f32 = 1.1 * DEFAULT_GRAVITY;

/// Nominal rain streak length.
pub const ATMOSPHERIC_RAIN_HEIGHT: f32 = 150.0;

/// Snow fall speed.
pub const ATMOSPHERIC_SNOW_SPEED: f32 = 0.1 * DEFAULT_GRAVITY;

/// Nominal snow flake length.
pub const ATMOSPHERIC_SNOW_HEIGHT: f32 = 3.0;

/// Burst gate cycle length (ms).
pub const BURST_CYCLE_MS: u32 = 10_000;

/// Radius inside which rain streaks fade out.
pub const RAIN_FADE_RADIUS: f32 = 128.0;

/// Radius beyond which snow flakes grow.
pub const SNOW_GROW_RADIUS: f32 = 500.0;

/// Distance over which snow flakes grow by their full factor.
pub const SNOW_GROW_SPAN: f32 = 2000.0;

// =============================================================================
// EFFECT VOLUMES (localized splash particles)
// =============================================================================

/// Capacity of the generic particle pool.
pub const MAX_PARTICLES: usize = 8192;

/// Clip distance for splash-type volumes.
pub const EFFECT_CLIP_DISTANCE: f32 = 1024.0;

/// Clip distance for streak-type volumes, and the near/far density band.
pub const EFFECT_HALF_CLIP_DISTANCE: f32 = 512.0;

/// Downward speed of volume rain particles.
pub const EFFECT_RAIN_SPEED: f32 = 400.0;

/// Inset from the volume walls for spawned particles.
pub const EFFECT_SPAWN_MARGIN: i32 = 8;

/// Lifetime (ms) of a floor splash sprite.
pub const SPLASH_LIFETIME_MS: u32 = 100;
