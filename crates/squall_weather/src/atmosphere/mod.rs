//! # Full-Sky Precipitation
//!
//! The dominant rain or snow effect. Drops live in a fixed array sized at
//! activation; each frame every slot either keeps falling or tries to
//! respawn somewhere under open sky around the viewer.

mod model;
mod rain;
mod snow;

pub use model::{DropFrame, PrecipitationModel};
pub use rain::{burst_ceiling, RainModel};
pub use snow::SnowModel;

use squall_shared::Vec3;

use crate::effect_spec::PrecipitationKind;

/// Whether a drop slot is in use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DropState {
    /// Free for regeneration. Position data is stale.
    #[default]
    Inactive,
    /// Falling and rendered.
    Falling,
}

/// One full-sky drop or flake.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AtmosphericParticle {
    /// World position of the streak's leading end.
    pub pos: Vec3,
    /// Velocity, units per second.
    pub delta: Vec3,
    /// `delta` normalized.
    pub delta_normalized: Vec3,
    /// Tint (rain only).
    pub colour: [u8; 3],
    /// Visual length.
    pub height: f32,
    /// Visual thickness.
    pub weight: f32,
    /// Slot state.
    pub state: DropState,
    /// Earliest time (ms) this slot may regenerate.
    pub next_drop_time: u32,
    /// Index into the effect's material list.
    pub shader: usize,
}

impl AtmosphericParticle {
    /// True while the drop is falling.
    #[inline]
    #[must_use]
    pub fn is_falling(&self) -> bool {
        self.state == DropState::Falling
    }
}

/// Per-frame drop counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AtmosphereStats {
    /// Drops falling this frame.
    pub drops_active: u32,
    /// Drops spawned this frame.
    pub drops_created: u32,
    /// Drops that produced a triangle.
    pub drops_rendered: u32,
    /// Inactive drops held back by their cooldown.
    pub drops_skipped: u32,
    /// `drops_active` of the previous frame.
    pub old_drops_active: u32,
}

impl AtmosphereStats {
    /// Rolls the active count into `old_drops_active` and zeroes the rest.
    pub fn begin_frame(&mut self) {
        *self = Self {
            old_drops_active: self.drops_active,
            ..Self::default()
        };
    }
}

/// The model for a precipitation kind.
#[must_use]
pub fn model_for(kind: PrecipitationKind) -> &'static dyn PrecipitationModel {
    match kind {
        PrecipitationKind::Rain => &RainModel,
        PrecipitationKind::Snow => &SnowModel,
    }
}
