//! The strategy seam between rain and snow, and the pieces they share.

use std::f32::consts::TAU;

use rand::{Rng, RngCore};
use squall_shared::constants::{
    ATMOSPHERIC_DROP_DELAY_MS, MAX_ATMOSPHERIC_DISTANCE, MIN_SPAWN_DISTANCE,
};
use squall_shared::Vec3;

use super::{AtmosphereStats, AtmosphericParticle, DropState};
use crate::effect_spec::PrecipitationKind;
use crate::render::{PolySink, ShaderHandle};
use crate::view::View;
use crate::world::WorldHeights;

/// Everything a model reads during one frame.
#[derive(Clone, Copy)]
pub struct DropFrame<'a> {
    /// Frame time (ms).
    pub now: u32,
    /// Seconds of movement to apply this frame.
    pub moved: f32,
    /// The viewer.
    pub view: &'a View,
    /// Ground and sky queries.
    pub world: &'a dyn WorldHeights,
    /// Configured drop count, for the burst gate.
    pub num_drops: i32,
    /// Drops active during the previous frame.
    pub old_drops_active: u32,
    /// Spawn ceiling above the viewer; zero for none.
    pub height_offset: f32,
    /// Registered materials; never empty while a model runs.
    pub shaders: &'a [ShaderHandle],
    /// Render only: no movement, no regeneration.
    pub paused: bool,
}

/// Spawns, moves and draws one kind of drop.
///
/// Selected once per effect; the driver only ever calls [`update`].
///
/// [`update`]: PrecipitationModel::update
pub trait PrecipitationModel: Sync {
    /// The kind this model draws.
    fn kind(&self) -> PrecipitationKind;

    /// Tries to place `drop` somewhere under open sky. Returns false when
    /// the sampled column cannot host a drop.
    fn generate(
        &self,
        drop: &mut AtmosphericParticle,
        wind: Vec3,
        weight: f32,
        frame: &DropFrame<'_>,
        rng: &mut dyn RngCore,
    ) -> bool;

    /// Moves a falling drop and reports whether it is still alive.
    /// Inactive drops report false.
    fn check_visible(&self, drop: &mut AtmosphericParticle, frame: &DropFrame<'_>) -> bool;

    /// Emits the drop's triangle. Returns true when the sink took it.
    fn render(
        &self,
        drop: &AtmosphericParticle,
        frame: &DropFrame<'_>,
        sink: &mut dyn PolySink,
    ) -> bool;

    /// Runs one frame over `drops`.
    ///
    /// A drop that died tries to regenerate unless it is cooling down; a
    /// failed attempt starts a new cooldown. Only falling drops render.
    #[allow(clippy::too_many_arguments)]
    fn update(
        &self,
        drops: &mut [AtmosphericParticle],
        wind: Vec3,
        weight: f32,
        frame: &DropFrame<'_>,
        rng: &mut dyn RngCore,
        sink: &mut dyn PolySink,
        stats: &mut AtmosphereStats,
    ) {
        for drop in drops {
            if frame.paused {
                if drop.is_falling() {
                    stats.drops_active += 1;
                    if self.render(drop, frame, sink) {
                        stats.drops_rendered += 1;
                    }
                }
                continue;
            }

            if !self.check_visible(drop, frame) {
                if frame.now < drop.next_drop_time {
                    stats.drops_skipped += 1;
                    continue;
                }
                if !self.generate(drop, wind, weight, frame, rng) {
                    // Keep barren columns from retrying every frame.
                    drop.next_drop_time = frame.now.saturating_add(ATMOSPHERIC_DROP_DELAY_MS);
                    continue;
                }
                stats.drops_created += 1;
            }

            stats.drops_active += 1;
            if self.render(drop, frame, sink) {
                stats.drops_rendered += 1;
            }
        }
    }
}

/// Picks a spawn point around the viewer between ground and sky.
///
/// Fails when the column has no sky or none left between ground and sky,
/// or when the ceiling pushes the point underground.
pub(crate) fn spot_in_open_sky(frame: &DropFrame<'_>, rng: &mut dyn RngCore) -> Option<Vec3> {
    let origin = frame.view.origin;
    let angle = rng.gen::<f32>() * TAU;
    let distance = MIN_SPAWN_DISTANCE + MAX_ATMOSPHERIC_DISTANCE * rng.gen::<f32>();
    let mut pos = Vec3::new(
        origin.x + angle.sin() * distance,
        origin.y + angle.cos() * distance,
        origin.z,
    );

    let sky = frame.world.sky_height_at(pos)?;
    let ground = frame.world.ground_height_at(pos);
    if ground >= sky {
        return None;
    }
    pos.z = ground + rng.gen::<f32>() * (sky - ground);

    if frame.height_offset > 0.0 && pos.z - origin.z > frame.height_offset {
        pos.z = origin.z + frame.height_offset;
        if pos.z < ground {
            return None;
        }
    }
    Some(pos)
}

/// Uniform in `[-1, 1)`.
pub(crate) fn crandom(rng: &mut dyn RngCore) -> f32 {
    rng.gen_range(-1.0..1.0)
}

/// A material slot among the registered ones.
pub(crate) fn pick_shader(frame: &DropFrame<'_>, rng: &mut dyn RngCore) -> usize {
    if frame.shaders.len() > 1 {
        rng.gen_range(0..frame.shaders.len())
    } else {
        0
    }
}

/// Arms `drop` as falling along `delta`.
pub(crate) fn launch(drop: &mut AtmosphericParticle, pos: Vec3, delta: Vec3) {
    drop.state = DropState::Falling;
    drop.pos = pos;
    drop.delta = delta;
    drop.delta_normalized = delta.normalized();
}

/// Moves a falling drop and kills it if it sank below `ground_slack` under
/// the ground or drifted out of range. Returns whether it survives.
pub(crate) fn advance(
    drop: &mut AtmosphericParticle,
    frame: &DropFrame<'_>,
    ground_slack: f32,
) -> bool {
    if !drop.is_falling() {
        return false;
    }
    drop.pos = drop.pos.mul_add(frame.moved, drop.delta);
    if drop.pos.z + ground_slack < frame.world.ground_height_at(drop.pos) {
        drop.state = DropState::Inactive;
        return false;
    }
    let range = MAX_ATMOSPHERIC_DISTANCE * MAX_ATMOSPHERIC_DISTANCE;
    if drop.pos.horizontal_distance_squared(frame.view.origin) > range {
        drop.state = DropState::Inactive;
        return false;
    }
    true
}

/// Shortens a streak that reaches into the ground. Returns the streak
/// start and its remaining length, or `None` when nothing is left above
/// ground.
pub(crate) fn clip_to_ground(
    start: Vec3,
    drop: &AtmosphericParticle,
    world: &dyn WorldHeights,
) -> Option<(Vec3, f32)> {
    let ground = world.ground_height_at(start);
    let mut start = start;
    let mut len = drop.height;
    if start.z <= ground {
        len = drop.height - ground + start.z;
        start = start.mul_add(len - drop.height, drop.delta_normalized);
    }
    (len > 0.0).then_some((start, len))
}

/// Screen-facing side vector for a streak along `forward`.
pub(crate) fn streak_right(forward: Vec3, view: &View) -> Vec3 {
    let across = forward.dot(view.left());
    let vertical = forward.dot(view.up());
    (view.left() * vertical - view.up() * across).normalized()
}
