//! Snow: short white flakes that drift slowly and tumble sideways.

use rand::{Rng, RngCore};
use squall_shared::constants::{ATMOSPHERIC_SNOW_HEIGHT, SNOW_GROW_RADIUS, SNOW_GROW_SPAN};
use squall_shared::Vec3;

use super::model::{
    advance, clip_to_ground, crandom, launch, pick_shader, spot_in_open_sky, streak_right,
};
use super::{AtmosphericParticle, DropFrame, PrecipitationModel};
use crate::effect_spec::PrecipitationKind;
use crate::render::{PolySink, PolyVert};

/// How much larger a flake gets across the growth span.
const GROW_FACTOR: f32 = 10.0;

/// Lateral tumble amplitude.
const TUMBLE_AMPLITUDE: f32 = 24.0;

/// Full-sky snow.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnowModel;

impl SnowModel {
    /// Horizontal drift added at render time. Two unrelated oscillations
    /// of height fake a random wobble; near-vertical flakes barely move.
    #[must_use]
    pub fn tumble(drop: &AtmosphericParticle) -> Vec3 {
        let rate = 0.031_25 * (0.5 * drop.weight);
        let sin = (drop.pos.z * rate).sin();
        let cos = ((drop.pos.z + drop.pos.y) * rate).cos();
        let amplitude = TUMBLE_AMPLITUDE * (1.0 - drop.delta_normalized.z);
        Vec3::new(amplitude * sin, amplitude * cos, 0.0)
    }

    /// Size multiplier for a flake `dist_sq` away from the viewer.
    #[must_use]
    pub fn grow_scale(dist_sq: f32) -> f32 {
        let radius = SNOW_GROW_RADIUS * SNOW_GROW_RADIUS;
        if dist_sq > radius {
            1.0 + (dist_sq - radius) * (GROW_FACTOR / (SNOW_GROW_SPAN * SNOW_GROW_SPAN))
        } else {
            1.0
        }
    }
}

impl PrecipitationModel for SnowModel {
    fn kind(&self) -> PrecipitationKind {
        PrecipitationKind::Snow
    }

    fn generate(
        &self,
        drop: &mut AtmosphericParticle,
        wind: Vec3,
        _weight: f32,
        frame: &DropFrame<'_>,
        rng: &mut dyn RngCore,
    ) -> bool {
        let Some(pos) = spot_in_open_sky(frame, rng) else {
            return false;
        };

        let mut delta = wind;
        delta.z += crandom(rng) * 25.0;
        launch(drop, pos, delta);
        drop.height = ATMOSPHERIC_SNOW_HEIGHT + rng.gen::<f32>() * 2.0;
        drop.weight = drop.height * 0.5;
        drop.shader = pick_shader(frame, rng);
        true
    }

    fn check_visible(&self, drop: &mut AtmosphericParticle, frame: &DropFrame<'_>) -> bool {
        advance(drop, frame, 0.0)
    }

    fn render(
        &self,
        drop: &AtmosphericParticle,
        frame: &DropFrame<'_>,
        sink: &mut dyn PolySink,
    ) -> bool {
        if !drop.is_falling() || frame.view.frustum.cull_point(drop.pos) {
            return false;
        }
        let tumbled = drop.pos + Self::tumble(drop);
        let Some((start, len)) = clip_to_ground(tumbled, drop, frame.world) else {
            return false;
        };

        let scale = Self::grow_scale(drop.pos.distance_squared(frame.view.origin));
        let forward = drop.delta_normalized;
        let finish = start.mul_add(-len * scale, forward);
        let right = streak_right(forward, frame.view);
        let width = scale * drop.weight;

        let white = [255; 4];
        let verts = [
            PolyVert::new(finish.mul_add(-width, right), [0.0, 0.0], white),
            PolyVert::new(start.mul_add(-width, right), [0.0, 1.0], white),
            PolyVert::new(start.mul_add(width, right), [1.0, 1.0], white),
        ];
        frame
            .shaders
            .get(drop.shader)
            .is_some_and(|&shader| sink.add_triangle(shader, &verts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atmosphere::DropState;
    use crate::render::{PolyBuffers, ShaderHandle};
    use crate::view::{View, DEFAULT_FOV};
    use crate::world::UniformHeights;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_grow_scale() {
        assert!((SnowModel::grow_scale(100.0) - 1.0).abs() < f32::EPSILON);
        let far = 500.0 * 500.0 + 2000.0 * 2000.0;
        assert!((SnowModel::grow_scale(far) - 11.0).abs() < 1e-3);
    }

    #[test]
    fn test_vertical_flake_barely_tumbles() {
        let drop = AtmosphericParticle {
            pos: Vec3::new(0.0, 0.0, 100.0),
            delta_normalized: Vec3::new(0.0, 0.0, 1.0),
            weight: 2.0,
            ..AtmosphericParticle::default()
        };
        assert!(SnowModel::tumble(&drop).length() < 1e-4);

        let falling = AtmosphericParticle {
            delta_normalized: Vec3::new(0.0, 0.0, -1.0),
            ..drop
        };
        let drift = SnowModel::tumble(&falling);
        assert!(drift.length() <= 48.0 * std::f32::consts::SQRT_2 + 1e-3);
        assert!(drift.z.abs() < f32::EPSILON);
    }

    #[test]
    fn test_generate_and_render() {
        let view = View::looking(Vec3::new(0.0, 0.0, 64.0), Vec3::X, DEFAULT_FOV, DEFAULT_FOV);
        let world = UniformHeights::open(0.0, 512.0);
        let shaders = [ShaderHandle(7)];
        let frame = DropFrame {
            now: 0,
            moved: 0.0,
            view: &view,
            world: &world,
            num_drops: 100,
            // Snow has no burst gate.
            old_drops_active: 100_000,
            height_offset: 0.0,
            shaders: &shaders,
            paused: false,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut drop = AtmosphericParticle::default();
        assert!(SnowModel.generate(&mut drop, Vec3::new(0.0, 0.0, -80.0), 9.0, &frame, &mut rng));
        assert_eq!(drop.state, DropState::Falling);
        assert!((3.0..5.0).contains(&drop.height));
        assert!((drop.weight - drop.height * 0.5).abs() < f32::EPSILON);
        assert_eq!(drop.shader, 0);

        let placed = AtmosphericParticle {
            pos: Vec3::new(200.0, 0.0, 100.0),
            ..drop
        };
        let mut buffers = PolyBuffers::with_limits(1, 3);
        assert!(SnowModel.render(&placed, &frame, &mut buffers));
        assert_eq!(buffers.triangle_count_for(ShaderHandle(7)), 1);
    }

    #[test]
    fn test_flake_dies_at_ground() {
        let view = View::looking(Vec3::ZERO, Vec3::X, DEFAULT_FOV, DEFAULT_FOV);
        let world = UniformHeights::open(0.0, 512.0);
        let frame = DropFrame {
            now: 0,
            moved: 0.5,
            view: &view,
            world: &world,
            num_drops: 100,
            old_drops_active: 0,
            height_offset: 0.0,
            shaders: &[],
            paused: false,
        };
        let mut drop = AtmosphericParticle {
            pos: Vec3::new(50.0, 0.0, 30.0),
            delta: Vec3::new(0.0, 0.0, -80.0),
            height: 4.0,
            state: DropState::Falling,
            ..AtmosphericParticle::default()
        };
        assert!(!SnowModel.check_visible(&mut drop, &frame));
    }
}
