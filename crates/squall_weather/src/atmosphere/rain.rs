//! Rain: long translucent streaks that fall fast and arrive in bursts.

use rand::{Rng, RngCore};
use squall_shared::constants::{ATMOSPHERIC_RAIN_HEIGHT, BURST_CYCLE_MS, RAIN_FADE_RADIUS};
use squall_shared::Vec3;

use super::model::{
    advance, clip_to_ground, crandom, launch, pick_shader, spot_in_open_sky, streak_right,
};
use super::{AtmosphericParticle, DropFrame, PrecipitationModel};
use crate::effect_spec::PrecipitationKind;
use crate::render::{PolySink, PolyVert};

/// Most drops allowed active at `now` for a configured `num_drops`.
///
/// Half the drops are always allowed; the rest ramp in over each 10 second
/// cycle and drop back at the boundary.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn burst_ceiling(num_drops: i32, now: u32) -> f32 {
    let n = num_drops as f32;
    0.5 * n + 0.001 * n * (now % BURST_CYCLE_MS) as f32
}

/// Full-sky rain.
#[derive(Debug, Clone, Copy, Default)]
pub struct RainModel;

impl PrecipitationModel for RainModel {
    fn kind(&self) -> PrecipitationKind {
        PrecipitationKind::Rain
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn generate(
        &self,
        drop: &mut AtmosphericParticle,
        wind: Vec3,
        weight: f32,
        frame: &DropFrame<'_>,
        rng: &mut dyn RngCore,
    ) -> bool {
        let Some(pos) = spot_in_open_sky(frame, rng) else {
            return false;
        };
        if frame.old_drops_active as f32 > burst_ceiling(frame.num_drops, frame.now) {
            return false;
        }

        for channel in &mut drop.colour {
            *channel = ((0.6 + 0.2 * rng.gen::<f32>()) * 255.0) as u8;
        }
        let mut delta = wind;
        delta.z += crandom(rng) * 100.0;
        launch(drop, pos, delta);
        drop.height = ATMOSPHERIC_RAIN_HEIGHT + crandom(rng) * 100.0;
        drop.weight = weight;
        drop.shader = pick_shader(frame, rng);
        true
    }

    fn check_visible(&self, drop: &mut AtmosphericParticle, frame: &DropFrame<'_>) -> bool {
        // The whole streak must be underground before the drop dies.
        advance(drop, frame, drop.height)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn render(
        &self,
        drop: &AtmosphericParticle,
        frame: &DropFrame<'_>,
        sink: &mut dyn PolySink,
    ) -> bool {
        if !drop.is_falling() || frame.view.frustum.cull_point(drop.pos) {
            return false;
        }
        let Some((start, len)) = clip_to_ground(drop.pos, drop, frame.world) else {
            return false;
        };

        let dist = drop.pos.distance_squared(frame.view.origin);
        let fade_radius = RAIN_FADE_RADIUS * RAIN_FADE_RADIUS;
        let fade = if dist < fade_radius {
            0.25 + 0.75 * (dist / fade_radius)
        } else {
            1.0
        };

        let forward = drop.delta_normalized;
        let finish = start.mul_add(-len, forward);
        let right = streak_right(forward, frame.view);

        let [r, g, b] = drop.colour;
        let tip = [r, g, b, (100.0 * fade) as u8];
        let base = [r, g, b, (200.0 * fade) as u8];
        let verts = [
            PolyVert::new(finish, [0.5, 0.0], tip),
            PolyVert::new(start.mul_add(-drop.weight, right), [0.0, 1.0], base),
            PolyVert::new(start.mul_add(drop.weight, right), [1.0, 1.0], base),
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

    const SHADERS: [ShaderHandle; 2] = [ShaderHandle(1), ShaderHandle(2)];

    fn frame<'a>(view: &'a View, world: &'a UniformHeights, now: u32) -> DropFrame<'a> {
        DropFrame {
            now,
            moved: 0.0,
            view,
            world,
            num_drops: 300,
            old_drops_active: 0,
            height_offset: 0.0,
            shaders: &SHADERS,
            paused: false,
        }
    }

    fn view() -> View {
        View::looking(Vec3::new(0.0, 0.0, 64.0), Vec3::X, DEFAULT_FOV, DEFAULT_FOV)
    }

    #[test]
    fn test_burst_ceiling_ramps_within_cycle() {
        assert!((burst_ceiling(1000, 0) - 500.0).abs() < f32::EPSILON);
        assert!((burst_ceiling(1000, 9_999) - 10_499.0).abs() < 1e-2);
        assert!((burst_ceiling(1000, 10_000) - 500.0).abs() < f32::EPSILON);
        let mut last = 0.0;
        for t in (20_000..30_000).step_by(250) {
            let ceiling = burst_ceiling(400, t);
            assert!(ceiling >= last);
            last = ceiling;
        }
    }

    #[test]
    fn test_generate_places_drop_between_ground_and_sky() {
        let view = view();
        let world = UniformHeights::open(0.0, 512.0);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let frame = frame(&view, &world, 0);

        let mut drop = AtmosphericParticle::default();
        assert!(RainModel.generate(&mut drop, Vec3::new(0.0, 0.0, -880.0), 1.0, &frame, &mut rng));
        assert_eq!(drop.state, DropState::Falling);
        assert!((0.0..=512.0).contains(&drop.pos.z));
        assert!(drop.pos.horizontal_distance_squared(view.origin) >= 20.0 * 20.0 - 1e-2);
        assert!((50.0..=250.0).contains(&drop.height));
        assert!(drop.colour.iter().all(|&c| (153..=204).contains(&c)));
        assert!(drop.shader < SHADERS.len());
        assert!(drop.delta_normalized.z < 0.0);
    }

    #[test]
    fn test_generate_respects_burst_gate() {
        let view = view();
        let world = UniformHeights::open(0.0, 512.0);
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let mut frame = frame(&view, &world, 0);
        frame.old_drops_active = 151;

        let mut drop = AtmosphericParticle::default();
        assert!(!RainModel.generate(&mut drop, Vec3::ZERO, 1.0, &frame, &mut rng));
        assert_eq!(drop.state, DropState::Inactive);
    }

    #[test]
    fn test_ceiling_clamps_spawn_height() {
        let view = view();
        let world = UniformHeights::open(0.0, 4096.0);
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let mut frame = frame(&view, &world, 0);
        frame.height_offset = 100.0;

        for _ in 0..50 {
            let mut drop = AtmosphericParticle::default();
            assert!(RainModel.generate(&mut drop, Vec3::ZERO, 1.0, &frame, &mut rng));
            assert!(drop.pos.z <= 164.0 + 1e-3);
        }
    }

    #[test]
    fn test_drop_dies_once_streak_is_underground() {
        let view = view();
        let world = UniformHeights::open(0.0, 512.0);
        let mut frame = frame(&view, &world, 0);
        frame.moved = 0.1;

        let mut drop = AtmosphericParticle {
            pos: Vec3::new(100.0, 0.0, 10.0),
            delta: Vec3::new(0.0, 0.0, -880.0),
            height: 150.0,
            state: DropState::Falling,
            ..AtmosphericParticle::default()
        };
        // Moves to z = -78; the streak still pokes above ground.
        assert!(RainModel.check_visible(&mut drop, &frame));
        frame.moved = 0.1;
        assert!(!RainModel.check_visible(&mut drop, &frame));
        assert_eq!(drop.state, DropState::Inactive);
    }

    #[test]
    fn test_drop_dies_out_of_range() {
        let view = view();
        let world = UniformHeights::open(0.0, 512.0);
        let mut frame = frame(&view, &world, 0);
        frame.moved = 1.0;

        let mut drop = AtmosphericParticle {
            pos: Vec3::new(990.0, 0.0, 300.0),
            delta: Vec3::new(50.0, 0.0, -10.0),
            height: 150.0,
            state: DropState::Falling,
            ..AtmosphericParticle::default()
        };
        assert!(!RainModel.check_visible(&mut drop, &frame));
    }

    #[test]
    fn test_render_emits_one_triangle() {
        let view = view();
        let world = UniformHeights::open(0.0, 512.0);
        let frame = frame(&view, &world, 0);
        let drop = AtmosphericParticle {
            pos: Vec3::new(300.0, 0.0, 200.0),
            delta: Vec3::new(0.0, 0.0, -880.0),
            delta_normalized: Vec3::new(0.0, 0.0, -1.0),
            colour: [200, 200, 200],
            height: 150.0,
            weight: 1.0,
            state: DropState::Falling,
            shader: 1,
            ..AtmosphericParticle::default()
        };

        let mut buffers = PolyBuffers::with_limits(2, 6);
        assert!(RainModel.render(&drop, &frame, &mut buffers));
        assert_eq!(buffers.triangle_count_for(ShaderHandle(2)), 1);
    }

    fn falling_at(pos: Vec3) -> AtmosphericParticle {
        AtmosphericParticle {
            pos,
            delta: Vec3::new(0.0, 0.0, -880.0),
            delta_normalized: Vec3::new(0.0, 0.0, -1.0),
            colour: [200, 200, 200],
            height: 150.0,
            weight: 1.0,
            state: DropState::Falling,
            ..AtmosphericParticle::default()
        }
    }

    fn rendered(drop: &AtmosphericParticle, frame: &DropFrame<'_>) -> [PolyVert; 3] {
        let mut buffers = PolyBuffers::with_limits(1, 3);
        assert!(RainModel.render(drop, frame, &mut buffers));
        let verts = buffers.used().next().unwrap().verts();
        [verts[0], verts[1], verts[2]]
    }

    #[test]
    fn test_render_shortens_streak_reaching_ground() {
        let view = view();
        let world = UniformHeights::open(0.0, 512.0);
        let frame = frame(&view, &world, 0);

        let [tip, base, _] = rendered(&falling_at(Vec3::new(300.0, 0.0, 200.0)), &frame);
        assert!((tip.xyz[2] - base.xyz[2] - 150.0).abs() < 1e-3);

        // 50 units of the streak are underground.
        let [tip, base, other] = rendered(&falling_at(Vec3::new(300.0, 0.0, -50.0)), &frame);
        assert!(base.xyz[2].abs() < 1e-3);
        assert!(other.xyz[2].abs() < 1e-3);
        assert!((tip.xyz[2] - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_near_drops_fade() {
        let view = view();
        let world = UniformHeights::open(0.0, 512.0);
        let frame = frame(&view, &world, 0);

        let [tip, base, _] = rendered(&falling_at(Vec3::new(300.0, 0.0, 200.0)), &frame);
        assert_eq!(tip.modulate, [200, 200, 200, 100]);
        assert_eq!(base.modulate[3], 200);

        // 64 units away: 0.25 + 0.75 * 64² / 128² = 0.4375.
        let [tip, base, other] = rendered(&falling_at(Vec3::new(64.0, 0.0, 64.0)), &frame);
        assert_eq!(tip.modulate[3], 43);
        assert_eq!(base.modulate[3], 87);
        assert_eq!(other.modulate[3], 87);
        assert_eq!(base.modulate[..3], [200, 200, 200]);
    }

    #[test]
    fn test_render_skips_fully_buried_streak() {
        let view = view();
        let world = UniformHeights::open(0.0, 512.0);
        let frame = frame(&view, &world, 0);
        let drop = AtmosphericParticle {
            pos: Vec3::new(300.0, 0.0, -200.0),
            delta_normalized: Vec3::new(0.0, 0.0, -1.0),
            height: 150.0,
            state: DropState::Falling,
            ..AtmosphericParticle::default()
        };
        let mut buffers = PolyBuffers::with_limits(1, 3);
        assert!(!RainModel.render(&drop, &frame, &mut buffers));
    }
}
