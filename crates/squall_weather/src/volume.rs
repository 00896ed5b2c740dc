//! # Effect Volumes
//!
//! Authored boxes that rain inside themselves. Each frame a volume is culled
//! against the viewer, its particle budget is recomputed from footprint and
//! distance, and new particles are spawned into the shared pool.

use rand::Rng;
use squall_shared::constants::{
    EFFECT_CLIP_DISTANCE, EFFECT_HALF_CLIP_DISTANCE, EFFECT_RAIN_SPEED, EFFECT_SPAWN_MARGIN,
    SPLASH_LIFETIME_MS,
};
use squall_shared::Vec3;

use crate::culling::Aabb;
use crate::particles::{Particle, ParticleKind, ParticleSystem};
use crate::view::View;

/// Index of a volume in its manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VolumeId(u32);

impl VolumeId {
    /// Wraps a manager index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The manager index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a volume looks like, which sets how far away it stays alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeKind {
    /// Dense falling streaks; clipped at half distance.
    Streak,
    /// Sparse splashes; clipped at full distance.
    Splash,
}

/// An authored axis-aligned particle source.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectVolume {
    /// Minimum corner.
    pub mins: Vec3,
    /// Maximum corner.
    pub maxs: Vec3,
    /// Footprint corners, flattened to `z = 0`.
    pub corners: [Vec3; 4],
    /// Visual kind.
    pub kind: VolumeKind,
    /// Cached distance from the viewer to the nearest in-range corner.
    pub dist: f32,
    /// Particle budget for this frame. A volume that moves from near to far
    /// can sit above a shrunken budget until its particles expire; it just
    /// stops spawning meanwhile.
    pub max_active: u32,
    /// Particles currently owned.
    pub num_active: u32,
    /// Whether the box intersects the view frustum.
    pub visible: bool,
}

impl EffectVolume {
    /// Creates a volume and precomputes its corners.
    #[must_use]
    pub fn new(mins: Vec3, maxs: Vec3, kind: VolumeKind) -> Self {
        let corners = [
            Vec3::new(mins.x, mins.y, 0.0),
            Vec3::new(maxs.x, mins.y, 0.0),
            Vec3::new(mins.x, maxs.y, 0.0),
            Vec3::new(maxs.x, maxs.y, 0.0),
        ];
        Self {
            mins,
            maxs,
            corners,
            kind,
            dist: 0.0,
            max_active: 0,
            num_active: 0,
            visible: false,
        }
    }

    /// Clip distance for this kind.
    #[must_use]
    pub const fn clip_distance(&self) -> f32 {
        match self.kind {
            VolumeKind::Streak => EFFECT_HALF_CLIP_DISTANCE,
            VolumeKind::Splash => EFFECT_CLIP_DISTANCE,
        }
    }

    /// The box for frustum tests.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.mins, self.maxs)
    }

    /// Integer width, depth and height.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn extents(&self) -> (i32, i32, i32) {
        let size = self.maxs - self.mins;
        (size.x as i32, size.y as i32, size.z as i32)
    }

    /// Culls the volume against the viewer. Returns true when culled.
    ///
    /// The view origin is flattened to `z = 0` like the corners. A corner
    /// keeps the volume alive if it is in front of the viewer and within
    /// the clip distance. Streak volumes keep the closest such corner as
    /// their distance; splash volumes take the first one found.
    pub fn cull(&mut self, view: &View) -> bool {
        let forward = view.forward();
        let origin = Vec3::new(view.origin.x, view.origin.y, 0.0);
        let clip = self.clip_distance();
        let mut min_distance = clip;

        for corner in self.corners {
            let to_corner = corner - origin;
            if forward.dot(to_corner) < 0.0 {
                continue;
            }
            let distance = to_corner.length();
            if distance >= clip {
                continue;
            }
            match self.kind {
                VolumeKind::Splash => {
                    self.dist = distance;
                    return false;
                }
                VolumeKind::Streak => min_distance = min_distance.min(distance),
            }
        }

        if min_distance < clip {
            self.dist = min_distance;
            return false;
        }
        true
    }

    /// Recomputes the particle budget: 1% of the footprint when the volume
    /// is inside half the clip distance, 0.5% beyond it.
    pub fn update_max_active(&mut self) {
        let (width, depth, _) = self.extents();
        let area = i64::from(width.max(0)) * i64::from(depth.max(0));
        let budget = if self.dist < EFFECT_HALF_CLIP_DISTANCE {
            area / 100
        } else {
            area / 200
        };
        self.max_active = u32::try_from(budget).unwrap_or(u32::MAX);
    }

    /// True when the volume is near enough for full density.
    #[must_use]
    pub fn is_near(&self) -> bool {
        self.dist < EFFECT_HALF_CLIP_DISTANCE
    }
}

/// Offset and span of the spawn range along one extent, inset from both
/// walls when the extent allows it.
fn inset(extent: i32) -> (i32, i32) {
    if extent > 2 * EFFECT_SPAWN_MARGIN {
        (EFFECT_SPAWN_MARGIN, extent - 2 * EFFECT_SPAWN_MARGIN)
    } else {
        (0, extent)
    }
}

/// Spawns this frame's particles for one volume. Returns how many were
/// spawned.
///
/// Streak particles fall at constant speed and expire exactly when they
/// reach the floor. Splash sprites sit on the floor for a fixed lifetime.
/// Pool exhaustion ends the pass early.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn generate<R: Rng + ?Sized>(
    volume: &mut EffectVolume,
    id: VolumeId,
    particles: &mut ParticleSystem,
    rng: &mut R,
    now: u32,
) -> usize {
    let (width, depth, height) = volume.extents();
    if width <= 0 || depth <= 0 || height <= 0 {
        return 0;
    }

    volume.update_max_active();
    if volume.num_active >= volume.max_active {
        return 0;
    }

    let quarter = volume.max_active >> 2;
    let mut count = if volume.num_active < quarter { quarter } else { 1 };
    count = count.min(volume.max_active - volume.num_active);

    let (x_off, x_span) = inset(width);
    let (y_off, y_span) = inset(depth);
    let (z_off, z_span) = inset(height);
    let velocity = Vec3::new(0.0, 0.0, -EFFECT_RAIN_SPEED);
    let mut spawned = 0;

    for _ in 0..count {
        let org = Vec3::new(
            volume.mins.x + (x_off + rng.gen_range(0..x_span)) as f32,
            volume.mins.y + (y_off + rng.gen_range(0..y_span)) as f32,
            volume.mins.z + (z_off + rng.gen_range(0..z_span)) as f32,
        );
        let fall_height = org.z - volume.mins.z;
        let lifetime_ms = (fall_height / -velocity.z * 1000.0).round() as u32;

        let particle = Particle {
            volume: Some(id),
            vel: velocity,
            die_time: Some(now.saturating_add(lifetime_ms)),
            ..Particle::white(org, now)
        };
        if particles.spawn(particle).is_none() {
            return spawned;
        }
        volume.num_active += 1;
        spawned += 1;
    }

    // Floor splashes, denser when near.
    let area = i64::from(width) * i64::from(depth);
    let splashes = if volume.is_near() { area >> 13 } else { area >> 14 };
    for _ in 0..splashes {
        let org = Vec3::new(
            volume.mins.x + rng.gen_range(0..width) as f32,
            volume.mins.y + rng.gen_range(0..depth) as f32,
            volume.mins.z,
        );
        let kind = ParticleKind::SPLASHES[rng.gen_range(0..ParticleKind::SPLASHES.len())];
        let particle = Particle {
            kind,
            die_time: Some(now.saturating_add(SPLASH_LIFETIME_MS)),
            scale: 1.0,
            ..Particle::white(org, now)
        };
        if particles.spawn(particle).is_none() {
            return spawned;
        }
        spawned += 1;
    }

    spawned
}

/// All volumes authored in the map.
#[derive(Debug, Clone, Default)]
pub struct EffectVolumes {
    volumes: Vec<EffectVolume>,
}

impl EffectVolumes {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a volume and returns its id.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` volumes are added.
    pub fn add(&mut self, volume: EffectVolume) -> VolumeId {
        let id = VolumeId::new(u32::try_from(self.volumes.len()).expect("too many effect volumes"));
        self.volumes.push(volume);
        id
    }

    /// Number of volumes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    /// True if no volume is authored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// Looks up a volume.
    #[must_use]
    pub fn get(&self, id: VolumeId) -> Option<&EffectVolume> {
        self.volumes.get(id.index())
    }

    /// All volumes, mutably, for particle reclamation.
    pub fn as_mut_slice(&mut self) -> &mut [EffectVolume] {
        &mut self.volumes
    }

    /// Culls every volume, spawns for the visible ones, and refreshes each
    /// volume's frustum visibility. Returns the number of particles
    /// spawned. `spawn` false culls without spawning.
    pub fn process<R: Rng + ?Sized>(
        &mut self,
        view: &View,
        particles: &mut ParticleSystem,
        rng: &mut R,
        now: u32,
        spawn: bool,
    ) -> usize {
        let mut spawned = 0;
        for (index, volume) in self.volumes.iter_mut().enumerate() {
            if volume.cull(view) {
                volume.visible = false;
                continue;
            }
            if spawn {
                // Index fits: `add` refuses more than u32::MAX volumes.
                let id = VolumeId::new(index as u32);
                spawned += generate(volume, id, particles, rng, now);
            }
            volume.visible = view.frustum.test_aabb(&volume.bounds());
        }
        spawned
    }
}
