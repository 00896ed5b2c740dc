//! The splash particle system: pool, integration and billboards.

use squall_core::{IntrusivePool, PoolHandle};
use squall_shared::constants::MAX_PARTICLES;

use super::{Particle, ParticleKind, ParticleType};
use crate::render::{unit_to_byte, PolySink, PolyVert, ShaderHandle, ShaderRegistry};
use crate::view::View;
use crate::volume::EffectVolume;

/// Atlas material shared by every pooled particle.
pub const PARTICLE_SHADER: &str = "gfx/misc/particles";

/// Fixed-capacity pool of splash particles plus their render state.
#[derive(Debug)]
pub struct ParticleSystem {
    pool: IntrusivePool<Particle>,
    types: [ParticleType; ParticleKind::COUNT],
    shader: Option<ShaderHandle>,
}

impl ParticleSystem {
    /// Creates a system whose pool holds `capacity` particles.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            pool: IntrusivePool::new(capacity),
            types: ParticleType::table(),
            shader: None,
        }
    }

    /// Resolves the atlas material. Without it nothing is drawn.
    pub fn register_shader(&mut self, registry: &mut dyn ShaderRegistry) {
        self.shader = registry.register_shader(PARTICLE_SHADER);
        if self.shader.is_none() {
            tracing::debug!("Particle material '{}' not found", PARTICLE_SHADER);
        }
    }

    /// The underlying pool.
    #[must_use]
    pub fn pool(&self) -> &IntrusivePool<Particle> {
        &self.pool
    }

    /// Number of live particles.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.pool.allocated_count()
    }

    /// True when no slot is free.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.pool.is_full()
    }

    /// Spawns a particle, or returns `None` when the pool is exhausted.
    pub fn spawn(&mut self, particle: Particle) -> Option<PoolHandle> {
        self.pool.allocate(particle)
    }

    /// Reclaims dead particles and integrates the survivors up to `now`.
    ///
    /// A particle with no expiry dies when its alpha reaches zero; one with
    /// an expiry dies once `now` reaches it. Either way its owning volume
    /// gives back one slot of its budget.
    pub fn update(&mut self, now: u32, volumes: &mut [EffectVolume]) {
        self.pool.retain(|_, p| {
            let t = now.saturating_sub(p.time) as f32 * 0.001;
            let alpha = p.alpha + t * p.alpha_vel;

            let faded = alpha <= 0.0 && p.die_time.is_none();
            let expired = p.die_time.is_some_and(|die| die <= now);
            if faded || expired {
                if let Some(volume) = p.volume.and_then(|id| volumes.get_mut(id.index())) {
                    volume.num_active = volume.num_active.saturating_sub(1);
                }
                return false;
            }

            p.org = p.org + p.vel * t + p.accel * (t * t * 0.5);
            p.alpha = alpha.min(1.0);
            p.scale += p.scale_vel * t;
            p.time = now;
            true
        });
    }

    /// Emits one billboard triangle per live particle. Returns the number
    /// of triangles accepted by the sink.
    pub fn draw(&self, view: &View, sink: &mut dyn PolySink) -> usize {
        let Some(shader) = self.shader else {
            return 0;
        };

        let mut emitted = 0;
        for (_, p) in self.pool.iter() {
            let ty = &self.types[p.kind.index()];
            let depth = (p.org - view.origin).dot(view.forward());
            let distance_size = distance_scale(depth);

            let (up, right, alpha) = if p.kind.is_streak() {
                // Streak: span the velocity against the view direction.
                let view_normal = view.forward() * 5.0;
                let right = view_normal.cross(p.vel);
                let len = right.length();
                if len < 1.001 {
                    continue;
                }
                let right = right * (-0.8 / len) * (0.8 * ty.scale);
                let up = p.vel.normalized() * 20.0 * (0.8 * ty.scale);
                (up, right, p.alpha / distance_size)
            } else {
                (view.up() * ty.scale, view.left() * ty.scale, p.alpha)
            };

            // The depth factor goes through the growth rule a second time,
            // so only very distant billboards grow.
            let size = if p.scale > 1.0 {
                p.scale
            } else {
                distance_scale(distance_size)
            };
            let org = p.org - (up + right) * (size * 0.33);
            let color = [
                unit_to_byte(p.color.x),
                unit_to_byte(p.color.y),
                unit_to_byte(p.color.z),
                unit_to_byte(alpha),
            ];

            let verts = [
                PolyVert::new(org, [ty.s1, ty.t1], color),
                PolyVert::new(org.mul_add(size, up), [ty.s2, ty.t1], color),
                PolyVert::new(org.mul_add(size, right), [ty.s1, ty.t2], color),
            ];
            if sink.add_triangle(shader, &verts) {
                emitted += 1;
            }
        }
        emitted
    }
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new(MAX_PARTICLES)
    }
}

/// Billboard growth with view depth: flat up to 20 units, then linear.
fn distance_scale(depth: f32) -> f32 {
    if depth < 20.0 {
        1.0
    } else {
        1.0 + depth * 0.004
    }
}
