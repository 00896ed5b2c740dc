//! # Weather Context
//!
//! Owns every piece of mutable weather state: the RNG stream, the splash
//! particle pool, the effect volumes, and the active full-sky effect. One
//! context per scene; contexts never share state.
//!
//! ## Frame order
//!
//! 1. Cull volumes and spawn their particles
//! 2. Reclaim and integrate pooled particles, then draw them
//! 3. Sample the gust timeline and run the precipitation model

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use squall_shared::constants::{ATMOSPHERIC_DROP_DELAY_MS, MAX_ATMOSPHERIC_EFFECT_SHADERS};

use crate::atmosphere::{
    model_for, AtmosphereStats, AtmosphericParticle, DropFrame, DropState, PrecipitationModel,
};
use crate::effect_spec::EffectSpec;
use crate::error::WeatherResult;
use crate::gust::GustTimeline;
use crate::particles::ParticleSystem;
use crate::render::{PolySink, ShaderHandle, ShaderRegistry};
use crate::settings::{MapOverrides, WeatherSettings};
use crate::view::View;
use crate::volume::{EffectVolume, EffectVolumes, VolumeId};
use crate::world::WorldHeights;

/// Drop count reported while weather is disabled by a bad configuration.
pub const DISABLED_DROPS: i32 = -1;

/// Per-frame inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Frame clock (ms), monotonically non-decreasing.
    pub time: u32,
    /// The viewer.
    pub view: View,
    /// Freeze simulation but keep rendering.
    pub paused: bool,
    /// Density multiplier.
    pub density: f32,
}

impl FrameInput {
    /// Builds frame input with `paused` and `density` from settings.
    #[must_use]
    pub fn from_settings(settings: &WeatherSettings, time: u32, view: View) -> Self {
        Self {
            time,
            view,
            paused: settings.paused,
            density: settings.density,
        }
    }
}

/// The activated full-sky effect.
struct ActiveEffect {
    spec: EffectSpec,
    model: &'static dyn PrecipitationModel,
    drops: Box<[AtmosphericParticle]>,
    shaders: Vec<ShaderHandle>,
    timeline: GustTimeline,
}

/// All weather state for one scene.
pub struct WeatherContext {
    rng: ChaCha8Rng,
    particles: ParticleSystem,
    volumes: EffectVolumes,
    effect: Option<ActiveEffect>,
    num_drops: i32,
    stats: AtmosphereStats,
    last_rain_time: u32,
}

impl WeatherContext {
    /// Creates an idle context seeded from `settings`.
    #[must_use]
    pub fn new(settings: &WeatherSettings) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(settings.seed),
            particles: ParticleSystem::default(),
            volumes: EffectVolumes::new(),
            effect: None,
            num_drops: 0,
            stats: AtmosphereStats::default(),
            last_rain_time: 0,
        }
    }

    /// Replaces the splash particle pool with one of `capacity` slots.
    #[must_use]
    pub fn with_particle_capacity(mut self, capacity: usize) -> Self {
        self.particles = ParticleSystem::new(capacity);
        self
    }

    /// Resolves the splash particle material.
    pub fn init_particles(&mut self, registry: &mut dyn ShaderRegistry) {
        self.particles.register_shader(registry);
    }

    /// Adds an authored effect volume.
    pub fn add_volume(&mut self, volume: EffectVolume) -> VolumeId {
        self.volumes.add(volume)
    }

    /// The effect volumes.
    #[must_use]
    pub fn volumes(&self) -> &EffectVolumes {
        &self.volumes
    }

    /// The splash particle system.
    #[must_use]
    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    /// Parses and activates an effect string. On error weather is disabled
    /// and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`crate::WeatherError::EffectSpec`] when the string is
    /// rejected.
    pub fn activate_str(
        &mut self,
        text: &str,
        now: u32,
        registry: &mut dyn ShaderRegistry,
    ) -> WeatherResult<()> {
        match EffectSpec::parse(text) {
            Ok(spec) => {
                self.activate(spec, now, registry);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("Atmospheric effect '{}' rejected: {}", text, err);
                self.disable();
                Err(err.into())
            }
        }
    }

    /// Activates the effect for `map`: a configured override wins over the
    /// map-authored string. No string at all leaves weather off.
    ///
    /// # Errors
    ///
    /// Returns [`crate::WeatherError::EffectSpec`] when the selected string
    /// is rejected.
    pub fn activate_for_map(
        &mut self,
        overrides: &MapOverrides,
        map: &str,
        authored: Option<&str>,
        now: u32,
        registry: &mut dyn ShaderRegistry,
    ) -> WeatherResult<()> {
        match overrides.select(map, authored) {
            Some(text) => self.activate_str(text, now, registry),
            None => {
                self.effect = None;
                self.num_drops = 0;
                Ok(())
            }
        }
    }

    /// Swaps in a parsed effect.
    ///
    /// Materials are registered until one is missing. Every drop starts
    /// inactive with a staggered cooldown so the first wave does not fall
    /// all at once.
    pub fn activate(&mut self, spec: EffectSpec, now: u32, registry: &mut dyn ShaderRegistry) {
        let num_drops = spec.num_drops();
        let capacity = usize::try_from(num_drops).unwrap_or(0);

        let mut shaders = Vec::with_capacity(MAX_ATMOSPHERIC_EFFECT_SHADERS);
        for index in 0..MAX_ATMOSPHERIC_EFFECT_SHADERS {
            match registry.register_shader(&spec.kind.material_name(index)) {
                Some(handle) => shaders.push(handle),
                None => break,
            }
        }
        if shaders.is_empty() {
            tracing::debug!("No '{}' material registered, effect will not render", spec.kind);
        }

        let drops: Box<[AtmosphericParticle]> = (0..capacity)
            .map(|_| AtmosphericParticle {
                next_drop_time: now
                    .saturating_add(ATMOSPHERIC_DROP_DELAY_MS)
                    .saturating_add(self.rng.gen_range(0..ATMOSPHERIC_DROP_DELAY_MS)),
                ..AtmosphericParticle::default()
            })
            .collect();

        let timeline = GustTimeline::new(spec.timing, spec.extremes, now, &mut self.rng);
        let model = model_for(spec.kind);

        tracing::info!(
            "Atmospheric effect {} activated: {} drops, {} materials",
            model.kind(),
            num_drops,
            shaders.len()
        );

        self.num_drops = num_drops;
        self.stats = AtmosphereStats::default();
        self.last_rain_time = now;
        self.effect = Some(ActiveEffect {
            model,
            spec,
            drops,
            shaders,
            timeline,
        });
    }

    /// Turns weather off.
    pub fn disable(&mut self) {
        self.effect = None;
        self.num_drops = DISABLED_DROPS;
    }

    /// Configured drop count; [`DISABLED_DROPS`] after a rejected string.
    #[must_use]
    pub const fn num_drops(&self) -> i32 {
        self.num_drops
    }

    /// The active effect configuration.
    #[must_use]
    pub fn effect_spec(&self) -> Option<&EffectSpec> {
        self.effect.as_ref().map(|e| &e.spec)
    }

    /// The active gust timeline.
    #[must_use]
    pub fn timeline(&self) -> Option<&GustTimeline> {
        self.effect.as_ref().map(|e| &e.timeline)
    }

    /// The drop array of the active effect.
    #[must_use]
    pub fn drops(&self) -> &[AtmosphericParticle] {
        match &self.effect {
            Some(effect) => &effect.drops,
            None => &[],
        }
    }

    /// Registered materials of the active effect.
    #[must_use]
    pub fn shaders(&self) -> &[ShaderHandle] {
        match &self.effect {
            Some(effect) => &effect.shaders,
            None => &[],
        }
    }

    /// Drop counters of the last frame.
    #[must_use]
    pub const fn stats(&self) -> AtmosphereStats {
        self.stats
    }

    /// Runs one frame of weather and emits its geometry into `sink`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn add_atmospheric_effects(
        &mut self,
        input: &FrameInput,
        world: &dyn WorldHeights,
        sink: &mut dyn PolySink,
    ) {
        let now = input.time;
        let simulate = !input.paused;

        self.volumes
            .process(&input.view, &mut self.particles, &mut self.rng, now, simulate);
        if simulate {
            self.particles.update(now, self.volumes.as_mut_slice());
        }
        self.particles.draw(&input.view, sink);

        let Some(effect) = self.effect.as_mut() else {
            return;
        };
        if self.num_drops <= 0 || effect.shaders.is_empty() || input.density <= 0.0 {
            return;
        }

        let sample = effect.timeline.current(now);
        if sample.wrapped && simulate {
            effect.timeline.regenerate(now, &mut self.rng);
        }

        let target = sample.drops.clamp(0, self.num_drops);
        let max = if input.density < 1.0 {
            (input.density * target as f32) as usize
        } else {
            target as usize
        }
        .min(effect.drops.len());

        self.stats.begin_frame();

        let (active, idle) = effect.drops.split_at_mut(max);
        if simulate {
            // Slots above a shrinking target stop falling instead of going stale.
            for drop in idle.iter_mut() {
                drop.state = DropState::Inactive;
            }
        }

        let frame = DropFrame {
            now,
            moved: if simulate {
                now.saturating_sub(self.last_rain_time) as f32 * 0.001
            } else {
                0.0
            },
            view: &input.view,
            world,
            num_drops: self.num_drops,
            old_drops_active: self.stats.old_drops_active,
            height_offset: effect.spec.height_offset,
            shaders: &effect.shaders,
            paused: !simulate,
        };
        effect.model.update(
            active,
            sample.wind,
            sample.weight,
            &frame,
            &mut self.rng,
            sink,
            &mut self.stats,
        );
        self.last_rain_time = now;

        tracing::trace!(
            "Drops active {} created {} rendered {} skipped {}",
            self.stats.drops_active,
            self.stats.drops_created,
            self.stats.drops_rendered,
            self.stats.drops_skipped
        );
    }
}

impl std::fmt::Debug for WeatherContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherContext")
            .field("num_drops", &self.num_drops)
            .field("effect", &self.effect.as_ref().map(|e| e.spec.kind))
            .field("particles", &self.particles.active_count())
            .field("volumes", &self.volumes.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
