//! # SQUALL Weather
//!
//! Volumetric precipitation for a 3D scene renderer. Thousands of drops or
//! flakes are spawned, moved, culled and meshed every frame under a hard
//! particle ceiling.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    WEATHER FRAME                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Effect Volumes → Cull → Spawn → Particle Pool → Billboards │
//! │       ↓                                     ↓               │
//! │  Gust Timeline → Rain/Snow Model → Drop Array → PolyBuffers │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```
//! use squall_shared::Vec3;
//! use squall_weather::{
//!     FrameInput, PolyBuffers, ShaderTable, UniformHeights, View, WeatherContext,
//!     WeatherSettings,
//! };
//!
//! let settings = WeatherSettings::default();
//! let mut materials = ShaderTable::with_names(["gfx/misc/raindrop"]);
//! let mut weather = WeatherContext::new(&settings);
//! weather.activate_str("T=RAIN,D=500", 0, &mut materials).unwrap();
//!
//! let world = UniformHeights::open(0.0, 1024.0);
//! let view = View::looking(Vec3::new(0.0, 0.0, 64.0), Vec3::X, 90.0, 90.0);
//! let mut buffers = PolyBuffers::new();
//! for frame in 0..120 {
//!     buffers.clear();
//!     let input = FrameInput::from_settings(&settings, frame * 16, view);
//!     weather.add_atmospheric_effects(&input, &world, &mut buffers);
//! }
//! ```
//!
//! ## Rules
//!
//! - One call per frame, single-threaded
//! - Nothing allocates or fails once an effect is active
//! - Same clock and seed, same frame

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod atmosphere;
pub mod context;
pub mod culling;
pub mod effect_spec;
pub mod error;
pub mod gust;
pub mod particles;
pub mod render;
pub mod settings;
pub mod view;
pub mod volume;
pub mod world;

pub use atmosphere::{AtmosphereStats, AtmosphericParticle, DropState, PrecipitationModel};
pub use context::{FrameInput, WeatherContext, DISABLED_DROPS};
pub use culling::{Aabb, Frustum};
pub use effect_spec::{EffectSpec, PrecipitationKind};
pub use error::{EffectSpecError, WeatherError, WeatherResult};
pub use gust::{GustSample, GustTimeline, GustTiming};
pub use particles::{Particle, ParticleKind, ParticleSystem};
pub use render::{PolyBuffers, PolySink, PolyVert, ShaderHandle, ShaderRegistry, ShaderTable};
pub use settings::{MapOverrides, WeatherSettings};
pub use view::View;
pub use volume::{EffectVolume, EffectVolumes, VolumeId, VolumeKind};
pub use world::{UniformHeights, WorldHeights};
