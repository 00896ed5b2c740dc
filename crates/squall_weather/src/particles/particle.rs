//! The pooled particle record and its visual types.

use squall_shared::Vec3;

use crate::volume::VolumeId;

/// Visual type of a pooled particle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    /// Falling streak.
    #[default]
    Rain,
    /// Floor splash, first variant.
    Splash1,
    /// Floor splash, second variant.
    Splash2,
    /// Floor splash, third variant.
    Splash3,
}

impl ParticleKind {
    /// Number of kinds.
    pub const COUNT: usize = 4;

    /// The three splash variants.
    pub const SPLASHES: [Self; 3] = [Self::Splash1, Self::Splash2, Self::Splash3];

    /// Index into the type table.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Rain => 0,
            Self::Splash1 => 1,
            Self::Splash2 => 2,
            Self::Splash3 => 3,
        }
    }

    /// True for the streak kind.
    #[must_use]
    pub const fn is_streak(self) -> bool {
        matches!(self, Self::Rain)
    }
}

/// Atlas rectangle and base size of a particle kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleType {
    /// Left texture coordinate.
    pub s1: f32,
    /// Top texture coordinate.
    pub t1: f32,
    /// Right texture coordinate.
    pub s2: f32,
    /// Bottom texture coordinate.
    pub t2: f32,
    /// Base billboard size.
    pub scale: f32,
}

impl ParticleType {
    /// Atlas width in texels.
    pub const ATLAS_WIDTH: f32 = 256.0;
    /// Atlas height in texels.
    pub const ATLAS_HEIGHT: f32 = 128.0;

    /// Builds a type from a texel rectangle, sampling at texel centers.
    #[must_use]
    pub fn from_texels(s1: u16, t1: u16, s2: u16, t2: u16, scale: f32) -> Self {
        let (w, h) = (Self::ATLAS_WIDTH, Self::ATLAS_HEIGHT);
        let (hw, hh) = (1.0 / (w * 2.0), 1.0 / (h * 2.0));
        Self {
            s1: f32::from(s1) / w + hw,
            t1: f32::from(t1) / h + hh,
            s2: f32::from(s2) / w + hw,
            t2: f32::from(t2) / h + hh,
            scale,
        }
    }

    /// The table for every [`ParticleKind`], by index.
    #[must_use]
    pub fn table() -> [Self; ParticleKind::COUNT] {
        [
            Self::from_texels(225, 32, 255, 63, 2.0),
            Self::from_texels(96, 64, 127, 91, 4.0),
            Self::from_texels(128, 64, 159, 91, 4.0),
            Self::from_texels(160, 64, 191, 91, 4.0),
        ]
    }
}

/// A pooled particle.
///
/// `Default` is the released state: no owner, no expiry, fully transparent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Particle {
    /// Volume that owns this particle, if any.
    pub volume: Option<VolumeId>,
    /// Time (ms) of the last integration step.
    pub time: u32,
    /// Position.
    pub org: Vec3,
    /// Velocity, units per second.
    pub vel: Vec3,
    /// Acceleration, units per second squared.
    pub accel: Vec3,
    /// RGB color, each in `[0, 1]`.
    pub color: Vec3,
    /// Opacity.
    pub alpha: f32,
    /// Opacity change per second.
    pub alpha_vel: f32,
    /// Visual type.
    pub kind: ParticleKind,
    /// Absolute expiry time (ms). `None` means the particle dies by fading.
    pub die_time: Option<u32>,
    /// Size multiplier. Values above 1 override distance scaling.
    pub scale: f32,
    /// Size change per second.
    pub scale_vel: f32,
}

impl Particle {
    /// A white particle at `org` that fades out over four seconds.
    #[must_use]
    pub fn white(org: Vec3, now: u32) -> Self {
        Self {
            time: now,
            org,
            color: Vec3::new(1.0, 1.0, 1.0),
            alpha: 0.4,
            alpha_vel: -0.1,
            ..Self::default()
        }
    }
}
