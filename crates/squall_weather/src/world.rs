//! Static world geometry queries consumed by the simulation.

use squall_shared::Vec3;

/// Ground and sky-opening heights of the world.
///
/// Only `x` and `y` of the query point are significant.
pub trait WorldHeights {
    /// Height of the ground under `point`.
    fn ground_height_at(&self, point: Vec3) -> f32;

    /// Height of the sky opening above `point`, or `None` when the column
    /// has no open sky.
    fn sky_height_at(&self, point: Vec3) -> Option<f32>;
}

/// A flat world with one ground height and one sky height everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformHeights {
    /// Ground height.
    pub ground: f32,
    /// Sky height, `None` for an enclosed world.
    pub sky: Option<f32>,
}

impl UniformHeights {
    /// Creates a flat open-sky world.
    #[must_use]
    pub const fn open(ground: f32, sky: f32) -> Self {
        Self {
            ground,
            sky: Some(sky),
        }
    }

    /// Creates a world with no open sky anywhere.
    #[must_use]
    pub const fn enclosed(ground: f32) -> Self {
        Self { ground, sky: None }
    }
}

impl WorldHeights for UniformHeights {
    fn ground_height_at(&self, _point: Vec3) -> f32 {
        self.ground
    }

    fn sky_height_at(&self, _point: Vec3) -> Option<f32> {
        self.sky
    }
}
