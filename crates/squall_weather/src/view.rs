//! The viewer for one frame: origin, basis and frustum.

use squall_shared::Vec3;

use crate::culling::Frustum;

/// Default horizontal and vertical field of view, in degrees.
pub const DEFAULT_FOV: f32 = 90.0;

/// Viewer state consumed by culling and billboarding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    /// Eye position.
    pub origin: Vec3,
    /// Orthonormal basis: forward, left, up.
    pub axis: [Vec3; 3],
    /// Side planes built from the above.
    pub frustum: Frustum,
}

impl View {
    /// Creates a view from an explicit basis.
    #[must_use]
    pub fn new(origin: Vec3, axis: [Vec3; 3], fov_x: f32, fov_y: f32) -> Self {
        Self {
            origin,
            axis,
            frustum: Frustum::from_view(origin, &axis, fov_x, fov_y),
        }
    }

    /// Creates a view looking along `forward`, with Z as world up.
    ///
    /// A `forward` parallel to Z falls back to X as the left reference so
    /// the basis never degenerates.
    #[must_use]
    pub fn looking(origin: Vec3, forward: Vec3, fov_x: f32, fov_y: f32) -> Self {
        let forward = forward.normalized();
        let mut left = Vec3::Z.cross(forward);
        if left.length_squared() < 1e-6 {
            left = forward.cross(Vec3::X);
        }
        let left = left.normalized();
        let up = forward.cross(left);
        Self::new(origin, [forward, left, up], fov_x, fov_y)
    }

    /// Forward axis.
    #[inline]
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.axis[0]
    }

    /// Left axis.
    #[inline]
    #[must_use]
    pub fn left(&self) -> Vec3 {
        self.axis[1]
    }

    /// Up axis.
    #[inline]
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.axis[2]
    }
}
