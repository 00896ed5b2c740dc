//! Frustum culling for view-dependent rendering.
//!
//! The frustum has four side planes and no near/far planes: precipitation
//! is bounded by its own visibility radius.

use squall_shared::Vec3;

/// A plane in 3D space (Ax + By + Cz + D = 0).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Plane {
    /// Normal X component.
    pub a: f32,
    /// Normal Y component.
    pub b: f32,
    /// Normal Z component.
    pub c: f32,
    /// Distance from origin.
    pub d: f32,
}

impl Plane {
    /// Creates a new plane.
    #[must_use]
    pub const fn new(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self { a, b, c, d }
    }

    /// Creates the plane with the given normal passing through `point`.
    #[must_use]
    pub fn through(normal: Vec3, point: Vec3) -> Self {
        Self::new(normal.x, normal.y, normal.z, -normal.dot(point))
    }

    /// Returns the signed distance from a point to the plane.
    #[inline]
    #[must_use]
    pub fn distance_to_point(&self, p: Vec3) -> f32 {
        self.a * p.x + self.b * p.y + self.c * p.z + self.d
    }
}

/// View frustum for culling.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frustum {
    /// Left, right, bottom, top planes. Normals point inwards.
    pub planes: [Plane; 4],
}

impl Frustum {
    /// Plane indices.
    pub const LEFT: usize = 0;
    /// Right plane index.
    pub const RIGHT: usize = 1;
    /// Bottom plane index.
    pub const BOTTOM: usize = 2;
    /// Top plane index.
    pub const TOP: usize = 3;

    /// Builds the side planes from a view origin, its basis
    /// (forward, left, up) and the field of view in degrees.
    #[must_use]
    pub fn from_view(origin: Vec3, axis: &[Vec3; 3], fov_x: f32, fov_y: f32) -> Self {
        let (xs, xc) = (fov_x.to_radians() * 0.5).sin_cos();
        let (ys, yc) = (fov_y.to_radians() * 0.5).sin_cos();
        let [forward, left, up] = *axis;

        let mut planes = [Plane::default(); 4];
        planes[Self::LEFT] = Plane::through(forward * xs - left * xc, origin);
        planes[Self::RIGHT] = Plane::through(forward * xs + left * xc, origin);
        planes[Self::BOTTOM] = Plane::through(forward * ys + up * yc, origin);
        planes[Self::TOP] = Plane::through(forward * ys - up * yc, origin);

        Self { planes }
    }

    /// Returns true if the point lies outside any plane.
    #[must_use]
    pub fn cull_point(&self, p: Vec3) -> bool {
        self.planes.iter().any(|plane| plane.distance_to_point(p) < 0.0)
    }

    /// Tests if an AABB is visible (intersects the frustum).
    #[must_use]
    pub fn test_aabb(&self, aabb: &Aabb) -> bool {
        let center = aabb.center();
        let half = aabb.half_extents();

        for plane in &self.planes {
            // Projection interval radius
            let r = half.x * plane.a.abs() + half.y * plane.b.abs() + half.z * plane.c.abs();
            if plane.distance_to_point(center) < -r {
                return false;
            }
        }

        true
    }
}

/// Axis-aligned bounding box for culling.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Creates a new AABB.
    #[must_use]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Returns the center of the AABB.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the half-extents of the AABB.
    #[must_use]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }
}
