//! View culling for precipitation.
//!
//! Builds side planes from the viewer's basis and tests points (drops) and
//! boxes (effect volumes) against them.

mod frustum;

pub use frustum::{Aabb, Frustum, Plane};
