//! Geometry primitives: bounding boxes and planes.

mod aabb;
mod plane;

pub use aabb::AABB;
pub use plane::Plane;
