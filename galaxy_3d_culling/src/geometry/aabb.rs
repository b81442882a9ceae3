/// Axis-aligned bounding box.
///
/// Used for instance bounds (local and world space) and for octree node
/// volumes. A box is valid when its corners are finite and `min <= max`
/// on every axis; invalid boxes are rejected before they reach the octree.

use glam::{Mat4, Vec3};
use super::plane::Plane;

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl AABB {
    /// Unit cube centered on the origin, the default local bounds of an instance.
    pub const UNIT_CUBE: AABB = AABB {
        min: Vec3::new(-0.5, -0.5, -0.5),
        max: Vec3::new(0.5, 0.5, 0.5),
    };

    /// Create a box from its corners (not validated, see `is_valid`).
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a box from a center point and half extents.
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Finite corners and `min <= max` componentwise.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn half_extents(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// Largest edge length.
    pub fn max_extent(&self) -> f32 {
        self.size().max_element()
    }

    /// Test if a point lies inside or on the boundary of this box.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.min.cmple(point).all() && point.cmple(self.max).all()
    }

    /// Test if this box fully contains another box.
    ///
    /// Boundaries are inclusive, so every valid box contains itself. Used
    /// by the octree to decide whether an object can be pushed into a child.
    pub fn contains(&self, other: &AABB) -> bool {
        self.min.cmple(other.min).all() && other.max.cmple(self.max).all()
    }

    /// Test if this box overlaps or touches another box.
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// Test this box against the inside half-space of a plane.
    ///
    /// Only the positive vertex (the corner furthest along the plane normal)
    /// is evaluated: if that corner is behind the plane, so is the whole box.
    /// A box touching the plane counts as intersecting.
    pub fn intersects_plane(&self, plane: &Plane) -> bool {
        let normal = plane.normal();
        let p_vertex = Vec3::new(
            if normal.x > 0.0 { self.max.x } else { self.min.x },
            if normal.y > 0.0 { self.max.y } else { self.min.y },
            if normal.z > 0.0 { self.max.z } else { self.min.z },
        );
        plane.signed_distance(p_vertex) >= 0.0
    }

    /// The 8 corners, x varying fastest, then y, then z.
    pub fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        })
    }

    /// Transform this box by a matrix, returning the box around the result.
    ///
    /// All 8 corners are transformed and the componentwise min/max taken.
    /// Under rotation the result is larger than the rotated volume but always
    /// contains it.
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        let corners = self.corners();
        let first = matrix.transform_point3(corners[0]);
        let (min, max) = corners[1..]
            .iter()
            .map(|corner| matrix.transform_point3(*corner))
            .fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        AABB { min, max }
    }

    /// Scale this box uniformly about its center.
    pub fn loosened(&self, factor: f32) -> AABB {
        AABB::from_center_half_extents(self.center(), self.half_extents() * factor)
    }
}

impl Default for AABB {
    fn default() -> Self {
        AABB::UNIT_CUBE
    }
}

#[cfg(test)]
#[path = "aabb_tests.rs"]
mod tests;
