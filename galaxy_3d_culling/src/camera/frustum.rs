/// Frustum: six clipping planes for visibility culling.
///
/// The canonical frustum lives in normalized device coordinates:
/// x and y in [-1, 1], near at z = 0 and far at z = 1 (the depth range of
/// glam's `perspective_rh` / `orthographic_rh`). A camera's world-space
/// frustum is the canonical one carried through `inverse(projection * view)`
/// with the plane transform rule, then normalized so that plane evaluation
/// is a signed distance. The positive side of every plane is inside.

use glam::{Mat4, Vec3};
use crate::geometry::{AABB, Plane};

/// Result of a 3-way frustum/AABB classification.
///
/// - `Outside` → skip the entire subtree
/// - `Inside` → collect the subtree without further plane tests
/// - `Partial` → keep testing children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumTest {
    /// AABB is entirely outside the frustum
    Outside,
    /// AABB is entirely inside the frustum
    Inside,
    /// AABB partially overlaps the frustum
    Partial,
}

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Canonical NDC planes: left, right, bottom, top, near, far
const NDC_PLANES: [Plane; 6] = [
    Plane::new(1.0, 0.0, 0.0, 1.0),   // x >= -1
    Plane::new(-1.0, 0.0, 0.0, 1.0),  // x <= 1
    Plane::new(0.0, 1.0, 0.0, 1.0),   // y >= -1
    Plane::new(0.0, -1.0, 0.0, 1.0),  // y <= 1
    Plane::new(0.0, 0.0, 1.0, 0.0),   // z >= 0
    Plane::new(0.0, 0.0, -1.0, 1.0),  // z <= 1
];

/// Six frustum planes for culling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Frustum planes: left, right, bottom, top, near, far
    pub planes: [Plane; 6],
}

impl Frustum {
    /// The frustum in normalized device coordinates.
    pub fn canonical() -> Self {
        Self { planes: NDC_PLANES }
    }

    /// Build a frustum from explicit planes (positive side inside).
    pub fn from_planes(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Frustum of a combined `projection * view` matrix.
    ///
    /// Each canonical plane is carried from clip space back to world space by
    /// `inverse(view_projection)`. Passing `projection * view * world` yields
    /// the frustum in that instance's local space instead.
    pub fn from_view_projection(view_projection: &Mat4) -> Self {
        let clip_to_world = view_projection.inverse();
        let planes = NDC_PLANES.map(|plane| plane.transformed(&clip_to_world).normalized());
        Self { planes }
    }

    /// World-space frustum of a camera given its view and projection matrices.
    pub fn from_view_and_projection(view: &Mat4, projection: &Mat4) -> Self {
        Self::from_view_projection(&(*projection * *view))
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|plane| plane.signed_distance(point) >= 0.0)
    }

    /// Test if an AABB intersects this frustum.
    ///
    /// The box is culled as soon as one plane rejects it. May return false
    /// positives near frustum corners, never false negatives.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.planes.iter().all(|plane| aabb.intersects_plane(plane))
    }

    /// Classify an AABB against the frustum (3-way test).
    ///
    /// - p-vertex outside any plane → `Outside` (early out)
    /// - n-vertex outside some plane → `Partial`
    /// - otherwise → `Inside`
    pub fn classify_aabb(&self, aabb: &AABB) -> FrustumTest {
        let mut all_inside = true;

        for plane in &self.planes {
            if !aabb.intersects_plane(plane) {
                return FrustumTest::Outside;
            }

            let normal = plane.normal();
            let n_vertex = Vec3::new(
                if normal.x > 0.0 { aabb.min.x } else { aabb.max.x },
                if normal.y > 0.0 { aabb.min.y } else { aabb.max.y },
                if normal.z > 0.0 { aabb.min.z } else { aabb.max.z },
            );

            if plane.signed_distance(n_vertex) < 0.0 {
                all_inside = false;
            }
        }

        if all_inside { FrustumTest::Inside } else { FrustumTest::Partial }
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
