/// Camera: the view/projection pair supplied once per frame.
///
/// The Camera is a passive container: the caller (renderer or game code)
/// computes and sets the matrices. The culling code only derives the
/// world-space frustum from them.
///
/// `PerspectiveCamera` is a small helper for callers that think in terms of
/// eye position, target and field of view.

use glam::{Mat4, Vec3};
use super::frustum::Frustum;

/// Low-level camera. Stores view and projection, computes nothing else.
#[derive(Debug, Clone)]
pub struct Camera {
    view_matrix: Mat4,
    projection_matrix: Mat4,
}

impl Camera {
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self {
            view_matrix: view,
            projection_matrix: projection,
        }
    }

    // ===== GETTERS =====

    /// View matrix (inverse of the camera's world transform).
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// Projection matrix (perspective or orthographic, depth in [0, 1]).
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// World-space frustum of this camera.
    pub fn world_frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection_matrix())
    }

    // ===== SETTERS =====

    pub fn set_view(&mut self, matrix: Mat4) {
        self.view_matrix = matrix;
    }

    pub fn set_projection(&mut self, matrix: Mat4) {
        self.projection_matrix = matrix;
    }
}

/// Perspective camera described by eye, target and lens parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -5.0),
            look_at: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: std::f32::consts::FRAC_PI_4,
            aspect_ratio: 8.0 / 6.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl PerspectiveCamera {
    /// Right-handed view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_at, self.up)
    }

    /// Right-handed perspective projection with depth in [0, 1].
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.near, self.far)
    }

    /// Snapshot as a passive `Camera`.
    pub fn to_camera(&self) -> Camera {
        Camera::new(self.view_matrix(), self.projection_matrix())
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
