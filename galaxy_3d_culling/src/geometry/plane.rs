/// Plane: `a·x + b·y + c·z + d = 0`.
///
/// Evaluating a point gives its signed distance (exact once the plane is
/// normalized). The positive side is the inside half-space.

use glam::{Mat4, Vec3, Vec4};

/// A plane stored as its 4 coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
}

impl Plane {
    pub const fn new(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self { a, b, c, d }
    }

    pub fn from_vec4(v: Vec4) -> Self {
        Self::new(v.x, v.y, v.z, v.w)
    }

    pub fn to_vec4(&self) -> Vec4 {
        Vec4::new(self.a, self.b, self.c, self.d)
    }

    /// (a, b, c), not necessarily unit length.
    pub fn normal(&self) -> Vec3 {
        Vec3::new(self.a, self.b, self.c)
    }

    /// Evaluate the plane equation at a point.
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal().dot(point) + self.d
    }

    /// Scale so that the normal is unit length. A zero normal is left as is.
    pub fn normalized(&self) -> Plane {
        let len = self.normal().length();
        if len > 0.0 {
            Plane::from_vec4(self.to_vec4() / len)
        } else {
            *self
        }
    }

    /// Carry this plane through a point transform.
    ///
    /// If `matrix` maps points from space A to space B and this plane lives
    /// in A, the result lives in B: `transpose(inverse(matrix)) · (a, b, c, d)`.
    /// The inverse transpose is what keeps the normal perpendicular under
    /// non-uniform scale and projection.
    pub fn transformed(&self, matrix: &Mat4) -> Plane {
        Plane::from_vec4(matrix.inverse().transpose() * self.to_vec4())
    }
}

#[cfg(test)]
#[path = "plane_tests.rs"]
mod tests;
