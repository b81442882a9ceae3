/// Per-instance records.
///
/// `InstanceData` is the GPU-facing record: it is copied as raw bytes into
/// the instance buffer for the visible instances, in culling order.
/// `InstanceSceneInfo` is the CPU-side spatial record the culling works on.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use crate::geometry::AABB;
use crate::octree::ObjectKey;

/// GPU instance record (std430-compatible layout, 144 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    pub world: Mat4,
    pub inv_world: Mat4,
    pub albedo: Vec4,
}

impl InstanceData {
    /// Build a record from a world matrix, deriving its inverse.
    pub fn new(world: Mat4, albedo: Vec4) -> Self {
        Self {
            world,
            inv_world: world.inverse(),
            albedo,
        }
    }
}

impl Default for InstanceData {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Vec4::ONE)
    }
}

/// Spatial state of one instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceSceneInfo {
    /// Translation part of the world matrix
    pub world_position: Vec3,
    /// Bounds in model space
    pub local_aabb: AABB,
    /// `local_aabb` carried through the world matrix
    pub world_aabb: AABB,
    /// Position in the scene's instance buffer (permanent)
    pub instance_index: u32,
    /// Handle in the scene octree, if the instance is indexed
    pub object: Option<ObjectKey>,
}

impl InstanceSceneInfo {
    pub fn new(instance_index: u32) -> Self {
        Self {
            world_position: Vec3::ZERO,
            local_aabb: AABB::UNIT_CUBE,
            world_aabb: AABB::UNIT_CUBE,
            instance_index,
            object: None,
        }
    }

    /// Store a new transform. Returns true if the world AABB changed.
    pub fn set_transform(&mut self, world: &Mat4, local_aabb: AABB) -> bool {
        let world_aabb = local_aabb.transformed(world);
        let changed = world_aabb != self.world_aabb;
        self.world_position = world.w_axis.truncate();
        self.local_aabb = local_aabb;
        self.world_aabb = world_aabb;
        changed
    }
}

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;
