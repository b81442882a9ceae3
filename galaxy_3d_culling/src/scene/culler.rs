/// Culling strategies of an `InstanceScene`.
///
/// Culling runs in two stages:
/// 1. acceleration (`CullingAcceleration`): produce candidate instances,
///    either all of them or the conservative output of the octree
/// 2. refinement (`FrustumCullingSpace`): optionally test each candidate's
///    bounds against the frustum, dropping the false positives of stage 1

use std::time::Duration;
use crate::camera::{Camera, Frustum};
use super::instance::{InstanceData, InstanceSceneInfo};

/// Candidate selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullingAcceleration {
    /// Every instance is a candidate
    #[default]
    None,
    /// Octree built on first use and never repaired
    StaticOctree,
    /// Octree built on first use and repaired for moved instances every frame
    DynamicOctree,
}

impl CullingAcceleration {
    pub fn uses_octree(self) -> bool {
        !matches!(self, CullingAcceleration::None)
    }
}

/// Per-instance refinement of the candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrustumCullingSpace {
    /// Keep every candidate
    None,
    /// Frustum carried into each instance's model space, tested against its local AABB
    Local,
    /// World AABB tested against the world frustum
    #[default]
    World,
}

/// What one culling pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CullingStats {
    /// Octree build or repair
    pub index_time: Duration,
    /// Octree traversal and refinement
    pub cull_time: Duration,
    /// Instances left after the acceleration stage
    pub candidate_count: usize,
    /// Instances left after refinement
    pub visible_count: usize,
    /// Objects that changed octree node during repair
    pub relocated_count: usize,
}

/// Keep the candidates whose world AABB intersects the frustum.
pub fn refine_world(frustum: &Frustum, scene_info: &[InstanceSceneInfo], candidates: &mut Vec<u32>) {
    candidates.retain(|&index| {
        scene_info
            .get(index as usize)
            .is_some_and(|info| frustum.intersects_aabb(&info.world_aabb))
    });
}

/// Keep the candidates whose local AABB intersects the frustum expressed in
/// their own model space (`inverse(projection · view · world)`).
///
/// Tighter than `refine_world` for rotated instances: the box is not
/// re-boxed by the world transform.
pub fn refine_local(
    camera: &Camera,
    instances: &[InstanceData],
    scene_info: &[InstanceSceneInfo],
    candidates: &mut Vec<u32>,
) {
    let view_projection = camera.view_projection_matrix();
    candidates.retain(|&index| {
        match (instances.get(index as usize), scene_info.get(index as usize)) {
            (Some(instance), Some(info)) => {
                let local_frustum = Frustum::from_view_projection(&(view_projection * instance.world));
                local_frustum.intersects_aabb(&info.local_aabb)
            }
            _ => false,
        }
    });
}

#[cfg(test)]
#[path = "culler_tests.rs"]
mod tests;
