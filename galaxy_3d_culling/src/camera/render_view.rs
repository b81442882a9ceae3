/// RenderView: result of frustum culling.
///
/// Created by `InstanceScene::cull()`. Contains a snapshot of the camera
/// at culling time, the ordered list of visible instance indices and the
/// statistics of the pass.
///
/// Ephemeral: lives for one frame. The renderer fills its instance buffer
/// from it in the same order and draws `visible_count()` instances.

use crate::scene::{CullingStats, InstanceData};
use super::camera::Camera;

/// Result of frustum culling. Ephemeral: lives for one frame.
#[derive(Debug, Clone)]
pub struct RenderView {
    camera: Camera,
    visible_instances: Vec<u32>,
    stats: CullingStats,
}

impl RenderView {
    /// Create a new RenderView (crate-internal: only InstanceScene::cull creates these).
    pub(crate) fn new(camera: Camera, visible_instances: Vec<u32>, stats: CullingStats) -> Self {
        Self {
            camera,
            visible_instances,
            stats,
        }
    }

    /// Camera snapshot at the time of culling.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Indices of visible instances, in draw order.
    pub fn visible_instances(&self) -> &[u32] {
        &self.visible_instances
    }

    /// Number of visible instances (the draw call's instance count).
    pub fn visible_count(&self) -> usize {
        self.visible_instances.len()
    }

    pub fn stats(&self) -> &CullingStats {
        &self.stats
    }

    /// Copy the visible instance records, in draw order.
    ///
    /// Indices outside `instances` are skipped.
    pub fn gather_instances(&self, instances: &[InstanceData]) -> Vec<InstanceData> {
        self.visible_instances
            .iter()
            .filter_map(|&index| instances.get(index as usize).copied())
            .collect()
    }

    /// Write the visible instance records as raw bytes, ready for upload.
    ///
    /// `out` is cleared first so the same staging vector can be reused every frame.
    pub fn write_instance_bytes(&self, instances: &[InstanceData], out: &mut Vec<u8>) {
        out.clear();
        out.reserve(self.visible_instances.len() * std::mem::size_of::<InstanceData>());
        for &index in &self.visible_instances {
            if let Some(instance) = instances.get(index as usize) {
                out.extend_from_slice(bytemuck::bytes_of(instance));
            }
        }
    }
}

#[cfg(test)]
#[path = "render_view_tests.rs"]
mod tests;
