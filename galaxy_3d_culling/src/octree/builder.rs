/// Bulk construction of a `LooseOctree`.

use std::time::Instant;
use crate::culling_info;
use crate::error::Result;
use crate::geometry::AABB;
use super::config::OctreeConfig;
use super::loose_octree::{LooseOctree, ObjectKey};

const SOURCE: &str = "galaxy3d::LooseOctree";

impl LooseOctree {
    /// Build an octree over `scene_bounds` from `(instance_index, world_aabb)` pairs.
    ///
    /// Objects are inserted one by one in iteration order, so the resulting
    /// shape is deterministic. Returns the tree and the object keys in input
    /// order. Stops at the first object that is invalid or leaves the bounds.
    pub fn build<I>(
        scene_bounds: AABB,
        config: OctreeConfig,
        objects: I,
    ) -> Result<(Self, Vec<ObjectKey>)>
    where
        I: IntoIterator<Item = (u32, AABB)>,
    {
        let start = Instant::now();
        let mut octree = Self::new(scene_bounds, config)?;

        let keys = objects
            .into_iter()
            .map(|(instance_index, world_aabb)| octree.insert(instance_index, world_aabb))
            .collect::<Result<Vec<_>>>()?;

        debug_assert!(octree.validate().is_ok(), "octree invariants broken after build");

        let stats = octree.stats();
        culling_info!(SOURCE,
            "Built octree: {} objects, {} nodes ({} leaves), depth {}, {} straddlers in {:.3} ms",
            stats.object_count, stats.node_count, stats.leaf_count, stats.max_depth,
            stats.straddler_count, start.elapsed().as_secs_f64() * 1000.0);

        Ok((octree, keys))
    }
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
