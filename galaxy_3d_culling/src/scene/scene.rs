/// InstanceScene: the per-frame state of an instanced population.
///
/// Owns everything the culling needs across frames:
/// - the GPU-facing instance records (`InstanceData`)
/// - the spatial records (`InstanceSceneInfo`)
/// - the octree over the instances' world AABBs, built on first use
/// - the set of instances whose world AABB changed since the last repair
///
/// Per-frame flow: `update` (or `set_instance`) → `cull` → upload the
/// returned `RenderView`.

use std::time::Instant;
use glam::{Mat4, Vec4};
use rustc_hash::FxHashSet;
use crate::camera::{Camera, RenderView};
use crate::error::{Error, Result};
use crate::geometry::AABB;
use crate::octree::{LooseOctree, OctreeConfig};
use crate::{culling_bail, culling_debug, culling_err, culling_error, culling_info, culling_trace};
use super::culler::{refine_local, refine_world, CullingAcceleration, CullingStats, FrustumCullingSpace};
use super::generator::InstanceGenerator;
use super::instance::{InstanceData, InstanceSceneInfo};

const SOURCE: &str = "galaxy3d::InstanceScene";

/// A fixed-size population of instances with its spatial index.
pub struct InstanceScene {
    instances: Vec<InstanceData>,
    scene_info: Vec<InstanceSceneInfo>,
    scene_bounds: AABB,
    octree_config: OctreeConfig,
    octree: Option<LooseOctree>,
    /// Instances whose world AABB changed since the octree was last built or repaired
    dirty: FxHashSet<u32>,
}

impl InstanceScene {
    /// Create a scene of `instance_count` identity-transformed unit cubes.
    ///
    /// Validates the octree configuration and the scene bounds up front so
    /// that the first octree build can only fail on instance data.
    pub fn new(instance_count: usize, scene_bounds: AABB, octree_config: OctreeConfig) -> Result<Self> {
        octree_config.validate()?;
        if !scene_bounds.is_valid() {
            culling_bail!(SOURCE, InvalidBounds,
                "scene bounds {:?} .. {:?} are not a valid box", scene_bounds.min, scene_bounds.max);
        }
        if u32::try_from(instance_count).is_err() {
            culling_bail!(SOURCE, InvalidConfig,
                "{} instances exceed the u32 index range", instance_count);
        }

        Ok(Self {
            instances: vec![InstanceData::default(); instance_count],
            scene_info: (0..instance_count as u32).map(InstanceSceneInfo::new).collect(),
            scene_bounds,
            octree_config,
            octree: None,
            dirty: FxHashSet::default(),
        })
    }

    /// Create a scene sized and bounded by `generator`, with its state at `time`.
    pub fn from_generator(
        generator: &dyn InstanceGenerator,
        octree_config: OctreeConfig,
        time: f32,
    ) -> Result<Self> {
        let mut scene = Self::new(generator.instance_count(), generator.scene_bounds(), octree_config)?;
        scene.update(generator, time)?;
        Ok(scene)
    }

    // ===== ACCESSORS =====

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn instances(&self) -> &[InstanceData] {
        &self.instances
    }

    pub fn scene_info(&self) -> &[InstanceSceneInfo] {
        &self.scene_info
    }

    pub fn scene_bounds(&self) -> &AABB {
        &self.scene_bounds
    }

    pub fn octree_config(&self) -> &OctreeConfig {
        &self.octree_config
    }

    /// The octree, once an octree-accelerated cull has built it.
    pub fn octree(&self) -> Option<&LooseOctree> {
        self.octree.as_ref()
    }

    /// Number of instances waiting for an octree repair.
    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    // ===== INSTANCE STATE =====

    /// Set the transform, bounds and color of one instance.
    pub fn set_instance(&mut self, index: usize, world: Mat4, local_aabb: AABB, albedo: Vec4) -> Result<()> {
        let count = self.instances.len();
        let (Some(instance), Some(info)) = (self.instances.get_mut(index), self.scene_info.get_mut(index)) else {
            culling_bail!(SOURCE, InvalidConfig,
                "instance index {} out of range (scene holds {})", index, count);
        };
        if !local_aabb.is_valid() {
            culling_bail!(SOURCE, InvalidBounds,
                "instance {}: local bounds {:?} .. {:?} are not a valid box", index, local_aabb.min, local_aabb.max);
        }

        *instance = InstanceData::new(world, albedo);
        if info.set_transform(&world, local_aabb) {
            self.dirty.insert(info.instance_index);
        }
        Ok(())
    }

    /// Pull every instance's state at `time` from `generator`.
    pub fn update(&mut self, generator: &dyn InstanceGenerator, time: f32) -> Result<()> {
        if generator.instance_count() != self.instances.len() {
            let err = Error::InstanceCountMismatch {
                expected: self.instances.len(),
                actual: generator.instance_count(),
            };
            culling_error!(SOURCE, "{}", err);
            return Err(err);
        }

        for index in 0..self.instances.len() {
            self.set_instance(
                index,
                generator.world_matrix(index, time),
                generator.local_aabb(index),
                generator.albedo(index),
            )?;
        }
        Ok(())
    }

    // ===== SPATIAL INDEX =====

    /// Build the octree from scratch over the current world AABBs.
    pub fn rebuild_index(&mut self) -> Result<()> {
        self.octree = None;
        for info in &mut self.scene_info {
            info.object = None;
        }

        let objects = self.scene_info.iter().map(|info| (info.instance_index, info.world_aabb));
        let (octree, keys) = LooseOctree::build(self.scene_bounds, self.octree_config, objects)?;
        for (info, key) in self.scene_info.iter_mut().zip(keys) {
            info.object = Some(key);
        }

        self.octree = Some(octree);
        self.dirty.clear();
        culling_info!(SOURCE, "Rebuilt scene octree over {} instances", self.instances.len());
        Ok(())
    }

    /// Drop the octree; the next octree-accelerated cull rebuilds it.
    pub fn invalidate_index(&mut self) {
        self.octree = None;
        for info in &mut self.scene_info {
            info.object = None;
        }
    }

    /// Relocate the moved instances in the octree. Returns how many changed node.
    ///
    /// Instances are repaired in index order. An instance that cannot be
    /// repaired stays pending while the others are still repaired; the first
    /// such error is returned. Without an octree this only clears the
    /// pending set.
    pub fn repair_index(&mut self) -> Result<usize> {
        let mut pending: Vec<u32> = self.dirty.drain().collect();
        pending.sort_unstable();

        let Some(octree) = self.octree.as_mut() else {
            return Ok(0);
        };

        let mut relocated = 0;
        let mut first_error = None;
        for &index in &pending {
            let info = &self.scene_info[index as usize];
            let result = match info.object {
                Some(key) => octree.update_object(key, info.world_aabb),
                None => Err(culling_err!(SOURCE, UnknownObject,
                    "instance {} is not indexed by the octree", index)),
            };
            match result {
                Ok(true) => relocated += 1,
                Ok(false) => {}
                Err(err) => {
                    self.dirty.insert(index);
                    first_error.get_or_insert(err);
                }
            }
        }

        culling_trace!(SOURCE, "Repaired octree: {} updated, {} relocated, {} still pending",
            pending.len() - self.dirty.len(), relocated, self.dirty.len());
        match first_error {
            Some(err) => Err(err),
            None => Ok(relocated),
        }
    }

    // ===== CULLING =====

    /// Select the instances visible from `camera`.
    ///
    /// Stage 1 (`acceleration`) produces candidates: all instances, or the
    /// conservative octree output (building the octree on first use and, for
    /// `DynamicOctree`, repairing it first). Stage 2 (`space`) optionally
    /// tests each candidate exactly.
    pub fn cull(
        &mut self,
        camera: &Camera,
        space: FrustumCullingSpace,
        acceleration: CullingAcceleration,
    ) -> Result<RenderView> {
        let frustum = camera.world_frustum();
        let mut stats = CullingStats::default();
        let mut visible: Vec<u32>;

        if acceleration.uses_octree() {
            let start = Instant::now();
            if self.octree.is_none() {
                self.rebuild_index()?;
            } else if acceleration == CullingAcceleration::DynamicOctree {
                stats.relocated_count = self.repair_index()?;
            }
            stats.index_time = start.elapsed();

            let start = Instant::now();
            visible = Vec::with_capacity(self.instances.len());
            if let Some(octree) = &self.octree {
                octree.cull(&frustum, &mut visible);
            }
            stats.cull_time = start.elapsed();
        } else {
            visible = (0..self.instances.len() as u32).collect();
        }
        stats.candidate_count = visible.len();

        let start = Instant::now();
        match space {
            FrustumCullingSpace::None => {}
            FrustumCullingSpace::World => refine_world(&frustum, &self.scene_info, &mut visible),
            FrustumCullingSpace::Local => refine_local(camera, &self.instances, &self.scene_info, &mut visible),
        }
        stats.cull_time += start.elapsed();
        stats.visible_count = visible.len();

        culling_debug!(SOURCE,
            "Culled {:?}/{:?}: {} candidates, {} visible, {} relocated, index {:.3} ms, cull {:.3} ms",
            acceleration, space, stats.candidate_count, stats.visible_count, stats.relocated_count,
            stats.index_time.as_secs_f64() * 1000.0, stats.cull_time.as_secs_f64() * 1000.0);

        Ok(RenderView::new(camera.clone(), visible, stats))
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
