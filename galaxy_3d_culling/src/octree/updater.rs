/// Incremental repair of a `LooseOctree` after objects move.

use crate::culling_bail;
use crate::error::Result;
use crate::geometry::AABB;
use super::loose_octree::{LooseOctree, ObjectKey};
use super::node::NodeIndex;

const SOURCE: &str = "galaxy3d::LooseOctree";

impl LooseOctree {
    /// Store a new world AABB for an object and relocate it if needed.
    ///
    /// - still inside its node and some child now contains it → push it down
    ///   into that child's subtree
    /// - still inside its node otherwise → leave it where it is
    /// - no longer inside its node → detach and reinsert from the root
    ///
    /// Returns true if the object changed node. Updating with an unchanged
    /// AABB never moves anything.
    pub fn update_object(&mut self, key: ObjectKey, world_aabb: AABB) -> Result<bool> {
        let instance_index = match self.objects.get(key) {
            Some(object) => object.instance_index,
            None => culling_bail!(SOURCE, UnknownObject, "cannot update {:?}", key),
        };
        self.check_bounds(instance_index, &world_aabb)?;

        let object = &mut self.objects[key];
        object.world_aabb = world_aabb;
        debug_assert!(object.location.is_some(), "live object {:?} is not attached", key);
        let Some(location) = object.location else {
            self.insert_object(NodeIndex::ROOT, key);
            return Ok(true);
        };
        let owner = location.node;

        if self.nodes[owner.index()].bbox.contains(&world_aabb) {
            return match self.containing_child(owner, &world_aabb) {
                Some(child) => {
                    self.detach(owner, key);
                    self.insert_object(child, key);
                    Ok(true)
                }
                None => Ok(false),
            };
        }

        self.detach(owner, key);
        self.insert_object(NodeIndex::ROOT, key);
        Ok(true)
    }
}

#[cfg(test)]
#[path = "updater_tests.rs"]
mod tests;
