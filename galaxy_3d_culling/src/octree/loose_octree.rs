/// LooseOctree: dynamic spatial index for frustum culling.
///
/// Each object is stored in exactly one node: insertion descends into the
/// first child whose *loose* bbox fully contains the object, and stops at a
/// leaf or at a node where no child does (a straddler). Because child boxes
/// are loosened, objects near octant borders still sink deep into the tree.
///
/// The tree grows on demand. A leaf that would become too crowded splits into
/// 8 children and every object it held is reinserted from the root. Nodes are
/// never merged or deleted: an area that was once crowded keeps its
/// subdivision for the life of the tree.
///
/// Storage:
/// - nodes in a flat `Vec`, addressed by `NodeIndex`, dropped as a unit
/// - objects in a `SlotMap`, addressed by `ObjectKey`
/// - each object records its `(node, slot)` location; `node.objects[slot]`
///   points back at the object (two-way consistency)

use slotmap::{new_key_type, SlotMap};
use crate::error::Result;
use crate::geometry::AABB;
use crate::{culling_bail, culling_err};
use super::config::OctreeConfig;
use super::node::{subdivide_box, NodeIndex, OctreeNode, CHILD_COUNT};

const SOURCE: &str = "galaxy3d::LooseOctree";

new_key_type! {
    /// Stable handle to an object stored in a `LooseOctree`.
    pub struct ObjectKey;
}

/// Where an object is attached: `nodes[node].objects[slot]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectLocation {
    pub node: NodeIndex,
    pub slot: usize,
}

/// An object indexed by the octree.
#[derive(Debug, Clone)]
pub struct OctreeObject {
    pub(crate) world_aabb: AABB,
    pub(crate) instance_index: u32,
    pub(crate) location: Option<ObjectLocation>,
}

impl OctreeObject {
    pub fn world_aabb(&self) -> &AABB {
        &self.world_aabb
    }

    /// Index of the instance this object stands for (permanent).
    pub fn instance_index(&self) -> u32 {
        self.instance_index
    }

    /// Current owner node and slot (transient, None only while relocating).
    pub fn location(&self) -> Option<ObjectLocation> {
        self.location
    }
}

/// Shape of the tree, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OctreeStats {
    pub node_count: usize,
    pub leaf_count: usize,
    /// Depth of the deepest node (root = 0)
    pub max_depth: u32,
    pub object_count: usize,
    /// Objects attached to internal nodes
    pub straddler_count: usize,
}

/// Loose octree over a fixed scene volume.
pub struct LooseOctree {
    pub(crate) config: OctreeConfig,
    pub(crate) nodes: Vec<OctreeNode>,
    pub(crate) objects: SlotMap<ObjectKey, OctreeObject>,
}

impl LooseOctree {
    /// Create an empty octree covering `scene_bounds`.
    ///
    /// The root's bbox is the scene box itself; only subdivided children are
    /// loosened. Every object inserted later must fit inside the root.
    pub fn new(scene_bounds: AABB, config: OctreeConfig) -> Result<Self> {
        config.validate()?;
        if !scene_bounds.is_valid() {
            culling_bail!(SOURCE, InvalidBounds,
                "scene bounds {:?} .. {:?} are not a valid box", scene_bounds.min, scene_bounds.max);
        }

        Ok(Self {
            config,
            nodes: vec![OctreeNode::new(scene_bounds, scene_bounds, None, 0)],
            objects: SlotMap::with_key(),
        })
    }

    // ===== ACCESSORS =====

    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// Bounds of the root node (the scene box).
    pub fn root_bounds(&self) -> &AABB {
        &self.nodes[NodeIndex::ROOT.index()].bbox
    }

    pub fn root(&self) -> &OctreeNode {
        &self.nodes[NodeIndex::ROOT.index()]
    }

    pub fn node(&self, index: NodeIndex) -> Option<&OctreeNode> {
        self.nodes.get(index.index())
    }

    /// All nodes, in allocation order (root first).
    pub fn nodes(&self) -> &[OctreeNode] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn object(&self, key: ObjectKey) -> Option<&OctreeObject> {
        self.objects.get(key)
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectKey, &OctreeObject)> {
        self.objects.iter()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains_object(&self, key: ObjectKey) -> bool {
        self.objects.contains_key(key)
    }

    // ===== INSERT / REMOVE =====

    /// Index a new object and return its key.
    ///
    /// Fails if the AABB is not a valid box or leaves the root bounds.
    pub fn insert(&mut self, instance_index: u32, world_aabb: AABB) -> Result<ObjectKey> {
        self.check_bounds(instance_index, &world_aabb)?;

        let key = self.objects.insert(OctreeObject {
            world_aabb,
            instance_index,
            location: None,
        });
        self.insert_object(NodeIndex::ROOT, key);
        Ok(key)
    }

    /// Remove an object from the index and return its instance index.
    ///
    /// The node it was attached to keeps existing, even if it becomes empty.
    pub fn remove(&mut self, key: ObjectKey) -> Result<u32> {
        let location = match self.objects.get(key) {
            Some(object) => object.location,
            None => culling_bail!(SOURCE, UnknownObject, "cannot remove {:?}", key),
        };
        if let Some(location) = location {
            self.detach(location.node, key);
        }
        match self.objects.remove(key) {
            Some(object) => Ok(object.instance_index),
            None => Err(culling_err!(SOURCE, UnknownObject, "cannot remove {:?}", key)),
        }
    }

    /// Validate an AABB supplied by the caller.
    pub(crate) fn check_bounds(&self, instance_index: u32, aabb: &AABB) -> Result<()> {
        if !aabb.is_valid() {
            culling_bail!(SOURCE, InvalidBounds,
                "instance {}: {:?} .. {:?} is not a valid box", instance_index, aabb.min, aabb.max);
        }
        if !self.root_bounds().contains(aabb) {
            culling_bail!(SOURCE, OutOfBounds,
                "instance {}: {:?} .. {:?} leaves the scene bounds {:?} .. {:?}",
                instance_index, aabb.min, aabb.max, self.root_bounds().min, self.root_bounds().max);
        }
        Ok(())
    }

    /// Insert a detached object into the subtree of `node`.
    ///
    /// Precondition: `node`'s bbox contains the object's AABB.
    ///
    /// - crowded leaf → split, reinsert its objects from the root, then the
    ///   new object from the root
    /// - other leaf → attach
    /// - internal → descend into the first containing child, or attach here
    pub(crate) fn insert_object(&mut self, node: NodeIndex, key: ObjectKey) {
        let world_aabb = self.objects[key].world_aabb;
        let target = &self.nodes[node.index()];
        debug_assert!(
            target.bbox.contains(&world_aabb),
            "insert precondition: node {:?} does not contain {:?}", node, world_aabb
        );
        debug_assert!(self.objects[key].location.is_none(), "object {:?} is still attached", key);

        if target.is_leaf() {
            let split = self.config.should_subdivide(
                target.box_size(),
                target.objects.len() + 1,
                target.depth,
            );
            if split {
                let displaced = self.subdivide(node);
                for moved in displaced {
                    self.insert_object(NodeIndex::ROOT, moved);
                }
                self.insert_object(NodeIndex::ROOT, key);
            } else {
                self.attach(node, key);
            }
            return;
        }

        match self.containing_child(node, &world_aabb) {
            Some(child) => self.insert_object(child, key),
            None => self.attach(node, key),
        }
    }

    /// First child of `node` whose loose bbox contains `aabb`.
    pub(crate) fn containing_child(&self, node: NodeIndex, aabb: &AABB) -> Option<NodeIndex> {
        self.nodes[node.index()]
            .children()
            .find(|child| self.nodes[child.index()].bbox.contains(aabb))
    }

    /// Create the 8 children of a leaf and detach everything it held.
    ///
    /// Returns the displaced objects, in their previous slot order.
    fn subdivide(&mut self, node: NodeIndex) -> Vec<ObjectKey> {
        let (octant, depth) = {
            let leaf = &self.nodes[node.index()];
            debug_assert!(leaf.is_leaf(), "node {:?} is already subdivided", node);
            (leaf.octant, leaf.depth)
        };
        debug_assert!(
            depth < self.config.max_depth,
            "subdividing node {:?} at depth {} exceeds max depth {}", node, depth, self.config.max_depth
        );

        let first_child = NodeIndex(self.nodes.len() as u32);
        let loose_factor = self.config.loose_factor;
        for child_octant in subdivide_box(&octant) {
            self.nodes.push(OctreeNode::new(
                child_octant,
                child_octant.loosened(loose_factor),
                Some(node),
                depth + 1,
            ));
        }

        let parent = &mut self.nodes[node.index()];
        parent.first_child = Some(first_child);
        let displaced = std::mem::take(&mut parent.objects);
        for &moved in &displaced {
            self.objects[moved].location = None;
        }
        displaced
    }

    // ===== ATTACH / DETACH =====

    /// Append an object to a node's list and record its location.
    pub(crate) fn attach(&mut self, node: NodeIndex, key: ObjectKey) {
        let objects = &mut self.nodes[node.index()].objects;
        let slot = objects.len();
        objects.push(key);

        let object = &mut self.objects[key];
        debug_assert!(object.location.is_none(), "object {:?} attached twice", key);
        object.location = Some(ObjectLocation { node, slot });
    }

    /// Remove an object from the node that owns it (swap-remove).
    ///
    /// The object that was last in the node's list takes the freed slot and
    /// has its location fixed; the removed object ends up without location.
    pub(crate) fn detach(&mut self, node: NodeIndex, key: ObjectKey) {
        let location = self.objects[key].location;
        debug_assert!(
            matches!(location, Some(l) if l.node == node),
            "detach: node {:?} does not own object {:?} (location {:?})", node, key, location
        );
        let Some(ObjectLocation { slot, .. }) = location else {
            return;
        };

        let objects = &mut self.nodes[node.index()].objects;
        debug_assert_eq!(objects.get(slot), Some(&key), "stale slot for object {:?}", key);
        objects.swap_remove(slot);
        if let Some(&moved) = objects.get(slot) {
            self.objects[moved].location = Some(ObjectLocation { node, slot });
        }
        self.objects[key].location = None;
    }

    // ===== INSPECTION =====

    /// Count nodes, leaves and objects.
    pub fn stats(&self) -> OctreeStats {
        let mut stats = OctreeStats {
            node_count: self.nodes.len(),
            object_count: self.objects.len(),
            ..Default::default()
        };
        for node in &self.nodes {
            stats.max_depth = stats.max_depth.max(node.depth);
            if node.is_leaf() {
                stats.leaf_count += 1;
            } else {
                stats.straddler_count += node.objects.len();
            }
        }
        stats
    }

    /// Walk the whole tree and check its structural invariants.
    ///
    /// - internal nodes own 8 children that point back at them one level deeper
    /// - no node is deeper than the configured max depth
    /// - every attached object is contained by its node's bbox and by the
    ///   bbox of every ancestor up to the root
    /// - `node.objects[slot]` and the object's location agree both ways
    /// - every live object is attached exactly once
    pub fn validate(&self) -> Result<()> {
        let mut attached = 0usize;

        for (i, node) in self.nodes.iter().enumerate() {
            let index = NodeIndex(i as u32);

            if node.depth > self.config.max_depth {
                culling_bail!(SOURCE, InconsistentIndex,
                    "node {} at depth {} exceeds max depth {}", i, node.depth, self.config.max_depth);
            }

            if let Some(first) = node.first_child {
                if first.index() + CHILD_COUNT > self.nodes.len() {
                    culling_bail!(SOURCE, InconsistentIndex, "node {} has missing children", i);
                }
                for child in node.children() {
                    let child_node = &self.nodes[child.index()];
                    if child_node.parent != Some(index) || child_node.depth != node.depth + 1 {
                        culling_bail!(SOURCE, InconsistentIndex,
                            "node {} is not a well-formed child of node {}", child.index(), i);
                    }
                }
            }

            for (slot, &key) in node.objects.iter().enumerate() {
                let Some(object) = self.objects.get(key) else {
                    culling_bail!(SOURCE, InconsistentIndex,
                        "node {} slot {} holds a removed object", i, slot);
                };
                if object.location != Some(ObjectLocation { node: index, slot }) {
                    culling_bail!(SOURCE, InconsistentIndex,
                        "object {:?} in node {} slot {} records location {:?}",
                        key, i, slot, object.location);
                }
                if !node.bbox.contains(&object.world_aabb) {
                    culling_bail!(SOURCE, InconsistentIndex,
                        "object {:?} is not contained by node {}", key, i);
                }
                self.check_ancestors_contain(index, key, &object.world_aabb)?;
                attached += 1;
            }
        }

        if attached != self.objects.len() {
            culling_bail!(SOURCE, InconsistentIndex,
                "{} objects indexed but {} attached", self.objects.len(), attached);
        }
        Ok(())
    }

    /// Walk from `node` up to the root, checking every ancestor bbox holds `aabb`.
    fn check_ancestors_contain(&self, node: NodeIndex, key: ObjectKey, aabb: &AABB) -> Result<()> {
        let mut ancestor = self.nodes[node.index()].parent;
        // A well-formed chain is at most max_depth long
        for _ in 0..self.config.max_depth {
            let Some(up) = ancestor else {
                return Ok(());
            };
            let Some(up_node) = self.nodes.get(up.index()) else {
                culling_bail!(SOURCE, InconsistentIndex,
                    "node {} has a dangling parent {}", node.index(), up.index());
            };
            if !up_node.bbox.contains(aabb) {
                culling_bail!(SOURCE, InconsistentIndex,
                    "object {:?} in node {} is not contained by ancestor {}", key, node.index(), up.index());
            }
            ancestor = up_node.parent;
        }
        if ancestor.is_some() {
            culling_bail!(SOURCE, InconsistentIndex,
                "node {} has a parent chain longer than max depth", node.index());
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "loose_octree_tests.rs"]
mod tests;
