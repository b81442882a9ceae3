/// OctreeNode: one cell of the loose octree.
///
/// Nodes live in a flat arena owned by `LooseOctree` and refer to each other
/// by `NodeIndex`. The 8 children of a node are allocated together and are
/// contiguous in the arena, so a node has either all of them or none.

use glam::Vec3;
use crate::geometry::AABB;
use super::loose_octree::ObjectKey;

/// Number of children of an internal node.
pub const CHILD_COUNT: usize = 8;

/// Stable index of a node in the octree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub(crate) u32);

impl NodeIndex {
    /// The root node is always the first node of the arena.
    pub const ROOT: NodeIndex = NodeIndex(0);

    /// Position in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node of the loose octree.
#[derive(Debug, Clone)]
pub struct OctreeNode {
    /// Exact octant of this node (subdivision source)
    pub(crate) octant: AABB,
    /// Octant loosened by the configured factor (containment and culling bounds)
    pub(crate) bbox: AABB,
    pub(crate) parent: Option<NodeIndex>,
    /// First of the 8 contiguous children (None = leaf)
    pub(crate) first_child: Option<NodeIndex>,
    /// Objects attached to this node; an object's slot is its position here
    pub(crate) objects: Vec<ObjectKey>,
    pub(crate) depth: u32,
}

impl OctreeNode {
    pub(crate) fn new(octant: AABB, bbox: AABB, parent: Option<NodeIndex>, depth: u32) -> Self {
        Self {
            octant,
            bbox,
            parent,
            first_child: None,
            objects: Vec::new(),
            depth,
        }
    }

    pub fn octant(&self) -> &AABB {
        &self.octant
    }

    /// Loose bounds: every object attached here is contained by this box.
    pub fn bbox(&self) -> &AABB {
        &self.bbox
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn objects(&self) -> &[ObjectKey] {
        &self.objects
    }

    pub fn is_leaf(&self) -> bool {
        self.first_child.is_none()
    }

    /// Size used by the subdivision policy (largest extent of the loose bbox).
    pub fn box_size(&self) -> f32 {
        self.bbox.max_extent()
    }

    /// Child `i` (0..8), following the octant bit layout of `octant_aabb`.
    pub fn child(&self, i: usize) -> Option<NodeIndex> {
        debug_assert!(i < CHILD_COUNT);
        self.first_child.map(|first| NodeIndex(first.0 + i as u32))
    }

    /// The 8 children in octant order, or nothing for a leaf.
    pub fn children(&self) -> impl Iterator<Item = NodeIndex> {
        let first = self.first_child.map_or(0, |first| first.0);
        let count = if self.first_child.is_some() { CHILD_COUNT as u32 } else { 0 };
        (first..first + count).map(NodeIndex)
    }
}

/// Exact AABB of octant `octant` (0–7) of `parent`.
///
/// Octant bit layout: bit0 = X, bit1 = Y, bit2 = Z (0 = low half, 1 = high
/// half), so offsets from the minimum enumerate {0,dx}×{0,dy}×{0,dz} with x
/// varying fastest.
pub fn octant_aabb(parent: &AABB, octant: u8) -> AABB {
    let center = parent.center();
    AABB {
        min: Vec3::new(
            if octant & 1 == 0 { parent.min.x } else { center.x },
            if octant & 2 == 0 { parent.min.y } else { center.y },
            if octant & 4 == 0 { parent.min.z } else { center.z },
        ),
        max: Vec3::new(
            if octant & 1 == 0 { center.x } else { parent.max.x },
            if octant & 2 == 0 { center.y } else { parent.max.y },
            if octant & 4 == 0 { center.z } else { parent.max.z },
        ),
    }
}

/// Split a box into its 8 exact octants, in octant order.
pub fn subdivide_box(aabb: &AABB) -> [AABB; CHILD_COUNT] {
    std::array::from_fn(|i| octant_aabb(aabb, i as u8))
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
