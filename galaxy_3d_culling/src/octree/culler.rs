/// Hierarchical frustum culling over a `LooseOctree`.
///
/// Conservative: node boxes are tested, attached objects are not. Every
/// object whose AABB intersects the frustum is reported, along with
/// neighbours that merely share a visible node. Tight per-object tests are
/// a separate refinement stage (see `scene::FrustumCullingSpace`).
///
/// Output order is a pre-order walk: a node's objects in slot order, then
/// its children in octant order.

use crate::camera::{Frustum, FrustumTest};
use super::loose_octree::LooseOctree;
use super::node::NodeIndex;

impl LooseOctree {
    /// Append the instance index of every potentially visible object.
    ///
    /// 3-way classification at each node:
    /// - `Outside` → skip entire subtree
    /// - `Inside` → collect the subtree without further plane tests
    /// - `Partial` → collect this node's objects, recurse into children
    pub fn cull(&self, frustum: &Frustum, results: &mut Vec<u32>) {
        self.cull_node(NodeIndex::ROOT, frustum, results);
    }

    /// Same result as `cull`, testing every reached node against the frustum
    /// instead of short-cutting fully visible subtrees.
    pub fn cull_per_node(&self, frustum: &Frustum, results: &mut Vec<u32>) {
        self.cull_node_plain(NodeIndex::ROOT, frustum, results);
    }

    fn cull_node(&self, index: NodeIndex, frustum: &Frustum, results: &mut Vec<u32>) {
        let node = &self.nodes[index.index()];

        match frustum.classify_aabb(&node.bbox) {
            FrustumTest::Outside => {}
            FrustumTest::Inside => self.collect_all(index, results),
            FrustumTest::Partial => {
                self.collect_node(index, results);
                for child in node.children() {
                    self.cull_node(child, frustum, results);
                }
            }
        }
    }

    fn cull_node_plain(&self, index: NodeIndex, frustum: &Frustum, results: &mut Vec<u32>) {
        let node = &self.nodes[index.index()];
        if !frustum.intersects_aabb(&node.bbox) {
            return;
        }

        self.collect_node(index, results);
        for child in node.children() {
            self.cull_node_plain(child, frustum, results);
        }
    }

    /// Collect all objects from a node and its entire subtree (no frustum test).
    fn collect_all(&self, index: NodeIndex, results: &mut Vec<u32>) {
        self.collect_node(index, results);
        for child in self.nodes[index.index()].children() {
            self.collect_all(child, results);
        }
    }

    fn collect_node(&self, index: NodeIndex, results: &mut Vec<u32>) {
        results.extend(
            self.nodes[index.index()]
                .objects
                .iter()
                .map(|&key| self.objects[key].instance_index),
        );
    }
}

#[cfg(test)]
#[path = "culler_tests.rs"]
mod tests;
