//! Octree module: loose octree spatial index.
//!
//! `LooseOctree` indexes object world AABBs, repairs itself incrementally
//! when objects move (`update_object`) and answers conservative frustum
//! queries (`cull`).

mod builder;
mod config;
mod culler;
mod loose_octree;
mod node;
mod updater;

pub use config::{OctreeConfig, MAX_SUPPORTED_DEPTH};
pub use loose_octree::{LooseOctree, ObjectKey, ObjectLocation, OctreeObject, OctreeStats};
pub use node::{octant_aabb, subdivide_box, NodeIndex, OctreeNode, CHILD_COUNT};
