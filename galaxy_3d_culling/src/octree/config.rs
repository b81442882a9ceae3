/// Tunables of the loose octree.

use crate::error::Result;
use crate::culling_bail;

const SOURCE: &str = "galaxy3d::OctreeConfig";

/// Deepest level `validate` accepts. 8^16 leaves is already far beyond memory.
pub const MAX_SUPPORTED_DEPTH: u32 = 16;

/// Construction-time parameters of a `LooseOctree`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctreeConfig {
    /// Scale applied to each child octant about its center (>= 1).
    ///
    /// 1.0 turns looseness off: children are the plain octants and the
    /// tree behaves as a classic octree.
    pub loose_factor: f32,
    /// A node subdivides only if its box is larger than this
    pub subdivide_size_threshold: f32,
    /// A node subdivides only if it would hold more objects than this
    pub subdivide_count_threshold: usize,
    /// Nodes at this depth never subdivide (root = 0)
    pub max_depth: u32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            loose_factor: 1.5,
            subdivide_size_threshold: 4.0,
            subdivide_count_threshold: 4,
            max_depth: 8,
        }
    }
}

impl OctreeConfig {
    /// Check that every parameter is in range.
    pub fn validate(&self) -> Result<()> {
        if !self.loose_factor.is_finite() || self.loose_factor < 1.0 {
            culling_bail!(SOURCE, InvalidConfig,
                "loose_factor must be finite and >= 1 (got {})", self.loose_factor);
        }
        if !self.subdivide_size_threshold.is_finite() || self.subdivide_size_threshold < 0.0 {
            culling_bail!(SOURCE, InvalidConfig,
                "subdivide_size_threshold must be finite and >= 0 (got {})",
                self.subdivide_size_threshold);
        }
        if self.max_depth > MAX_SUPPORTED_DEPTH {
            culling_bail!(SOURCE, InvalidConfig,
                "max_depth must be <= {} (got {})", MAX_SUPPORTED_DEPTH, self.max_depth);
        }
        Ok(())
    }

    /// Subdivision policy: large enough, crowded enough, shallow enough.
    ///
    /// `object_count` is the count the node would hold after the pending insert.
    pub fn should_subdivide(&self, box_size: f32, object_count: usize, depth: u32) -> bool {
        box_size > self.subdivide_size_threshold
            && object_count > self.subdivide_count_threshold
            && depth < self.max_depth
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
