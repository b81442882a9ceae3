//! Error types for the Galaxy3D culling crate
//!
//! Only caller-supplied data is reported through `Error`: configuration,
//! scene bounds, object bounds and object keys. Broken internal invariants
//! of the octree are programmer errors and trip `debug_assert!` instead.

use std::fmt;

/// Result type for culling operations
pub type Result<T> = std::result::Result<T, Error>;

/// Culling errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Octree or generator configuration is out of range
    InvalidConfig(String),

    /// AABB with min > max on some axis, or non-finite corners
    InvalidBounds(String),

    /// AABB is not contained by the octree root
    OutOfBounds(String),

    /// Object key does not refer to a live object (removed or foreign)
    UnknownObject(String),

    /// Octree self-check found a broken invariant
    InconsistentIndex(String),

    /// Generator produced a different number of instances than the scene holds
    InstanceCountMismatch {
        /// Instances held by the scene
        expected: usize,
        /// Instances reported by the generator
        actual: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            Error::InvalidBounds(msg) => write!(f, "Invalid bounds: {}", msg),
            Error::OutOfBounds(msg) => write!(f, "Out of bounds: {}", msg),
            Error::UnknownObject(msg) => write!(f, "Unknown object: {}", msg),
            Error::InconsistentIndex(msg) => write!(f, "Inconsistent index: {}", msg),
            Error::InstanceCountMismatch { expected, actual } => write!(
                f,
                "Instance count mismatch: scene holds {}, generator produced {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
