/*!
# Galaxy 3D Culling

CPU-side visibility for instanced rendering.

A scene holds a fixed population of instances (world matrix + bounds +
color). Once per frame the caller hands over a camera; the crate returns
the indices of the instances that may be visible, in the order their
records should be copied into the instance buffer.

## Architecture

- **LooseOctree**: spatial index over world AABBs, with loosened child
  boxes so that objects near octant borders still sink into the children
- **Frustum**: six normalized planes extracted from a view-projection matrix
- **InstanceScene**: instance records, octree lifecycle (build, repair,
  invalidate) and the two-stage cull (octree candidates, then optional
  exact refinement in world or local space)
- **WaveGridGenerator**: procedural animated population used by the demo
  and the tests
- **RenderView**: per-frame result (camera snapshot, visible indices, stats)
*/

// Internal modules
mod error;
pub mod log;
pub mod geometry;
pub mod camera;
pub mod octree;
pub mod scene;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Core types used every frame
    pub use crate::camera::{Camera, PerspectiveCamera, RenderView};
    pub use crate::geometry::AABB;
    pub use crate::scene::{
        InstanceScene, CullingAcceleration, FrustumCullingSpace, CullingStats,
    };

    // Logging sub-module (types and logger slot)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, set_logger, reset_logger};
        // Note: culling_* macros are #[macro_export]ed at the crate root
        // (galaxy_3d_culling::culling_info! ...), not re-exported here
    }

    // Geometry sub-module
    pub mod geometry {
        pub use crate::geometry::*;
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Octree sub-module
    pub mod octree {
        pub use crate::octree::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
