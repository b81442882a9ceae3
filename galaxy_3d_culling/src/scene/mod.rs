//! Scene module
//!
//! Provides the instanced population (`InstanceScene`), its per-instance
//! records, the procedural wave-grid generator and the culling strategies
//! (acceleration and refinement).

mod culler;
mod generator;
mod instance;
mod scene;

pub use culler::{
    CullingAcceleration, FrustumCullingSpace, CullingStats,
    refine_world, refine_local,
};
pub use generator::{InstanceGenerator, WaveGridConfig, WaveGridGenerator};
pub use instance::{InstanceData, InstanceSceneInfo};
pub use scene::InstanceScene;
