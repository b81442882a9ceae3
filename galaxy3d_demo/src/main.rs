//! Galaxy3D culling demo
//!
//! Headless frame loop over an animated wave grid of cubes. Every frame the
//! grid is advanced, culled from an orbiting camera with each acceleration
//! strategy, and the visible instance records are packed into a staging
//! buffer as they would be for the GPU upload.
//!
//! Usage: galaxy3d_demo [instance_count] [frame_count]

use std::time::Duration;
use galaxy_3d_culling::galaxy3d::{
    CullingAcceleration, FrustumCullingSpace, InstanceScene, PerspectiveCamera, Result,
};
use galaxy_3d_culling::galaxy3d::octree::OctreeConfig;
use galaxy_3d_culling::galaxy3d::scene::{WaveGridConfig, WaveGridGenerator};
use galaxy_3d_culling::{culling_info, culling_warn};
use glam::Vec3;

const SOURCE: &str = "galaxy3d::Demo";

/// Simulated frame step (60 Hz)
const FRAME_TIME: f32 = 1.0 / 60.0;

const STRATEGIES: [(CullingAcceleration, FrustumCullingSpace); 4] = [
    (CullingAcceleration::None, FrustumCullingSpace::World),
    (CullingAcceleration::StaticOctree, FrustumCullingSpace::None),
    (CullingAcceleration::DynamicOctree, FrustumCullingSpace::World),
    (CullingAcceleration::DynamicOctree, FrustumCullingSpace::Local),
];

/// Totals of one strategy over the whole run
#[derive(Default)]
struct StrategyTotals {
    index_time: Duration,
    cull_time: Duration,
    visible: usize,
    relocated: usize,
}

fn parse_arg(position: usize, default: usize) -> usize {
    match std::env::args().nth(position) {
        Some(arg) => arg.parse().unwrap_or_else(|_| {
            culling_warn!(SOURCE, "Ignoring argument '{}', using {}", arg, default);
            default
        }),
        None => default,
    }
}

/// Camera circling the grid at a fixed height, always looking at its center.
fn orbit_camera(field_size: f32, time: f32) -> PerspectiveCamera {
    let radius = field_size * 0.75;
    let angle = time * 0.2;
    PerspectiveCamera {
        position: Vec3::new(radius * angle.cos(), field_size * 0.25, radius * angle.sin()),
        look_at: Vec3::ZERO,
        far: field_size * 2.0,
        ..Default::default()
    }
}

fn run() -> Result<()> {
    let config = WaveGridConfig {
        instance_count: parse_arg(1, WaveGridConfig::default().instance_count),
        ..Default::default()
    };
    let frame_count = parse_arg(2, 120);

    let generator = WaveGridGenerator::new(config)?;
    let (rows, columns) = generator.grid_size();
    culling_info!(SOURCE, "Wave grid: {} instances ({} x {}), {} frames",
        config.instance_count, rows, columns, frame_count);

    let mut scenes = STRATEGIES
        .iter()
        .map(|_| InstanceScene::from_generator(&generator, OctreeConfig::default(), 0.0))
        .collect::<Result<Vec<_>>>()?;
    let mut totals: Vec<StrategyTotals> = STRATEGIES.iter().map(|_| StrategyTotals::default()).collect();
    let mut staging = Vec::new();

    for frame in 0..frame_count {
        let time = frame as f32 * FRAME_TIME;
        let camera = orbit_camera(generator.field_size(), time).to_camera();

        for ((scene, total), (acceleration, space)) in scenes.iter_mut().zip(&mut totals).zip(STRATEGIES) {
            scene.update(&generator, time)?;
            let view = scene.cull(&camera, space, acceleration)?;
            view.write_instance_bytes(scene.instances(), &mut staging);

            let stats = view.stats();
            total.index_time += stats.index_time;
            total.cull_time += stats.cull_time;
            total.visible += stats.visible_count;
            total.relocated += stats.relocated_count;
        }
    }

    let frames = frame_count.max(1);
    for ((acceleration, space), total) in STRATEGIES.iter().zip(&totals) {
        culling_info!(SOURCE,
            "{:?}/{:?}: {} visible per frame, {} relocated per frame, index {:.3} ms, cull {:.3} ms",
            acceleration, space, total.visible / frames, total.relocated / frames,
            total.index_time.as_secs_f64() * 1000.0 / frames as f64,
            total.cull_time.as_secs_f64() * 1000.0 / frames as f64);
    }
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("galaxy3d_demo: {}", err);
        std::process::exit(1);
    }
}
