/// Instance generators: the per-frame source of instance transforms.
///
/// A generator describes a population of instances as a function of time:
/// world matrix, model-space bounds and color per instance, plus a scene
/// volume every instance stays inside. `InstanceScene::update` pulls from
/// it once per frame.

use glam::{Mat4, Quat, Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::culling_bail;
use crate::error::Result;
use crate::geometry::AABB;

const SOURCE: &str = "galaxy3d::WaveGridGenerator";

/// Source of per-instance state.
pub trait InstanceGenerator {
    fn instance_count(&self) -> usize;

    /// World matrix of instance `index` at `time` (seconds).
    fn world_matrix(&self, index: usize, time: f32) -> Mat4;

    /// Model-space bounds of instance `index`.
    fn local_aabb(&self, _index: usize) -> AABB {
        AABB::UNIT_CUBE
    }

    fn albedo(&self, _index: usize) -> Vec4 {
        Vec4::ONE
    }

    /// Volume containing every instance at every time.
    fn scene_bounds(&self) -> AABB;
}

/// Parameters of the wave grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveGridConfig {
    pub instance_count: usize,
    /// Distance between neighbouring grid cells
    pub grid_spacing: f32,
    pub wave_frequency: f32,
    /// Degrees per second
    pub rotation_speed: f32,
    /// Peak vertical offset of the wave
    pub y_amplitude: f32,
    /// Extra room around the grid in the scene bounds
    pub scene_margin: f32,
    /// Seed of the per-instance colors
    pub color_seed: u64,
}

impl Default for WaveGridConfig {
    fn default() -> Self {
        Self {
            instance_count: 10_000,
            grid_spacing: 2.5,
            wave_frequency: 0.5,
            rotation_speed: 100.0,
            y_amplitude: 3.0,
            scene_margin: 5.0,
            color_seed: 0,
        }
    }
}

impl WaveGridConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.grid_spacing.is_finite() || self.grid_spacing <= 0.0 {
            culling_bail!(SOURCE, InvalidConfig,
                "grid_spacing must be finite and > 0 (got {})", self.grid_spacing);
        }
        if !self.y_amplitude.is_finite() || self.y_amplitude < 0.0 {
            culling_bail!(SOURCE, InvalidConfig,
                "y_amplitude must be finite and >= 0 (got {})", self.y_amplitude);
        }
        if !self.scene_margin.is_finite() || self.scene_margin < 0.0 {
            culling_bail!(SOURCE, InvalidConfig,
                "scene_margin must be finite and >= 0 (got {})", self.scene_margin);
        }
        if !self.wave_frequency.is_finite() || !self.rotation_speed.is_finite() {
            culling_bail!(SOURCE, InvalidConfig,
                "wave_frequency and rotation_speed must be finite");
        }
        Ok(())
    }
}

/// Square-ish grid of unit cubes in the XZ plane, centered on the origin.
///
/// Each cube bobs along y on a travelling wave
/// `A · sin(f · (row + t)) · cos(f · (col + t))` and spins at a constant rate
/// about an axis that depends on its position in the grid.
pub struct WaveGridGenerator {
    config: WaveGridConfig,
    /// Cells per row: floor(sqrt(instance_count))
    columns: usize,
    rows: usize,
    colors: Vec<Vec4>,
}

impl WaveGridGenerator {
    pub fn new(config: WaveGridConfig) -> Result<Self> {
        config.validate()?;

        let columns = ((config.instance_count as f64).sqrt() as usize).max(1);
        let rows = config.instance_count.div_ceil(columns).max(1);

        let mut rng = StdRng::seed_from_u64(config.color_seed);
        let colors = (0..config.instance_count)
            .map(|_| Vec4::new(rng.gen(), rng.gen(), rng.gen(), 1.0))
            .collect();

        Ok(Self { config, columns, rows, colors })
    }

    pub fn config(&self) -> &WaveGridConfig {
        &self.config
    }

    /// Grid dimensions as (rows, columns).
    pub fn grid_size(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    /// Side of the square field covered by the grid.
    pub fn field_size(&self) -> f32 {
        self.config.grid_spacing * self.columns as f32
    }

    /// (row, column) of an instance, row-major.
    pub fn grid_coord(&self, index: usize) -> (usize, usize) {
        (index / self.columns, index % self.columns)
    }

    /// Grid coordinate mapped to [-1, 1] on both axes, as (u = column, v = row).
    fn grid_coord_snorm(&self, index: usize) -> (f32, f32) {
        let (row, col) = self.grid_coord(index);
        let norm = |i: usize, count: usize| {
            if count > 1 { i as f32 / (count - 1) as f32 } else { 0.5 }
        };
        (norm(col, self.columns) * 2.0 - 1.0, norm(row, self.rows) * 2.0 - 1.0)
    }

    /// Rest position in the XZ plane.
    pub fn base_position(&self, index: usize) -> Vec3 {
        let (u, v) = self.grid_coord_snorm(index);
        let half = self.field_size() * 0.5;
        Vec3::new(u * half, 0.0, v * half)
    }

    pub fn y_offset(&self, index: usize, time: f32) -> f32 {
        let (row, col) = self.grid_coord(index);
        let f = self.config.wave_frequency;
        self.config.y_amplitude
            * (f * (row as f32 + time)).sin()
            * (f * (col as f32 + time)).cos()
    }

    pub fn world_position(&self, index: usize, time: f32) -> Vec3 {
        self.base_position(index) + Vec3::Y * self.y_offset(index, time)
    }

    /// Spin axis: tilted away from +Y toward the grid edge, perpendicular to
    /// the direction from the grid center. Plain +Y at the center.
    fn rotation_axis(&self, index: usize) -> Vec3 {
        let (x, z) = self.grid_coord_snorm(index);
        let distance = (x * x + z * z).sqrt();
        Vec3::new(z, distance, -x).try_normalize().unwrap_or(Vec3::Y)
    }

    fn rotation(&self, index: usize, time: f32) -> Quat {
        let degrees = (time * self.config.rotation_speed) % 360.0;
        Quat::from_axis_angle(self.rotation_axis(index), degrees.to_radians())
    }
}

impl InstanceGenerator for WaveGridGenerator {
    fn instance_count(&self) -> usize {
        self.config.instance_count
    }

    /// Rotate, then translate to the wave position.
    fn world_matrix(&self, index: usize, time: f32) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation(index, time), self.world_position(index, time))
    }

    fn albedo(&self, index: usize) -> Vec4 {
        self.colors.get(index).copied().unwrap_or(Vec4::ONE)
    }

    /// Half the field plus margin in x and z; twice the amplitude plus
    /// margin in y.
    fn scene_bounds(&self) -> AABB {
        let half = self.field_size() * 0.5 + self.config.scene_margin;
        let height = 2.0 * self.config.y_amplitude + self.config.scene_margin;
        AABB::new(Vec3::new(-half, -height, -half), Vec3::new(half, height, half))
    }
}

#[cfg(test)]
#[path = "generator_tests.rs"]
mod tests;
