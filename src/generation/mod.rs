//! Scene generation pipeline
//!
//! Couples the height field to the vegetation and rock scatter passes.
//! Everything runs single-threaded and synchronously; a rebuild fully
//! replaces the previous outputs, so there is nothing to synchronize.

pub mod config;
pub mod forest;
pub mod rocks;

pub use config::{RockSettings, SceneSettings, VegetationSettings};
pub use forest::{Forest, ForestPlanner, ForestStats, MAX_BRANCH_INSTANCES, MAX_LEAF_INSTANCES};
pub use rocks::{RockInstance, scatter_rocks};

use glam::Vec3;

use crate::math::clamp01;
use crate::terrain::{HeightField, TerrainMesh};

/// Offset for finite-difference slope estimation.
const SLOPE_EPS: f32 = 1.0 / 512.0;

/// Terrain slope at a surface point: 0 flat, 1 vertical.
///
/// Finite differences over the sea-clamped surface, so water reads as
/// flat; the terrain shader derives the same measure per fragment.
pub fn surface_slope(field: &HeightField, x: f32, y: f32) -> f32 {
    let h0 = field.surface_height(x, y);
    let hdx = field.surface_height(clamp01(x + SLOPE_EPS), y);
    let hdy = field.surface_height(x, clamp01(y + SLOPE_EPS));

    let dx = Vec3::new(SLOPE_EPS, hdx - h0, 0.0);
    let dz = Vec3::new(0.0, hdy - h0, SLOPE_EPS);
    let normal = dz.cross(dx).try_normalize().unwrap_or(Vec3::Y);
    clamp01(1.0 - normal.y)
}

/// Everything one rebuild produces.
pub struct GeneratedScene {
    pub terrain: TerrainMesh,
    pub forest: Forest,
    pub rocks: Vec<RockInstance>,
}

/// Orchestrates a full rebuild from one settings snapshot.
pub struct GenerationPipeline {
    field: HeightField,
    settings: SceneSettings,
}

impl GenerationPipeline {
    pub fn new(settings: SceneSettings) -> Self {
        let field = HeightField::new(settings.terrain.clone());
        Self { field, settings }
    }

    pub fn height_field(&self) -> &HeightField {
        &self.field
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    /// Run all passes. The previous scene, if any, is meant to be
    /// dropped wholesale; nothing is merged.
    pub fn build(&self) -> GeneratedScene {
        let seed = self.settings.terrain.seed as u64;

        let terrain = TerrainMesh::generate(&self.field, self.settings.resolution);
        let forest =
            ForestPlanner::new(&self.field, self.settings.vegetation.clone()).build(seed);
        let rocks = scatter_rocks(&self.field, &self.settings.rocks, seed.wrapping_add(1));

        GeneratedScene { terrain, forest, rocks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::HeightFieldParams;

    #[test]
    fn test_flat_field_has_zero_slope() {
        let field = HeightField::new(HeightFieldParams {
            height_scale: 0.0,
            sea_level: -1.0,
            ..Default::default()
        });
        assert_eq!(surface_slope(&field, 0.5, 0.5), 0.0);
    }

    #[test]
    fn test_slope_in_range_and_deterministic() {
        let field = HeightField::new(HeightFieldParams::default());
        for i in 0..32 {
            let x = i as f32 / 31.0;
            let s = surface_slope(&field, x, 1.0 - x);
            assert!((0.0..=1.0).contains(&s));
            assert_eq!(s, surface_slope(&field, x, 1.0 - x));
        }
    }

    #[test]
    fn test_pipeline_build_deterministic() {
        let settings = SceneSettings {
            resolution: 8,
            vegetation: VegetationSettings { coverage: 5, tree_size: 5, leaf_density: 5 },
            ..Default::default()
        };
        let a = GenerationPipeline::new(settings.clone()).build();
        let b = GenerationPipeline::new(settings).build();

        assert_eq!(a.terrain.vertex_count(), b.terrain.vertex_count());
        assert_eq!(a.forest.branches.len(), b.forest.branches.len());
        assert_eq!(a.forest.leaves.len(), b.forest.leaves.len());
        assert_eq!(a.rocks.len(), b.rocks.len());
    }
}
