//! Generation settings snapshot
//!
//! Already-typed slider values handed over by the UI layer. The structs
//! are plain data passed by reference into each build; nothing here is
//! shared mutable state. JSON loading mirrors how the host application
//! persists scene settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::math::clamp01;
use crate::terrain::HeightFieldParams;

/// Vegetation sliders on the UI's integer scales.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct VegetationSettings {
    /// Forest coverage, 1..=100.
    pub coverage: u32,
    /// Tree size / complexity, 1..=40.
    pub tree_size: u32,
    /// Leaf density, 1..=40.
    pub leaf_density: u32,
}

impl Default for VegetationSettings {
    fn default() -> Self {
        Self { coverage: 30, tree_size: 20, leaf_density: 20 }
    }
}

impl VegetationSettings {
    pub fn coverage01(&self) -> f32 {
        slider01(self.coverage, 100)
    }

    pub fn size01(&self) -> f32 {
        slider01(self.tree_size, 40)
    }

    pub fn leaf01(&self) -> f32 {
        slider01(self.leaf_density, 40)
    }
}

/// Rock scatter slider.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RockSettings {
    /// Rock count slider, 1..=100; ten candidate points per step.
    pub count: u32,
}

impl Default for RockSettings {
    fn default() -> Self {
        Self { count: 20 }
    }
}

impl RockSettings {
    pub fn candidate_count(&self) -> usize {
        self.count.max(1) as usize * 10
    }
}

/// Full settings snapshot for one scene build.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub terrain: HeightFieldParams,
    /// Terrain grid resolution, quads per side.
    pub resolution: u32,
    pub vegetation: VegetationSettings,
    pub rocks: RockSettings,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            terrain: HeightFieldParams::default(),
            resolution: 256,
            vegetation: VegetationSettings::default(),
            rocks: RockSettings::default(),
        }
    }
}

impl SceneSettings {
    /// Load settings from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Map a 1-based integer slider onto [0, 1].
fn slider01(value: u32, max: u32) -> f32 {
    clamp01((value.max(1) - 1) as f32 / (max - 1) as f32)
}
