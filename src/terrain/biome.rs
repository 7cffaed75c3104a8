//! Biome weighting shared between placement and shading
//!
//! The grass/rock blend below decides both where trees may take root
//! and how the terrain shader tints the ground. The shader compiles
//! against `shader_defines()`, so both sides of the boundary read the
//! same thresholds.

use glam::Vec3;

use crate::math::{clamp01, smoothstep};
use super::heightfield::HeightFieldParams;

/// Beach/rock bias fades out over this normalized height band.
pub const ROCK_BEACH_LO: f32 = 0.02;
pub const ROCK_BEACH_HI: f32 = 0.12;
/// Grass grows across this normalized height band.
pub const GRASS_BAND_LO: f32 = 0.05;
pub const GRASS_BAND_HI: f32 = 0.80;
/// Slopes steeper than this band read as rock.
pub const ROCK_SLOPE_LO: f32 = 0.75;
pub const ROCK_SLOPE_HI: f32 = 0.90;
/// How strongly steep slopes suppress grass.
pub const GRASS_SLOPE_CUT: f32 = 0.7;
pub const GRASS_BOOST: f32 = 1.4;
pub const ROCK_DAMP: f32 = 0.7;

const EPS: f32 = 1e-6;

const WATER_DEEP: Vec3 = Vec3::new(0.02, 0.10, 0.25);
const WATER_SHALLOW: Vec3 = Vec3::new(0.10, 0.35, 0.55);
const GRASS_LOW: Vec3 = Vec3::new(0.23, 0.48, 0.24);
const GRASS_HIGH: Vec3 = Vec3::new(0.33, 0.60, 0.30);
const ROCK_GRAY: Vec3 = Vec3::new(0.45, 0.45, 0.45);

/// Normalized ground-cover blend at a surface point.
#[derive(Clone, Copy, Debug)]
pub struct BiomeWeights {
    pub grass: f32,
    pub rock: f32,
}

/// Ground-cover blend from normalized height and slope (0 flat, 1
/// vertical). Weights sum to 1.
pub fn biome_weights(h_norm: f32, slope: f32) -> BiomeWeights {
    let h = clamp01(h_norm);
    let s = clamp01(slope);

    let rock_beach = 1.0 - smoothstep(ROCK_BEACH_LO, ROCK_BEACH_HI, h);
    let grass_band = smoothstep(GRASS_BAND_LO, GRASS_BAND_HI, h);
    let rock_slope = smoothstep(ROCK_SLOPE_LO, ROCK_SLOPE_HI, s);

    let grass = grass_band * (1.0 - GRASS_SLOPE_CUT * rock_slope) * GRASS_BOOST;
    let rock = rock_beach.max(rock_slope) * ROCK_DAMP;

    let total = grass + rock + EPS;
    BiomeWeights {
        grass: grass / total,
        rock: rock / total,
    }
}

/// Grassiness in [0,1]; the forest planner rejects low values.
pub fn grass_weight(h_norm: f32, slope: f32) -> f32 {
    biome_weights(h_norm, slope).grass
}

/// GLSL define block mirroring the constants above, injected into the
/// terrain fragment shader so CPU placement and GPU tinting agree.
pub fn shader_defines() -> String {
    format!(
        "#define BIOME_ROCK_BEACH_LO {ROCK_BEACH_LO:?}\n\
         #define BIOME_ROCK_BEACH_HI {ROCK_BEACH_HI:?}\n\
         #define BIOME_GRASS_BAND_LO {GRASS_BAND_LO:?}\n\
         #define BIOME_GRASS_BAND_HI {GRASS_BAND_HI:?}\n\
         #define BIOME_ROCK_SLOPE_LO {ROCK_SLOPE_LO:?}\n\
         #define BIOME_ROCK_SLOPE_HI {ROCK_SLOPE_HI:?}\n\
         #define BIOME_GRASS_SLOPE_CUT {GRASS_SLOPE_CUT:?}\n\
         #define BIOME_GRASS_BOOST {GRASS_BOOST:?}\n\
         #define BIOME_ROCK_DAMP {ROCK_DAMP:?}\n"
    )
}

/// CPU fallback surface tint: water depth gradient below the sea line,
/// the shared grass/rock blend above it.
pub fn surface_color(position: Vec3, normal: Vec3, params: &HeightFieldParams) -> Vec3 {
    let sea = params.sea_level;

    if position.y <= sea + 1e-4 {
        // deeper toward the domain edges, brighter near the center
        let t = clamp01((position.x - 0.5).abs() / 0.25);
        return WATER_SHALLOW.lerp(WATER_DEEP, t);
    }

    let n = normal.try_normalize().unwrap_or(Vec3::Y);
    let h_norm = clamp01((position.y - sea) / params.height_scale.max(EPS));
    let slope = clamp01(1.0 - n.y);

    let w = biome_weights(h_norm, slope);
    let grass = GRASS_LOW.lerp(GRASS_HIGH, h_norm);
    grass * w.grass + ROCK_GRAY * w.rock
}
