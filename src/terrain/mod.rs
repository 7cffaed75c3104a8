//! Procedural terrain height field, mesh, and biome weighting

pub mod heightfield;
pub use heightfield::{HeightField, HeightFieldParams, terrace01};

pub mod mesh;
pub use mesh::{TerrainMesh, TerrainVertex};

pub mod biome;
pub use biome::{BiomeWeights, biome_weights, grass_weight};
