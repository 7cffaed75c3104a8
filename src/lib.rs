//! Wildscape - procedural terrain and vegetation generation core
//!
//! Generates a fractal terrain height field, grows vegetation with a
//! parametric L-system turtle, and plans biome-aware forest and rock
//! placement. All outputs are flat, GPU-uploadable buffers; the crate
//! itself has no graphics API dependency.

pub mod core;
pub mod math;
pub mod noise;
pub mod terrain;
pub mod vegetation;
pub mod generation;
pub mod mesh;
