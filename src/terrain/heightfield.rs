//! Fractal height field composition
//!
//! One pure height function over normalized [0,1]^2 coordinates: domain
//! warp, fractal Brownian motion, terracing, ridged-noise river carving,
//! and crater stamping, in that order. Two thin accessors expose it: the
//! raw height (meshes need the true underwater shape) and the
//! sea-clamped surface height (placement must never see underwater
//! points).

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::math::smoothstep;
use crate::noise::GradientLattice;

/// Half-width of the river channel mask.
const RIVER_WIDTH: f32 = 0.02;

/// Parameters controlling the composed height function
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightFieldParams {
    // base fBm
    pub octaves: u32,
    pub base_freq: f32,
    pub lacunarity: f32,
    pub gain: f32,
    pub height_scale: f32,

    /// Domain warp strength, 0..1. 0 disables warping.
    pub warp_strength: f32,

    // terraces (stepped cliffs)
    pub terrace_steps: u32,  // 1 = off
    pub terrace_smooth: f32, // ramp half-width within a band, 0..0.5

    // rivers (ridged noise valleys)
    pub enable_rivers: bool,
    pub river_freq: f32,
    pub river_sharpness: f32,
    pub river_threshold: f32,
    pub river_depth: f32,

    // craters
    pub enable_craters: bool,
    pub crater_density: f32, // cells per unit
    pub crater_radius: f32,
    pub crater_depth: f32,

    /// Water surface height, in final (scaled) height units.
    pub sea_level: f32,
    /// Global downward bias applied before scaling.
    pub ocean_bias: f32,

    pub seed: u32,
}

impl Default for HeightFieldParams {
    fn default() -> Self {
        Self {
            octaves: 4,
            base_freq: 1.0,
            lacunarity: 2.0,
            gain: 0.5,
            height_scale: 1.0,
            warp_strength: 0.0,
            terrace_steps: 1,
            terrace_smooth: 0.15,
            enable_rivers: false,
            river_freq: 0.8,
            river_sharpness: 1.5,
            river_threshold: 0.85,
            river_depth: 0.20,
            enable_craters: false,
            crater_density: 6.0,
            crater_radius: 0.06,
            crater_depth: 0.25,
            sea_level: -0.15,
            ocean_bias: 0.0,
            seed: 1230,
        }
    }
}

/// Quantize a [0,1] signal into `steps` plateaus with smoothed ramps.
///
/// Each band keeps a flat plateau; a smoothstep ramp of half-width
/// `smooth` around the band midpoint carries the transition.
pub fn terrace01(h01: f32, steps: u32, smooth: f32) -> f32 {
    if steps <= 1 {
        return h01;
    }
    let x = h01 * steps as f32;
    let cell = x.floor();
    let frac = x - cell;
    let ramp = smoothstep(0.5 - smooth, 0.5 + smooth, frac);
    (cell + ramp) / steps as f32
}

/// Composed fractal height field over [0,1]^2.
pub struct HeightField {
    params: HeightFieldParams,
    lattice: GradientLattice,
}

impl HeightField {
    pub fn new(params: HeightFieldParams) -> Self {
        let lattice = GradientLattice::new(params.seed);
        Self { params, lattice }
    }

    pub fn params(&self) -> &HeightFieldParams {
        &self.params
    }

    /// The gradient lattice backing this field.
    pub fn lattice(&self) -> &GradientLattice {
        &self.lattice
    }

    /// Water surface height.
    pub fn sea_height(&self) -> f32 {
        self.params.sea_level
    }

    /// Raw height at normalized coordinates. Not clamped at sea level:
    /// the mesh shows the true underwater terrain shape.
    pub fn height(&self, x: f32, y: f32) -> f32 {
        let p0 = Vec2::new(x, y);
        let mut p = p0;

        // 1) domain warping breaks up axis-aligned noise artifacts
        if self.params.warp_strength > 0.0 {
            let w = Vec2::new(
                self.lattice.fbm(p0 * 2.0 + Vec2::new(13.2, 7.1), 3, 1.0, 2.0, 0.5),
                self.lattice.fbm(p0 * 2.0 + Vec2::new(-9.7, 5.4), 3, 1.0, 2.0, 0.5),
            );
            p += w * self.params.warp_strength;
        }

        // 2) base fBm
        let mut h = self.lattice.fbm(
            p,
            self.params.octaves,
            self.params.base_freq,
            self.params.lacunarity,
            self.params.gain,
        );

        // 3) terraces
        if self.params.terrace_steps > 1 {
            let h01 = 0.5 * (h + 1.0);
            h = terrace01(h01, self.params.terrace_steps, self.params.terrace_smooth) * 2.0 - 1.0;
        }

        // 4) rivers: the ridged signal peaks where the raw noise crosses
        // zero; those meandering lines become carved channels
        if self.params.enable_rivers {
            let r = self.lattice.fbm(p * self.params.river_freq, 4, 1.0, 2.0, 0.5);
            let ridged = (1.0 - r.abs()).max(0.0).powf(self.params.river_sharpness);
            let mask = smoothstep(
                self.params.river_threshold,
                self.params.river_threshold + RIVER_WIDTH,
                ridged,
            );
            h -= self.params.river_depth * mask;
        }

        // 5) craters
        if self.params.enable_craters && self.params.crater_density > 0.0 {
            h -= self.params.crater_depth * self.crater_field(p);
        }

        // 6) global bias, then rescale to world height
        h -= self.params.ocean_bias;
        h * self.params.height_scale
    }

    /// Height clamped up to the water surface. Placement logic reads
    /// this accessor so underwater points are never placeable.
    pub fn surface_height(&self, x: f32, y: f32) -> f32 {
        self.height(x, y).max(self.params.sea_level)
    }

    /// Surface point (y up) with sea-level clamping.
    pub fn surface_pos(&self, x: f32, y: f32) -> Vec3 {
        Vec3::new(x, self.surface_height(x, y), y)
    }

    /// Worley-style crater contribution in [0,1]: max of the bowls
    /// stamped by the 3x3 neighborhood of crater cells.
    fn crater_field(&self, p: Vec2) -> f32 {
        let g = p * self.params.crater_density;
        let cell_x = g.x.floor() as i32;
        let cell_y = g.y.floor() as i32;

        let mut crater: f32 = 0.0;
        for dj in -1..=1 {
            for di in -1..=1 {
                let cx = cell_x + di;
                let cy = cell_y + dj;

                // per-cell center and radius from the gradient lookup
                let rnd = Vec2::splat(0.5) + 0.5 * self.lattice.gradient_at(cx, cy);
                let center = (Vec2::new(cx as f32, cy as f32) + rnd) / self.params.crater_density;
                let radius = self.params.crater_radius
                    * (0.6 + 0.8 * (0.5 + 0.5 * self.lattice.gradient_at(cx + 73, cy - 41).x));

                let dist = (p - center).length();
                let fall = smoothstep(radius, 0.0, dist);
                let bowl = fall * (1.0 - dist / (radius + 1e-6));
                crater = crater.max(bowl);
            }
        }
        crater
    }
}
