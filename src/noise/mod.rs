//! 2D gradient noise over a seeded lookup table
//!
//! Foundation for every height query. A fixed table of unit gradients is
//! built once from the seed; cells index into it through an integer hash,
//! so sampling is a pure function of coordinates.

use glam::Vec2;

use crate::core::Prng;
use crate::math::smoothstep01;

/// Number of precomputed gradient vectors.
pub const TABLE_SIZE: usize = 1024;

/// Seeded gradient table with Perlin-style sampling.
pub struct GradientLattice {
    gradients: Vec<Vec2>,
}

impl GradientLattice {
    /// Build the gradient table for a seed.
    pub fn new(seed: u32) -> Self {
        let mut rng = Prng::new(seed as u64);
        let mut gradients = Vec::with_capacity(TABLE_SIZE);
        for _ in 0..TABLE_SIZE {
            let angle = rng.next_f32() * std::f32::consts::TAU;
            gradients.push(Vec2::new(angle.cos(), angle.sin()));
        }
        Self { gradients }
    }

    /// Integer cell hash producing a well-mixed u32.
    ///
    /// Doubles as the general-purpose spatial hash for the crater
    /// stamper, which derives per-cell centers and radii from it.
    pub fn cell_hash(ix: i32, iy: i32) -> u32 {
        let mut h = (ix as u32)
            .wrapping_mul(374761393)
            .wrapping_add((iy as u32).wrapping_mul(668265263));
        h = (h ^ (h >> 13)).wrapping_mul(1103515245);
        h ^ (h >> 16)
    }

    /// Unit gradient assigned to an integer cell corner.
    pub fn gradient_at(&self, ix: i32, iy: i32) -> Vec2 {
        self.gradients[Self::cell_hash(ix, iy) as usize % TABLE_SIZE]
    }

    /// Gradient noise at a point, approximately in [-1, 1].
    ///
    /// Dot products of the four corner gradients with their offsets,
    /// blended with the smoothstep interpolant along both axes. Linear
    /// blending would leave visible grid-aligned kinks.
    pub fn perlin(&self, x: f32, y: f32) -> f32 {
        let x0 = x.floor() as i32;
        let y0 = y.floor() as i32;
        let x1 = x0 + 1;
        let y1 = y0 + 1;

        let d_tl = Vec2::new(x - x0 as f32, y - y1 as f32);
        let d_tr = Vec2::new(x - x1 as f32, y - y1 as f32);
        let d_br = Vec2::new(x - x1 as f32, y - y0 as f32);
        let d_bl = Vec2::new(x - x0 as f32, y - y0 as f32);

        let a = self.gradient_at(x0, y1).dot(d_tl);
        let b = self.gradient_at(x1, y1).dot(d_tr);
        let c = self.gradient_at(x1, y0).dot(d_br);
        let d = self.gradient_at(x0, y0).dot(d_bl);

        let u = x - x0 as f32;
        let v = y - y0 as f32;

        let bottom = interp(d, c, u);
        let top = interp(a, b, u);
        interp(bottom, top, v)
    }

    /// Fractal Brownian motion: octave sum normalized by total amplitude,
    /// keeping the result in [-1, 1] regardless of octave count.
    pub fn fbm(&self, p: Vec2, octaves: u32, base_freq: f32, lacunarity: f32, gain: f32) -> f32 {
        let mut freq = base_freq;
        let mut amp = 1.0;
        let mut sum = 0.0;
        let mut total = 0.0;
        for _ in 0..octaves.max(1) {
            sum += amp * self.perlin(p.x * freq, p.y * freq);
            total += amp;
            freq *= lacunarity;
            amp *= gain;
        }
        sum / total
    }
}

fn interp(a: f32, b: f32, alpha: f32) -> f32 {
    a + smoothstep01(alpha) * (b - a)
}
