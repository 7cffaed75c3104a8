//! Rock scatter pass
//!
//! Independent of the forest planner but built on the same surface
//! sampling: uniform candidates over the domain, kept near the shore or
//! on moderate slopes, with a few strays on open ground.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::core::Prng;
use crate::terrain::HeightField;

use super::config::RockSettings;
use super::surface_slope;

/// Base rock size in terrain-local units.
const ROCK_UNIT: f32 = 0.02;
/// Fraction of the vertical scale a rock sinks into the ground.
const SINK: f32 = 0.2;

/// Instance transform for the shared rock mesh.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct RockInstance {
    pub model: Mat4,
}

/// Scatter rocks over the terrain.
pub fn scatter_rocks(field: &HeightField, settings: &RockSettings, seed: u64) -> Vec<RockInstance> {
    let mut rng = Prng::new(seed);
    let mut rocks = Vec::new();

    let params = field.params();
    let sea = field.sea_height();
    let margin = 0.02 * params.height_scale;
    let candidates = settings.candidate_count();

    for _ in 0..candidates {
        let u = rng.next_f32();
        let v = rng.next_f32();
        let p = field.surface_pos(u, v);
        if p.y <= sea + margin {
            continue;
        }

        let slope = surface_slope(field, u, v);
        let is_shore = p.y < sea + 0.1 * params.height_scale;
        let is_slope = slope > 0.3 && slope < 0.8;
        if !is_shore && !is_slope {
            // a few strays on open ground for variety
            if rng.next_f32() > 0.1 {
                continue;
            }
        }

        let base = ROCK_UNIT * (0.5 + 1.5 * rng.next_f32());
        let scale = Vec3::new(
            base * (0.8 + 0.4 * rng.next_f32()),
            base * (0.6 + 0.4 * rng.next_f32()), // flatter vertically
            base * (0.8 + 0.4 * rng.next_f32()),
        );

        let yaw = std::f32::consts::TAU * rng.next_f32();
        let pitch = std::f32::consts::TAU * rng.next_f32();
        let roll = std::f32::consts::TAU * rng.next_f32();

        // partially buried; shore rocks that would sink under the water
        // line are dropped
        let sunk = p - Vec3::Y * (SINK * scale.y);
        if sunk.y <= sea + margin {
            continue;
        }

        let rotation = Mat4::from_rotation_y(yaw)
            * Mat4::from_rotation_x(pitch)
            * Mat4::from_rotation_z(roll);
        let model = Mat4::from_translation(sunk) * rotation * Mat4::from_scale(scale);
        rocks.push(RockInstance { model });
    }

    log::info!("rocks: {} placed of {} candidates", rocks.len(), candidates);
    rocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::HeightFieldParams;

    #[test]
    fn test_deterministic() {
        let field = HeightField::new(HeightFieldParams::default());
        let settings = RockSettings { count: 20 };
        let a = scatter_rocks(&field, &settings, 5678);
        let b = scatter_rocks(&field, &settings, 5678);

        assert_eq!(a.len(), b.len());
        for (ra, rb) in a.iter().zip(&b) {
            assert_eq!(ra.model.to_cols_array(), rb.model.to_cols_array());
        }
    }

    #[test]
    fn test_count_bounded_by_candidates() {
        let field = HeightField::new(HeightFieldParams::default());
        let settings = RockSettings { count: 10 };
        let rocks = scatter_rocks(&field, &settings, 1);
        assert!(rocks.len() <= settings.candidate_count());
    }

    #[test]
    fn test_rocks_stay_above_sea() {
        let field = HeightField::new(HeightFieldParams::default());
        let sea = field.sea_height();
        let rocks = scatter_rocks(&field, &RockSettings { count: 50 }, 99);

        for r in &rocks {
            assert!(r.model.w_axis.y > sea);
        }
    }

    #[test]
    fn test_open_flat_ground_keeps_strays_only() {
        // flat land far above the sea: neither shore nor slope, so only
        // the stray pass places rocks
        let field = HeightField::new(HeightFieldParams {
            height_scale: 0.0,
            sea_level: -1.0,
            ..Default::default()
        });
        let settings = RockSettings { count: 100 };
        let rocks = scatter_rocks(&field, &settings, 42);

        assert!(!rocks.is_empty());
        assert!(rocks.len() < settings.candidate_count() / 4);
    }
}
