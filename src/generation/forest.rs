//! Clustered forest placement
//!
//! Finds cluster centers above the water line, scatters trees inside
//! each cluster disk, rejects samples on cliffs or outside the grass
//! band, grows one L-system tree per accepted sample, and aggregates
//! all instance transforms under hard caps. Strictly sequential, so a
//! fixed seed reproduces the forest exactly.

use glam::{Mat4, Vec2, Vec3};

use crate::core::Prng;
use crate::math::{clamp01, mix};
use crate::terrain::HeightField;
use crate::terrain::biome::grass_weight;
use crate::vegetation::lsystem::{BUSH_VARIANTS, bush_rules};
use crate::vegetation::turtle::{BranchInstance, LSystemParams, LeafInstance, grow};

use super::config::VegetationSettings;
use super::surface_slope;

/// Hard caps bounding the GPU instance buffers.
pub const MAX_BRANCH_INSTANCES: usize = 800_000;
pub const MAX_LEAF_INSTANCES: usize = 1_600_000;

/// Attempts at finding a cluster center above water before the cluster
/// is skipped.
const CENTER_ATTEMPTS: u32 = 32;
/// Placements steeper than this are rejected outright.
const MAX_SLOPE: f32 = 0.96;
/// Minimum grassiness for a tree to take root.
const MIN_GRASS_WEIGHT: f32 = 0.18;

const EPS: f32 = 1e-6;

/// Counters reported by a forest build.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForestStats {
    pub clusters_planned: usize,
    pub clusters_placed: usize,
    pub trees_placed: usize,
    /// True when an instance cap ended the build early.
    pub capped: bool,
}

/// Aggregated forest geometry, replaced wholesale on every rebuild.
#[derive(Default)]
pub struct Forest {
    pub branches: Vec<BranchInstance>,
    pub leaves: Vec<LeafInstance>,
    /// Accepted tree base positions, kept for diagnostics.
    pub roots: Vec<Vec3>,
    pub stats: ForestStats,
}

/// Plans tree placement over one height field.
pub struct ForestPlanner<'a> {
    field: &'a HeightField,
    settings: VegetationSettings,
}

impl<'a> ForestPlanner<'a> {
    pub fn new(field: &'a HeightField, settings: VegetationSettings) -> Self {
        Self { field, settings }
    }

    pub fn build(&self, seed: u64) -> Forest {
        self.build_with_caps(seed, MAX_BRANCH_INSTANCES, MAX_LEAF_INSTANCES)
    }

    fn build_with_caps(&self, seed: u64, max_branches: usize, max_leaves: usize) -> Forest {
        let mut rng = Prng::new(seed);
        let mut forest = Forest::default();

        let cov01 = self.settings.coverage01();
        let size01 = self.settings.size01();
        let leaf01 = self.settings.leaf01();

        let base = LSystemParams {
            iterations: 4,
            step_length: 0.055,
            base_angle_deg: 30.0,
            angle_jitter_deg: 15.0,
            base_radius: 0.018,
            radius_decay: 0.75,
            leaf_density: 1.0,
        };

        // coverage packs more, tighter clusters; size raises per-cluster
        // tree counts
        let cluster_count = 12 + mix(40.0, 160.0, cov01) as usize;
        let trees_min = 4 + mix(3.0, 10.0, size01) as usize;
        let trees_max = trees_min + 4;
        let cluster_radius_base = mix(0.10, 0.03, cov01);

        let params = self.field.params();
        let sea = self.field.sea_height();
        let margin = 0.02 * params.height_scale;

        forest.stats.clusters_planned = cluster_count;

        'clusters: for _ in 0..cluster_count {
            // hunt for a cluster center above the water line
            let mut center = Vec2::ZERO;
            let mut found = false;
            for _ in 0..CENTER_ATTEMPTS {
                let uv = Vec2::new(rng.next_f32(), rng.next_f32());
                if self.field.surface_pos(uv.x, uv.y).y > sea + margin {
                    center = uv;
                    found = true;
                    break;
                }
            }
            if !found {
                continue;
            }
            forest.stats.clusters_placed += 1;

            let cluster_radius = cluster_radius_base * (0.7 + 0.6 * rng.next_f32());
            let span = (trees_max - trees_min + 1) as f32;
            let trees = (trees_min + (rng.next_f32() * span) as usize).min(trees_max);

            for _ in 0..trees {
                // uniform-area disk sample around the center
                let ang = std::f32::consts::TAU * rng.next_f32();
                let r = cluster_radius * rng.next_f32().sqrt();
                let uv = Vec2::new(
                    clamp01(center.x + r * ang.cos()),
                    clamp01(center.y + r * ang.sin()),
                );

                let p = self.field.surface_pos(uv.x, uv.y);
                if p.y <= sea + margin {
                    continue;
                }

                let h_norm = clamp01((p.y - sea) / params.height_scale.max(EPS));
                let slope = surface_slope(self.field, uv.x, uv.y);
                if slope > MAX_SLOPE {
                    continue; // near-vertical cliff
                }
                if grass_weight(h_norm, slope) < MIN_GRASS_WEIGHT {
                    continue; // outside the grass band
                }

                let tree_params = randomize_tree(&base, size01, leaf01, &mut rng);
                let variant = ((rng.next_f32() * BUSH_VARIANTS.len() as f32) as usize)
                    .min(BUSH_VARIANTS.len() - 1);
                let tree = grow(&tree_params, "X", &bush_rules(variant), &mut rng);
                if tree.branches.is_empty() {
                    continue;
                }

                let base_model = tree_transform(p, size01, &mut rng);
                let bush_scale = 0.20 * (0.7 + 0.6 * rng.next_f32());

                // stop before either buffer would overflow
                if forest.branches.len() + tree.branches.len() > max_branches
                    || forest.leaves.len() + tree.leaves.len() > max_leaves
                {
                    forest.stats.capped = true;
                    break 'clusters;
                }

                for b in &tree.branches {
                    forest
                        .branches
                        .push(BranchInstance::new(base_model * b.model, b.radius * bush_scale));
                }
                for leaf in &tree.leaves {
                    forest.leaves.push(LeafInstance { model: base_model * leaf.model });
                }
                forest.roots.push(p);
                forest.stats.trees_placed += 1;
            }
        }

        log::info!(
            "forest: {} branches, {} leaves, {} trees in {}/{} clusters{}",
            forest.branches.len(),
            forest.leaves.len(),
            forest.stats.trees_placed,
            forest.stats.clusters_placed,
            forest.stats.clusters_planned,
            if forest.stats.capped { " (capped)" } else { "" },
        );

        forest
    }
}

/// Per-tree parameter jitter around the shared baseline.
fn randomize_tree(
    base: &LSystemParams,
    size01: f32,
    leaf01: f32,
    rng: &mut Prng,
) -> LSystemParams {
    let mut p = base.clone();
    p.step_length *= (0.85 + 0.5 * rng.next_f32()) * mix(0.7, 1.4, size01);
    p.base_radius *= mix(0.7, 1.3, size01);
    p.iterations = if size01 > 0.5 && rng.next_f32() < 0.5 { 3 } else { 2 };
    p.base_angle_deg += (rng.next_f32() - 0.5) * 12.0;
    p.angle_jitter_deg *= 0.7 + 0.6 * rng.next_f32();
    p.radius_decay = (base.radius_decay + (rng.next_f32() - 0.5) * 0.2).clamp(0.6, 0.95);
    p.leaf_density = mix(0.5, 2.0, leaf01);
    p
}

/// World transform for one tree: surface translation, random yaw, a
/// few degrees of tilt, and the size-derived uniform scale.
fn tree_transform(p: Vec3, size01: f32, rng: &mut Prng) -> Mat4 {
    let scale = mix(0.12, 0.28, size01) * (0.8 + 0.4 * rng.next_f32());
    let yaw = std::f32::consts::TAU * rng.next_f32();
    let tilt_x = ((rng.next_f32() - 0.5) * 8.0).to_radians();
    let tilt_z = ((rng.next_f32() - 0.5) * 8.0).to_radians();

    Mat4::from_translation(p)
        * Mat4::from_rotation_y(yaw)
        * Mat4::from_rotation_z(tilt_z)
        * Mat4::from_rotation_x(tilt_x)
        * Mat4::from_scale(Vec3::splat(scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::HeightFieldParams;

    fn flat_open_field() -> HeightField {
        // flat land well above the sea: every sample is placeable
        HeightField::new(HeightFieldParams {
            height_scale: 0.0,
            sea_level: -1.0,
            ..Default::default()
        })
    }

    #[test]
    fn test_flat_field_places_every_cluster() {
        let field = flat_open_field();
        let planner = ForestPlanner::new(&field, VegetationSettings {
            coverage: 5,
            tree_size: 5,
            leaf_density: 5,
        });
        let forest = planner.build(1337);

        assert_eq!(forest.stats.clusters_placed, forest.stats.clusters_planned);
        assert!(forest.stats.trees_placed > 0);
        assert!(!forest.branches.is_empty());
        assert!(!forest.leaves.is_empty());
    }

    #[test]
    fn test_build_deterministic() {
        let field = HeightField::new(HeightFieldParams::default());
        let settings = VegetationSettings { coverage: 10, tree_size: 10, leaf_density: 10 };

        let a = ForestPlanner::new(&field, settings.clone()).build(42);
        let b = ForestPlanner::new(&field, settings).build(42);

        assert_eq!(a.branches.len(), b.branches.len());
        assert_eq!(a.leaves.len(), b.leaves.len());
        assert_eq!(a.stats.trees_placed, b.stats.trees_placed);
        if let (Some(ba), Some(bb)) = (a.branches.first(), b.branches.first()) {
            assert_eq!(ba.model.to_cols_array(), bb.model.to_cols_array());
            assert_eq!(ba.radius, bb.radius);
        }
    }

    #[test]
    fn test_seeds_differ() {
        let field = flat_open_field();
        let settings = VegetationSettings { coverage: 5, tree_size: 5, leaf_density: 5 };
        let a = ForestPlanner::new(&field, settings.clone()).build(1);
        let b = ForestPlanner::new(&field, settings).build(2);

        let same = a.branches.len() == b.branches.len()
            && a.branches.first().map(|i| i.model.to_cols_array())
                == b.branches.first().map(|i| i.model.to_cols_array());
        assert!(!same);
    }

    #[test]
    fn test_caps_stop_early_without_overshoot() {
        let field = flat_open_field();
        let planner = ForestPlanner::new(&field, VegetationSettings {
            coverage: 50,
            tree_size: 20,
            leaf_density: 1,
        });
        let forest = planner.build_with_caps(7, 2000, 3000);

        assert!(forest.stats.capped);
        assert!(forest.branches.len() <= 500);
        assert!(forest.leaves.len() <= 3000);
        assert!(forest.stats.trees_placed > 0);
    }

    #[test]
    fn test_full_caps_hold_under_extreme_settings() {
        let field = flat_open_field();
        let planner = ForestPlanner::new(&field, VegetationSettings {
            coverage: 100,
            tree_size: 40,
            leaf_density: 40,
        });
        let forest = planner.build(99);

        assert!(forest.branches.len() <= MAX_BRANCH_INSTANCES);
        assert!(forest.leaves.len() <= MAX_LEAF_INSTANCES);
        assert!(forest.stats.capped);
    }

    #[test]
    fn test_instances_stay_above_sea() {
        let field = HeightField::new(HeightFieldParams::default());
        let sea = field.sea_height();
        let forest = ForestPlanner::new(&field, VegetationSettings {
            coverage: 15,
            tree_size: 10,
            leaf_density: 5,
        })
        .build(7);

        for b in &forest.branches {
            assert!(b.model.w_axis.y > sea);
        }
        for leaf in &forest.leaves {
            assert!(leaf.model.w_axis.y > sea);
        }
    }

    #[test]
    fn test_accepted_placements_respect_biome_rules() {
        let field = HeightField::new(HeightFieldParams::default());
        let params = field.params().clone();
        let sea = field.sea_height();
        let margin = 0.02 * params.height_scale;

        let forest = ForestPlanner::new(&field, VegetationSettings {
            coverage: 10,
            tree_size: 10,
            leaf_density: 1,
        })
        .build(21);

        assert!(forest.stats.trees_placed > 0);
        assert_eq!(forest.roots.len(), forest.stats.trees_placed);

        for root in &forest.roots {
            assert!(root.y > sea + margin);

            let h_norm = clamp01((root.y - sea) / params.height_scale.max(EPS));
            let slope = surface_slope(&field, root.x, root.z);
            assert!(slope <= MAX_SLOPE);
            assert!(grass_weight(h_norm, slope) >= MIN_GRASS_WEIGHT);
        }
    }

    #[test]
    fn test_underwater_world_grows_nothing() {
        // sea above every possible height: no cluster center exists
        let field = HeightField::new(HeightFieldParams {
            sea_level: 10.0,
            ..Default::default()
        });
        let forest = ForestPlanner::new(&field, VegetationSettings::default()).build(3);

        assert_eq!(forest.stats.clusters_placed, 0);
        assert!(forest.branches.is_empty());
        assert!(forest.leaves.is_empty());
    }
}
