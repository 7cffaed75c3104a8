//! Turtle interpretation of L-system strings
//!
//! Walks the rewritten string with a stack of turtle frames and emits
//! branch and leaf instance transforms. Each bracket pair scopes a
//! subtree; state is pushed and restored by value, so a pop discards
//! everything the subtree changed. Unbalanced brackets degrade
//! gracefully: excess pops are no-ops, unclosed pushes just leave the
//! turtle in its nested frame.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

use crate::core::Prng;
use crate::math::mix;
use crate::vegetation::lsystem::RuleSet;

/// Segment overlap factor hiding seams between consecutive cylinders.
const SEGMENT_OVERLAP: f32 = 1.05;
/// How hard thin branches bend toward world up.
const TROPISM_STRENGTH: f32 = 0.05;
/// Chance that a slender segment sprouts a leaf cluster.
const LEAF_CHANCE: f32 = 0.9;

/// Per-tree generation parameters.
#[derive(Clone, Debug)]
pub struct LSystemParams {
    pub iterations: u32,
    pub step_length: f32,
    /// Branching angle for the rotation symbols, degrees.
    pub base_angle_deg: f32,
    /// Random jitter added to every rotation, degrees.
    pub angle_jitter_deg: f32,
    pub base_radius: f32,
    /// Radius multiplier applied at every push; at most 1, so radius
    /// never grows away from the root.
    pub radius_decay: f32,
    pub leaf_density: f32,
}

impl Default for LSystemParams {
    fn default() -> Self {
        Self {
            iterations: 3,
            step_length: 0.06,
            base_angle_deg: 35.0,
            angle_jitter_deg: 8.0,
            base_radius: 0.03,
            radius_decay: 0.8,
            leaf_density: 1.0,
        }
    }
}

impl LSystemParams {
    /// Out-of-range values are clamped to safe minimums, not rejected.
    fn sanitized(&self) -> Self {
        Self {
            iterations: self.iterations.max(1),
            step_length: self.step_length.max(1e-4),
            base_angle_deg: self.base_angle_deg,
            angle_jitter_deg: self.angle_jitter_deg.max(0.0),
            base_radius: self.base_radius.max(1e-4),
            radius_decay: self.radius_decay.clamp(0.05, 1.0),
            leaf_density: self.leaf_density.max(0.0),
        }
    }
}

/// One cylinder segment: model transform plus its radius. The radius
/// rides along for diagnostics; the renderer ignores it.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct BranchInstance {
    pub model: Mat4,
    pub radius: f32,
    _pad: [f32; 3],
}

impl BranchInstance {
    pub fn new(model: Mat4, radius: f32) -> Self {
        Self { model, radius, _pad: [0.0; 3] }
    }
}

/// One billboarded ellipsoid leaf.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LeafInstance {
    pub model: Mat4,
}

/// Geometry emitted for one tree, in the tree's local frame.
#[derive(Debug, Default)]
pub struct TreeGeometry {
    pub branches: Vec<BranchInstance>,
    pub leaves: Vec<LeafInstance>,
    /// Draw segments from `F` symbols; leaf-cluster twigs not included.
    pub segment_count: usize,
    /// Leaf clusters emitted, growth nodes and probabilistic ones alike.
    pub cluster_count: usize,
}

/// Turtle frame. Copied onto the stack at `[`, restored at `]`.
#[derive(Clone, Copy)]
struct Turtle {
    pos: Vec3,
    forward: Vec3,
    up: Vec3,
    right: Vec3,
    radius: f32,
}

impl Turtle {
    fn rotate(&mut self, angle: f32, axis: Vec3) {
        let rot = Quat::from_axis_angle(axis, angle);
        self.forward = (rot * self.forward).normalize();
        self.right = self.forward.cross(self.up).normalize();
        self.up = self.right.cross(self.forward).normalize();
    }

    fn roll(&mut self, angle: f32) {
        let rot = Quat::from_axis_angle(self.forward, angle);
        self.up = (rot * self.up).normalize();
        self.right = self.forward.cross(self.up).normalize();
    }
}

/// Rewrite the axiom with the rules, then interpret the result.
pub fn grow(params: &LSystemParams, axiom: &str, rules: &RuleSet, rng: &mut Prng) -> TreeGeometry {
    let params = params.sanitized();
    let symbols = rules.expand(axiom, params.iterations);
    interpret(&symbols, &params, rng)
}

/// Interpret an already-rewritten symbol string into tree geometry.
pub fn interpret(symbols: &str, params: &LSystemParams, rng: &mut Prng) -> TreeGeometry {
    let params = params.sanitized();
    let mut out = TreeGeometry::default();
    let mut stack: Vec<Turtle> = Vec::new();

    // root at the origin, growing along +Y
    let mut t = Turtle {
        pos: Vec3::ZERO,
        forward: Vec3::Y,
        up: Vec3::Z,
        right: Vec3::Y.cross(Vec3::Z),
        radius: params.base_radius,
    };

    let base_angle = params.base_angle_deg.to_radians();
    let jitter_max = params.angle_jitter_deg.to_radians();

    for c in symbols.chars() {
        match c {
            'F' => {
                let p0 = t.pos;
                let p1 = p0 + t.forward * params.step_length;
                t.pos = p1;

                // phototropism: only branches that have thinned out bend
                // upward, and thinner ones bend more; the trunk stays
                // straight
                if t.radius < params.base_radius * 0.7 {
                    let r_norm = (t.radius / params.base_radius).clamp(0.2, 1.0);
                    let k = TROPISM_STRENGTH * (1.0 - r_norm);
                    t.forward = (t.forward + Vec3::Y * k).normalize();
                    t.right = t.forward.cross(t.up).normalize();
                    t.up = t.right.cross(t.forward).normalize();
                }

                if let Some(model) = segment_matrix(p0, p1, t.radius) {
                    out.branches.push(BranchInstance::new(model, t.radius));
                    out.segment_count += 1;
                }

                // slender branches occasionally hang a leaf cluster
                if t.radius < params.base_radius * 0.8 && rng.next_f32() < LEAF_CHANCE {
                    emit_leaf_cluster(&mut out, &t, &params, rng);
                }
            }
            'X' => {
                // growth node: a cluster of leaves lives here
                emit_leaf_cluster(&mut out, &t, &params, rng);
            }
            '+' => {
                let axis = t.up;
                t.rotate(base_angle + jitter_max * rng.signed_unit(), axis);
            }
            '-' => {
                let axis = t.up;
                t.rotate(-(base_angle + jitter_max * rng.signed_unit()), axis);
            }
            '&' => {
                let axis = t.right;
                t.rotate(base_angle + jitter_max * rng.signed_unit(), axis);
            }
            '^' => {
                let axis = t.right;
                t.rotate(-(base_angle + jitter_max * rng.signed_unit()), axis);
            }
            '[' => {
                stack.push(t);
                t.radius *= params.radius_decay;
                // random roll so sibling branches leave the parent plane
                t.roll(jitter_max * 0.7 * rng.signed_unit());
            }
            ']' => {
                // popping an empty stack is a no-op
                if let Some(saved) = stack.pop() {
                    t = saved;
                }
            }
            _ => {}
        }
    }

    out
}

/// Transform aligning the canonical unit cylinder (y axis, height 1,
/// centered) to span p0..p1 at the given radius. None for degenerate
/// segments, which callers skip.
fn segment_matrix(p0: Vec3, p1: Vec3, radius: f32) -> Option<Mat4> {
    let dir = p1 - p0;
    let len = dir.length();
    if len < 1e-4 {
        return None;
    }
    let w = dir / len;

    let up = Vec3::Y;
    let axis = up.cross(w);
    let axis_len = axis.length();
    let rotation = if axis_len < 1e-4 {
        if up.dot(w) < 0.0 {
            // antiparallel: flip around x
            Mat4::from_axis_angle(Vec3::X, std::f32::consts::PI)
        } else {
            Mat4::IDENTITY
        }
    } else {
        let cos = up.dot(w).clamp(-1.0, 1.0);
        Mat4::from_axis_angle(axis / axis_len, cos.acos())
    };

    let scale = Mat4::from_scale(Vec3::new(radius, len * SEGMENT_OVERLAP, radius));
    let translation = Mat4::from_translation(0.5 * (p0 + p1));
    Some(translation * rotation * scale)
}

/// One short twig plus a scatter of ellipsoidal leaves near its tip.
fn emit_leaf_cluster(out: &mut TreeGeometry, t: &Turtle, params: &LSystemParams, rng: &mut Prng) {
    let center = t.pos;
    let branch_radius = t.radius;

    // short twig angling away from the branch
    let twig_base = (0.4 * t.forward + 0.8 * t.up).try_normalize().unwrap_or(t.up);
    let jitter = Vec3::new(rng.signed_unit(), rng.signed_unit(), rng.signed_unit())
        .try_normalize()
        .unwrap_or(Vec3::Y);
    let twig_dir = (twig_base + 0.4 * jitter).try_normalize().unwrap_or(twig_base);

    let twig_len = 0.25 * params.step_length * (0.7 + 0.6 * (0.5 + 0.5 * rng.signed_unit()));
    let twig_end = center + twig_dir * twig_len;
    let twig_radius = branch_radius * 0.5;
    if let Some(model) = segment_matrix(center, twig_end, twig_radius) {
        out.branches.push(BranchInstance::new(model, twig_radius));
    }

    // thinner branches carry more leaves
    let r_norm = (branch_radius / params.base_radius).clamp(0.2, 1.0);
    let base_count = 26 + ((1.0 - r_norm) * 32.0) as i32;
    let leaf_count = (base_count as f32 * params.leaf_density) as usize;

    // spread widens as branches thin out
    let radius_scale = mix(0.6, 1.1, 1.0 - r_norm);

    for _ in 0..leaf_count {
        let u = 0.5 * (rng.signed_unit() + 1.0);
        let v = 0.5 * (rng.signed_unit() + 1.0);

        let ang = std::f32::consts::TAU * u;
        let rr = (0.01 + 0.02 * v) * radius_scale;
        let along = 0.01 + 0.03 * v;
        let up_bias = 0.2 + 0.8 * v;

        let offset = t.forward * along
            + t.right * (ang.cos() * rr * 1.1)
            + t.up * (ang.sin() * rr * up_bias);
        let p = twig_end + offset;

        let mut s = 0.010 * (0.7 + 0.8 * v);
        s *= 0.85 + 0.3 * rng.signed_unit();
        let leaf_scale = Vec3::new(s, s * 0.55, s);

        let yaw = std::f32::consts::PI * (rng.signed_unit() + 1.0);
        let model = Mat4::from_translation(p)
            * Mat4::from_axis_angle(t.up, yaw)
            * Mat4::from_scale(leaf_scale);
        out.leaves.push(LeafInstance { model });
    }

    out.cluster_count += 1;
}
