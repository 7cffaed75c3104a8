//! Terrain grid mesh generation
//!
//! Rebuilt wholesale whenever any terrain parameter changes; there is no
//! incremental update path.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::heightfield::HeightField;

/// Times the ground texture tiles across the terrain.
const UV_TILE: f32 = 30.0;

/// Neighbor ring offsets for smoothed normal estimation.
const RING: [[i32; 2]; 8] = [
    [-1, -1], [0, -1], [1, -1], [1, 0],
    [1, 1], [0, 1], [-1, 1], [-1, 0],
];

/// Interleaved terrain vertex. The third attribute is the color slot
/// reused for texture coordinates; its z component is a placeholder.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 3],
}

/// Flat vertex list for one terrain build.
pub struct TerrainMesh {
    pub resolution: u32,
    pub vertices: Vec<TerrainVertex>,
}

impl TerrainMesh {
    /// Tessellate the height field into `resolution` x `resolution`
    /// quads, two triangles each.
    pub fn generate(field: &HeightField, resolution: u32) -> Self {
        let resolution = resolution.max(1);
        let mut vertices = Vec::with_capacity((resolution * resolution * 6) as usize);

        for x in 0..resolution as i32 {
            for y in 0..resolution as i32 {
                let corners = [(x, y), (x + 1, y), (x + 1, y + 1), (x, y + 1)];

                let p: Vec<Vec3> = corners
                    .iter()
                    .map(|&(r, c)| grid_position(field, r, c, resolution))
                    .collect();
                let n: Vec<Vec3> = corners
                    .iter()
                    .map(|&(r, c)| grid_normal(field, r, c, resolution))
                    .collect();
                let uv: Vec<[f32; 3]> = corners
                    .iter()
                    .map(|&(r, c)| {
                        [
                            r as f32 / resolution as f32 * UV_TILE,
                            c as f32 / resolution as f32 * UV_TILE,
                            0.0,
                        ]
                    })
                    .collect();

                for &i in &[0usize, 1, 2, 0, 2, 3] {
                    vertices.push(TerrainVertex {
                        position: p[i].to_array(),
                        normal: n[i].to_array(),
                        uv: uv[i],
                    });
                }
            }
        }

        Self { resolution, vertices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Raw byte view for GPU buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

fn grid_position(field: &HeightField, row: i32, col: i32, resolution: u32) -> Vec3 {
    let x = row as f32 / resolution as f32;
    let y = col as f32 / resolution as f32;
    // raw height: underwater terrain keeps its true shape
    Vec3::new(x, field.height(x, y), y)
}

/// Smoothed vertex normal: average of cross products to the 8-neighbor
/// ring. Cheaper central differences facet visibly on coarse grids.
fn grid_normal(field: &HeightField, row: i32, col: i32, resolution: u32) -> Vec3 {
    let v = grid_position(field, row, col, resolution);

    let mut normal = Vec3::ZERO;
    for i in 0..8 {
        let a = RING[i];
        let b = RING[(i + 1) % 8];
        let p1 = grid_position(field, row + a[0], col + a[1], resolution);
        let p2 = grid_position(field, row + b[0], col + b[1], resolution);
        normal += (p1 - v).cross(p2 - v);
    }

    if normal.length_squared() < 1e-12 {
        return Vec3::Y;
    }
    let normal = normal.normalize();
    // consistent winding: normals always face away from the ground
    if normal.y < 0.0 { -normal } else { normal }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::heightfield::HeightFieldParams;

    fn small_field() -> HeightField {
        HeightField::new(HeightFieldParams::default())
    }

    #[test]
    fn test_vertex_count() {
        let mesh = TerrainMesh::generate(&small_field(), 8);
        assert_eq!(mesh.vertex_count(), 8 * 8 * 6);
    }

    #[test]
    fn test_resolution_clamped() {
        let mesh = TerrainMesh::generate(&small_field(), 0);
        assert_eq!(mesh.resolution, 1);
        assert_eq!(mesh.vertex_count(), 6);
    }

    #[test]
    fn test_deterministic() {
        let field = small_field();
        let a = TerrainMesh::generate(&field, 4);
        let b = TerrainMesh::generate(&field, 4);
        for (va, vb) in a.vertices.iter().zip(&b.vertices) {
            assert_eq!(va.position, vb.position);
            assert_eq!(va.normal, vb.normal);
            assert_eq!(va.uv, vb.uv);
        }
    }

    #[test]
    fn test_normals_unit_and_upward() {
        let mesh = TerrainMesh::generate(&small_field(), 8);
        for v in &mesh.vertices {
            let n = Vec3::from_array(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-4);
            assert!(n.y >= 0.0);
        }
    }

    #[test]
    fn test_underwater_shape_not_clamped() {
        // Sea far above the terrain: the surface accessor clamps, the
        // mesh does not.
        let field = HeightField::new(HeightFieldParams {
            sea_level: 10.0,
            ..Default::default()
        });
        let mesh = TerrainMesh::generate(&field, 8);
        let min_y = mesh
            .vertices
            .iter()
            .map(|v| v.position[1])
            .fold(f32::INFINITY, f32::min);
        assert!(min_y < 10.0);
        assert_eq!(field.surface_height(0.3, 0.3), 10.0);
    }

    #[test]
    fn test_upload_bytes_length() {
        let mesh = TerrainMesh::generate(&small_field(), 4);
        assert_eq!(
            mesh.as_bytes().len(),
            mesh.vertex_count() * std::mem::size_of::<TerrainVertex>()
        );
        assert_eq!(std::mem::size_of::<TerrainVertex>(), 36);
    }

    #[test]
    fn test_uv_tiling() {
        let mesh = TerrainMesh::generate(&small_field(), 4);
        let max_u = mesh.vertices.iter().map(|v| v.uv[0]).fold(0.0, f32::max);
        assert_eq!(max_u, UV_TILE);
    }
}
