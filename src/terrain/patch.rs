//! Terrain patch mesh generation.
//!
//! A patch is a square grid of elevation samples turned into a triangle
//! soup. The sampled grid carries one extra ring of cells on every side so
//! normals and tangents at patch borders are accumulated from the same
//! triangles a neighboring patch would contribute, which keeps shading
//! seamless without any cross-patch communication. Only the interior quads
//! are emitted.
//!
//! Vertex positions are computed in f64 from the patch center so that two
//! adjacent patches produce bit-identical coordinates along their shared
//! edge before the final cast to f32.

use glam::{DVec2, Vec2, Vec3};

use crate::error::{RenderError, RenderResult};

/// Floats per emitted vertex: position, uv, normal, tangent with
/// handedness, barycentric, morph target.
pub const VERTEX_FLOATS: usize = 3 + 2 + 3 + 4 + 3 + 3;

/// Heightfield sample callback. Arguments are world-space x and z.
pub type ElevationFn = dyn Fn(f32, f32) -> f32;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

/// Non-indexed triangle mesh for one terrain patch.
#[derive(Debug, Clone)]
pub struct PatchMesh {
    /// Interleaved vertex attributes, [`VERTEX_FLOATS`] per vertex.
    pub vertex_data: Vec<f32>,
    pub bounds: Aabb,
    pub triangle_count: usize,
}

impl PatchMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertex_data.len() / VERTEX_FLOATS
    }

    /// Vertex data reinterpreted as bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertex_data)
    }
}

/// One sampled grid point with its accumulated shading basis.
#[derive(Debug, Clone, Copy, Default)]
struct GridVertex {
    position: Vec3,
    uv: Vec2,
    normal: Vec3,
    tangent: Vec3,
    bitangent: Vec3,
    handedness: f32,
}

/// Reusable generator for patch meshes.
///
/// The sample grid and output buffer are retained between calls, so
/// generating many patches of the same subdivision level allocates once.
#[derive(Debug, Clone)]
pub struct PatchGenerator {
    subdivisions: usize,
    /// Per-axis sample fractions across the padded grid, in units of the
    /// patch side. Range is [-1/(s+1), 1 + 1/(s+1)].
    fractions: Vec<f64>,
    grid: Vec<GridVertex>,
    vertex_data: Vec<f32>,
}

impl PatchGenerator {
    pub fn new(subdivisions: usize) -> Self {
        let mut generator = Self {
            subdivisions: usize::MAX,
            fractions: Vec::new(),
            grid: Vec::new(),
            vertex_data: Vec::new(),
        };
        generator.set_subdivisions(subdivisions);
        generator
    }

    pub fn subdivisions(&self) -> usize {
        self.subdivisions
    }

    /// Quads per axis in the emitted interior.
    pub fn quads_per_axis(&self) -> usize {
        self.subdivisions + 1
    }

    /// Samples per axis including the padding ring.
    fn grid_dim(&self) -> usize {
        self.subdivisions + 4
    }

    /// Rebuilds the sample template for a new subdivision level.
    pub fn set_subdivisions(&mut self, subdivisions: usize) {
        if self.subdivisions == subdivisions {
            return;
        }
        self.subdivisions = subdivisions;

        let dim = self.grid_dim();
        let cells = (subdivisions + 1) as f64;
        self.fractions.clear();
        self.fractions
            .extend((0..dim).map(|i| (i as f64 - 1.0) / cells));

        self.grid.clear();
        self.grid.resize(dim * dim, GridVertex::default());

        let triangles = 2 * (subdivisions + 1) * (subdivisions + 1);
        self.vertex_data.clear();
        self.vertex_data.reserve(triangles * 3 * VERTEX_FLOATS);
    }

    /// Generates the mesh for a patch centered at `center` (world x, z) with
    /// the given side length, sampling `elevation` for surface height.
    pub fn generate(&mut self, center: DVec2, size: f64, elevation: &ElevationFn) -> PatchMesh {
        let dim = self.grid_dim();

        let mut min_height = f32::INFINITY;
        let mut max_height = f32::NEG_INFINITY;

        for row in 0..dim {
            let fz = self.fractions[row];
            let z = (center.y + (fz - 0.5) * size) as f32;
            for col in 0..dim {
                let fx = self.fractions[col];
                let x = (center.x + (fx - 0.5) * size) as f32;
                let height = elevation(x, z);
                min_height = min_height.min(height);
                max_height = max_height.max(height);

                self.grid[row * dim + col] = GridVertex {
                    position: Vec3::new(x, height, z),
                    uv: Vec2::new(fx as f32, fz as f32),
                    ..GridVertex::default()
                };
            }
        }

        // Accumulate the shading basis over every quad, padding included.
        // The diagonal alternates in a checkerboard so ridge artifacts do
        // not line up along one direction.
        for row in 0..dim - 1 {
            for col in 0..dim - 1 {
                let a = row * dim + col;
                let b = (row + 1) * dim + col;
                let c = row * dim + col + 1;
                let d = (row + 1) * dim + col + 1;
                if (row + col) % 2 == 0 {
                    accumulate_triangle(&mut self.grid, a, b, d);
                    accumulate_triangle(&mut self.grid, c, a, d);
                } else {
                    accumulate_triangle(&mut self.grid, a, b, c);
                    accumulate_triangle(&mut self.grid, c, b, d);
                }
            }
        }

        for vertex in &mut self.grid {
            finalize_basis(vertex);
        }

        self.vertex_data.clear();
        let quads = self.quads_per_axis();
        for row in 1..=quads {
            for col in 1..=quads {
                let a = row * dim + col;
                let b = (row + 1) * dim + col;
                let c = row * dim + col + 1;
                let d = (row + 1) * dim + col + 1;
                if (row + col) % 2 == 0 {
                    emit_triangle(&mut self.vertex_data, &self.grid, a, b, d);
                    emit_triangle(&mut self.vertex_data, &self.grid, c, a, d);
                } else {
                    emit_triangle(&mut self.vertex_data, &self.grid, a, b, c);
                    emit_triangle(&mut self.vertex_data, &self.grid, c, b, d);
                }
            }
        }

        let half = 0.5 * size;
        PatchMesh {
            vertex_data: self.vertex_data.clone(),
            bounds: Aabb {
                min: Vec3::new((center.x - half) as f32, min_height, (center.y - half) as f32),
                max: Vec3::new((center.x + half) as f32, max_height, (center.y + half) as f32),
            },
            triangle_count: 2 * quads * quads,
        }
    }
}

/// Validates a subdivision level against the Morton-addressable grid limit
/// of the mesh's vertex count.
pub fn check_subdivisions(subdivisions: usize) -> RenderResult<()> {
    // Padded sample grid must stay within u16 per axis.
    if subdivisions + 4 > u16::MAX as usize {
        return Err(RenderError::out_of_range(format!(
            "patch subdivisions {subdivisions} exceed the supported grid size"
        )));
    }
    Ok(())
}

fn accumulate_triangle(grid: &mut [GridVertex], i0: usize, i1: usize, i2: usize) {
    let p0 = grid[i0].position;
    let p1 = grid[i1].position;
    let p2 = grid[i2].position;
    let uv0 = grid[i0].uv;
    let uv1 = grid[i1].uv;
    let uv2 = grid[i2].uv;

    let edge1 = p1 - p0;
    let edge2 = p2 - p0;

    // Area-weighted face normal.
    let normal = edge1.cross(edge2);

    let duv1 = uv1 - uv0;
    let duv2 = uv2 - uv0;
    let det = duv1.x * duv2.y - duv2.x * duv1.y;

    let (tangent, bitangent) = if det.abs() > 1e-12 {
        let inv = 1.0 / det;
        (
            (edge1 * duv2.y - edge2 * duv1.y) * inv,
            (edge2 * duv1.x - edge1 * duv2.x) * inv,
        )
    } else {
        (Vec3::ZERO, Vec3::ZERO)
    };

    for index in [i0, i1, i2] {
        grid[index].normal += normal;
        grid[index].tangent += tangent;
        grid[index].bitangent += bitangent;
    }
}

/// Normalizes the accumulated basis, orthogonalizes the tangent against the
/// normal, and derives the bitangent handedness sign.
fn finalize_basis(vertex: &mut GridVertex) {
    let normal = vertex.normal.normalize_or_zero();
    let tangent = (vertex.tangent - normal * normal.dot(vertex.tangent)).normalize_or_zero();
    let handedness = if normal.cross(tangent).dot(vertex.bitangent) < 0.0 {
        -1.0
    } else {
        1.0
    };
    vertex.normal = normal;
    vertex.tangent = tangent;
    vertex.handedness = handedness;
}

const BARYCENTRIC: [[f32; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

fn emit_triangle(out: &mut Vec<f32>, grid: &[GridVertex], i0: usize, i1: usize, i2: usize) {
    for (corner, index) in [i0, i1, i2].into_iter().enumerate() {
        let vertex = &grid[index];
        out.extend_from_slice(&[
            vertex.position.x,
            vertex.position.y,
            vertex.position.z,
            vertex.uv.x,
            vertex.uv.y,
            vertex.normal.x,
            vertex.normal.y,
            vertex.normal.z,
            vertex.tangent.x,
            vertex.tangent.y,
            vertex.tangent.z,
            vertex.handedness,
        ]);
        out.extend_from_slice(&BARYCENTRIC[corner]);
        // Morph target position, written at render time by LOD blending.
        out.extend_from_slice(&[0.0, 0.0, 0.0]);
    }
}
