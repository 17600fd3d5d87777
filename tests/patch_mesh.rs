//! Patch mesh generation properties, seam continuity in particular.

use glam::DVec2;
use groundworks::terrain::quadtree::NodeId;
use groundworks::terrain::{PatchGenerator, TerrainSystem, VERTEX_FLOATS};

fn wavy(x: f32, z: f32) -> f32 {
    (x * 0.37).sin() * 3.0 + (z * 0.53).cos() * 2.0
}

/// Positions of emitted vertices lying on the given x column, as (z, y)
/// pairs in f32 bit representation for exact comparison.
fn edge_samples(vertex_data: &[f32], x: f32) -> Vec<(u32, u32)> {
    let mut samples: Vec<(u32, u32)> = vertex_data
        .chunks_exact(VERTEX_FLOATS)
        .filter(|v| v[0] == x)
        .map(|v| (v[2].to_bits(), v[1].to_bits()))
        .collect();
    samples.sort();
    samples.dedup();
    samples
}

#[test]
fn adjacent_patches_share_bit_identical_edge_vertices() {
    let subdivisions = 7;
    let size = 32.0;
    let mut generator = PatchGenerator::new(subdivisions);

    // Two side-by-side patches; the right edge of the left patch is the
    // left edge of the right patch.
    let left = generator.generate(DVec2::new(0.0, 0.0), size, &wavy);
    let right = generator.generate(DVec2::new(size, 0.0), size, &wavy);

    let boundary = (size / 2.0) as f32;
    let left_edge = edge_samples(&left.vertex_data, boundary);
    let right_edge = edge_samples(&right.vertex_data, boundary);

    assert!(!left_edge.is_empty());
    assert_eq!(left_edge, right_edge);
}

#[test]
fn quadtree_neighbor_patches_share_edges() {
    // Same check, but with centers derived from quadtree nodes the way the
    // terrain controller derives them.
    let mut system = TerrainSystem::new(4);
    system.set_patch_side_length(31.0);

    let a = NodeId::from_coords(4, 7, 9);
    let b = NodeId::from_coords(4, 8, 9);
    let center_a = system.node_center(a);
    let center_b = system.node_center(b);
    let size = f64::from(system.node_size(4));

    let mut generator = PatchGenerator::new(3);
    let mesh_a = generator.generate(
        DVec2::new(f64::from(center_a.x), f64::from(center_a.y)),
        size,
        &wavy,
    );
    let mesh_b = generator.generate(
        DVec2::new(f64::from(center_b.x), f64::from(center_b.y)),
        size,
        &wavy,
    );

    let boundary = (f64::from(center_a.x) + size / 2.0) as f32;
    let edge_a = edge_samples(&mesh_a.vertex_data, boundary);
    let edge_b = edge_samples(&mesh_b.vertex_data, boundary);

    assert!(!edge_a.is_empty());
    assert_eq!(edge_a, edge_b);
}

#[test]
fn bounds_track_sampled_extremes() {
    let mut generator = PatchGenerator::new(5);
    let mesh = generator.generate(DVec2::new(10.0, -6.0), 12.0, &wavy);

    // Every emitted vertex lies within the box.
    for vertex in mesh.vertex_data.chunks_exact(VERTEX_FLOATS) {
        assert!(vertex[1] >= mesh.bounds.min.y && vertex[1] <= mesh.bounds.max.y);
        assert!(vertex[0] >= mesh.bounds.min.x - 1e-4);
        assert!(vertex[0] <= mesh.bounds.max.x + 1e-4);
    }
    assert!(mesh.bounds.min.y < mesh.bounds.max.y);
}

#[test]
fn normals_are_unit_length_on_rough_terrain() {
    let mut generator = PatchGenerator::new(4);
    let mesh = generator.generate(DVec2::ZERO, 20.0, &wavy);
    for vertex in mesh.vertex_data.chunks_exact(VERTEX_FLOATS) {
        let length =
            (vertex[5] * vertex[5] + vertex[6] * vertex[6] + vertex[7] * vertex[7]).sqrt();
        assert!((length - 1.0).abs() < 1e-4, "normal length {length}");
    }
}

#[test]
fn tangents_are_orthogonal_to_normals() {
    let mut generator = PatchGenerator::new(4);
    let mesh = generator.generate(DVec2::ZERO, 20.0, &wavy);
    for vertex in mesh.vertex_data.chunks_exact(VERTEX_FLOATS) {
        let dot = vertex[5] * vertex[8] + vertex[6] * vertex[9] + vertex[7] * vertex[10];
        assert!(dot.abs() < 1e-3, "normal/tangent dot {dot}");
        assert!(vertex[11].abs() == 1.0);
    }
}

#[test]
fn triangle_count_matches_interior_grid() {
    for subdivisions in [0, 2, 15, 31] {
        let mut generator = PatchGenerator::new(subdivisions);
        let mesh = generator.generate(DVec2::ZERO, 8.0, &wavy);
        let quads = subdivisions + 1;
        assert_eq!(mesh.triangle_count, 2 * quads * quads);
        assert_eq!(
            mesh.vertex_data.len(),
            mesh.triangle_count * 3 * VERTEX_FLOATS
        );
    }
}

#[test]
fn byte_view_matches_float_data() {
    let mut generator = PatchGenerator::new(1);
    let mesh = generator.generate(DVec2::ZERO, 4.0, &wavy);
    assert_eq!(mesh.as_bytes().len(), mesh.vertex_data.len() * 4);
}
