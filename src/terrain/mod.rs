//! Camera-driven terrain level of detail.
//!
//! [`TerrainSystem`] maintains a balanced [`Quadtree`] refined around camera
//! positions, generates a [`PatchMesh`] for every visible leaf, and registers
//! the resulting objects with a scene collection. Patch meshes are cached by
//! node identity and survive refinement changes until explicitly evicted, so
//! a camera moving back and forth does not regenerate geometry.

pub mod patch;
pub mod quadtree;

use std::collections::HashMap;

use glam::{DVec2, Vec2, Vec3};

use crate::error::RenderResult;

pub use patch::{check_subdivisions, Aabb, ElevationFn, PatchGenerator, PatchMesh, VERTEX_FLOATS};
pub use quadtree::{morton, NodeId, Quadtree};

/// Handle to an object registered with a scene collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneHandle(pub u64);

/// Handle to a surface material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u64);

/// Receiver for terrain patch objects. Implemented by whatever scene or
/// render graph consumes the generated geometry.
pub trait SceneCollection {
    fn add_object(&mut self, object: SceneHandle);
    fn remove_object(&mut self, object: SceneHandle);
}

/// One generated patch, alive as long as its quadtree node has existed as a
/// leaf since the last eviction.
#[derive(Debug, Clone)]
pub struct TerrainPatch {
    pub mesh: PatchMesh,
    pub object: SceneHandle,
    pub material: Option<MaterialHandle>,
    /// Whether the patch's node is currently a leaf. Renderers skip
    /// invisible patches; the mesh is retained for when refinement returns.
    pub visible: bool,
}

/// Quadtree terrain controller.
pub struct TerrainSystem {
    max_depth: u8,
    patch_side_length: f64,
    /// Node side length per depth, index 0 is the root.
    node_sizes: Vec<f64>,
    patch_material: Option<MaterialHandle>,
    elevation: Box<dyn Fn(f32, f32) -> f32>,
    scene: Option<Box<dyn SceneCollection>>,
    quadtree: Quadtree,
    generator: PatchGenerator,
    patches: HashMap<NodeId, TerrainPatch>,
    next_object: u64,
}

impl TerrainSystem {
    /// Creates a terrain system whose quadtree refines down `max_depth`
    /// levels. The surface starts flat with unit patches.
    pub fn new(max_depth: u8) -> Self {
        let mut system = Self {
            max_depth,
            patch_side_length: 0.0,
            node_sizes: Vec::new(),
            patch_material: None,
            elevation: Box::new(|_, _| 0.0),
            scene: None,
            quadtree: Quadtree::new(max_depth),
            generator: PatchGenerator::new(0),
            patches: HashMap::new(),
            next_object: 1,
        };
        system.set_patch_side_length(1.0);
        system
    }

    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    pub fn patch_side_length(&self) -> f32 {
        self.patch_side_length as f32
    }

    /// Sets the world-space side length of a maximum-depth patch and
    /// rebuilds the per-depth size table. Cached patches keep their old
    /// geometry until evicted.
    pub fn set_patch_side_length(&mut self, length: f32) {
        self.patch_side_length = f64::from(length);
        self.node_sizes = (0..=self.max_depth)
            .map(|depth| {
                self.patch_side_length * f64::from(1u32 << (self.max_depth - depth))
            })
            .collect();
    }

    pub fn patch_subdivisions(&self) -> usize {
        self.generator.subdivisions()
    }

    /// Sets the interior subdivision level of generated patches.
    pub fn set_patch_subdivisions(&mut self, subdivisions: usize) -> RenderResult<()> {
        check_subdivisions(subdivisions)?;
        self.generator.set_subdivisions(subdivisions);
        Ok(())
    }

    pub fn patch_material(&self) -> Option<MaterialHandle> {
        self.patch_material
    }

    pub fn set_patch_material(&mut self, material: Option<MaterialHandle>) {
        self.patch_material = material;
    }

    /// Sets the heightfield sampled during patch generation.
    pub fn set_elevation_function(&mut self, elevation: Box<dyn Fn(f32, f32) -> f32>) {
        self.elevation = elevation;
    }

    /// Attaches the scene collection that receives patch objects.
    pub fn set_scene_collection(&mut self, scene: Box<dyn SceneCollection>) {
        self.scene = Some(scene);
    }

    /// Side length of a node at the given depth.
    pub fn node_size(&self, depth: u8) -> f32 {
        self.node_sizes[depth as usize] as f32
    }

    /// World-space (x, z) center of a node. Computed in f64 so adjacent
    /// nodes derive bit-identical shared coordinates.
    pub fn node_center(&self, node: NodeId) -> Vec2 {
        let center = self.node_center_f64(node);
        Vec2::new(center.x as f32, center.y as f32)
    }

    fn node_center_f64(&self, node: NodeId) -> DVec2 {
        let size = self.node_sizes[node.depth as usize];
        let base = -self.node_sizes[0] * 0.5 + size * 0.5;
        let (x, y) = node.coords();
        DVec2::new(
            base + f64::from(x) * size,
            base + f64::from(y) * size,
        )
    }

    /// Maximum-depth node containing the given world position, clamped to
    /// the terrain extent.
    fn node_at(&self, position: Vec3) -> NodeId {
        let resolution = i64::from(NodeId::resolution(self.max_depth));
        let half_root = self.node_sizes[0] * 0.5;

        let cell = |value: f64| -> u32 {
            let index = ((value + half_root) / self.patch_side_length).floor() as i64;
            index.clamp(0, resolution - 1) as u32
        };

        NodeId::from_coords(
            self.max_depth,
            cell(f64::from(position.x)),
            cell(f64::from(position.z)),
        )
    }

    pub fn quadtree(&self) -> &Quadtree {
        &self.quadtree
    }

    pub fn patch(&self, node: NodeId) -> Option<&TerrainPatch> {
        self.patches.get(&node)
    }

    pub fn patches(&self) -> impl Iterator<Item = (NodeId, &TerrainPatch)> {
        self.patches.iter().map(|(node, patch)| (*node, patch))
    }

    /// Rebuilds the quadtree around the given camera positions, generates
    /// meshes for leaves that have none, and updates patch visibility.
    pub fn update(&mut self, cameras: &[Vec3]) {
        self.quadtree.clear();
        for camera in cameras {
            let node = self.node_at(*camera);
            self.quadtree.insert(node);
        }

        let missing: Vec<NodeId> = self
            .quadtree
            .leaves()
            .filter(|node| !self.patches.contains_key(node))
            .collect();

        for node in missing {
            let center = self.node_center_f64(node);
            let size = self.node_sizes[node.depth as usize];
            let mesh = self.generator.generate(center, size, &*self.elevation);

            let object = SceneHandle(self.next_object);
            self.next_object += 1;
            if let Some(scene) = self.scene.as_mut() {
                scene.add_object(object);
            }

            self.patches.insert(
                node,
                TerrainPatch {
                    mesh,
                    object,
                    material: self.patch_material,
                    visible: true,
                },
            );
        }

        let quadtree = &self.quadtree;
        for (node, patch) in self.patches.iter_mut() {
            patch.visible = quadtree.is_leaf(*node);
        }

        log::trace!(
            "terrain update: {} leaves, {} cached patches",
            quadtree.leaves().count(),
            self.patches.len(),
        );
    }

    /// Evicts every cached patch whose node is no longer a leaf, removing
    /// its object from the scene collection.
    pub fn remove_stale_patches(&mut self) {
        let quadtree = &self.quadtree;
        let mut evicted = Vec::new();
        self.patches.retain(|node, patch| {
            let keep = quadtree.is_leaf(*node);
            if !keep {
                evicted.push(patch.object);
            }
            keep
        });

        if !evicted.is_empty() {
            log::debug!("evicting {} stale terrain patches", evicted.len());
            if let Some(scene) = self.scene.as_mut() {
                for object in evicted {
                    scene.remove_object(object);
                }
            }
        }
    }
}

/// Screen-space error of a feature with the given geometric error, viewed
/// from `distance` through a camera with the given horizontal field of view
/// (radians) and resolution (pixels).
pub fn screen_space_error(
    horizontal_fov: f64,
    horizontal_resolution: f64,
    distance: f64,
    geometric_error: f64,
) -> f64 {
    (geometric_error * horizontal_resolution) / (2.0 * distance * (horizontal_fov * 0.5).tan())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_sizes_halve_per_depth() {
        let mut system = TerrainSystem::new(5);
        system.set_patch_side_length(31.0);

        for depth in 1..=5u8 {
            let coarser = system.node_size(depth - 1);
            let finer = system.node_size(depth);
            assert_eq!(coarser, finer * 2.0);
        }
        assert_eq!(system.node_size(5), 31.0);
    }

    #[test]
    fn corner_node_center() {
        let mut system = TerrainSystem::new(3);
        system.set_patch_side_length(4.0);

        // Root spans 32 world units; cell (0, 0) at full depth is centered
        // half a patch in from the corner.
        let center = system.node_center(NodeId::from_coords(3, 0, 0));
        assert_eq!(center, Vec2::new(-14.0, -14.0));

        let root = system.node_center(NodeId::new(0, 0));
        assert_eq!(root, Vec2::ZERO);
    }

    #[test]
    fn screen_space_error_halves_with_distance() {
        let fov = std::f64::consts::FRAC_PI_2;
        let near = screen_space_error(fov, 1920.0, 10.0, 0.5);
        let far = screen_space_error(fov, 1920.0, 20.0, 0.5);
        assert!((near - 2.0 * far).abs() < 1e-9);
    }
}
