use glam::Mat4;
use lumen_assets::{BufferStore, Material, Mesh, Primitive};

use crate::propagate::propagate_world_transforms;

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub name: Option<String>,
    pub mesh: Option<usize>, // Index into the scene's meshes
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub local_transform: Mat4,
    /// Identity until propagation runs; stays identity for unreachable nodes.
    pub world_transform: Mat4,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: None,
            mesh: None,
            parent: None,
            children: Vec::new(),
            local_transform: Mat4::IDENTITY,
            world_transform: Mat4::IDENTITY,
        }
    }
}

/// A fully resolved scene. Owns every buffer, mesh, primitive, material and
/// node it references; all cross references are plain indices.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub(crate) buffers: BufferStore,
    pub(crate) materials: Vec<Material>,
    pub(crate) meshes: Vec<Mesh>,
    pub(crate) primitives: Vec<Primitive>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) roots: Vec<usize>,
}

impl Scene {
    pub fn buffers(&self) -> &BufferStore {
        &self.buffers
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// The primitives making up `mesh`.
    pub fn mesh_primitives(&self, mesh: &Mesh) -> &[Primitive] {
        self.primitives.get(mesh.primitive_range()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
            && self.materials.is_empty()
            && self.meshes.is_empty()
            && self.primitives.is_empty()
            && self.nodes.is_empty()
            && self.roots.is_empty()
    }

    /// Replaces a node's local transform. World transforms are not touched
    /// until [`Scene::recompute_world_transforms`] runs.
    pub fn set_local_transform(&mut self, index: usize, transform: Mat4) -> bool {
        match self.nodes.get_mut(index) {
            Some(node) => {
                node.local_transform = transform;
                true
            }
            None => false,
        }
    }

    /// Rewrites the world transform of every node reachable from a root.
    pub fn recompute_world_transforms(&mut self) {
        propagate_world_transforms(&mut self.nodes, &self.roots);
    }

    /// Releases everything the scene owns and resets all counts to zero.
    ///
    /// Valid on a scene that never loaded, and safe to call more than once.
    pub fn teardown(&mut self) {
        self.buffers.clear();
        self.materials = Vec::new();
        self.meshes = Vec::new();
        self.primitives = Vec::new();
        self.nodes = Vec::new();
        self.roots = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn two_node_scene() -> Scene {
        Scene {
            nodes: vec![
                Node {
                    children: vec![1],
                    local_transform: Mat4::from_translation(Vec3::X),
                    ..Default::default()
                },
                Node {
                    parent: Some(0),
                    local_transform: Mat4::from_translation(Vec3::Y),
                    ..Default::default()
                },
            ],
            roots: vec![0],
            primitives: vec![Primitive::default()],
            meshes: vec![Mesh {
                name: None,
                first_primitive: 0,
                primitive_count: 1,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn teardown_on_default_scene_is_a_no_op() {
        let mut scene = Scene::default();
        scene.teardown();
        scene.teardown();
        assert!(scene.is_empty());
    }

    #[test]
    fn teardown_twice_after_population() {
        let mut scene = two_node_scene();
        scene.teardown();
        assert!(scene.is_empty());
        scene.teardown();
        assert!(scene.is_empty());
    }

    #[test]
    fn edits_take_effect_on_recompute() {
        let mut scene = two_node_scene();
        scene.recompute_world_transforms();
        assert_eq!(
            scene.nodes()[1].world_transform.transform_point3(Vec3::ZERO),
            Vec3::new(1.0, 1.0, 0.0)
        );

        assert!(scene.set_local_transform(0, Mat4::from_translation(Vec3::Z)));
        assert!(!scene.set_local_transform(7, Mat4::IDENTITY));
        scene.recompute_world_transforms();
        assert_eq!(
            scene.nodes()[1].world_transform.transform_point3(Vec3::ZERO),
            Vec3::new(0.0, 1.0, 1.0)
        );
    }

    #[test]
    fn mesh_primitives_slice() {
        let scene = two_node_scene();
        assert_eq!(scene.mesh_primitives(&scene.meshes()[0]).len(), 1);

        let bogus = Mesh {
            name: None,
            first_primitive: 5,
            primitive_count: 2,
        };
        assert!(scene.mesh_primitives(&bogus).is_empty());
    }
}
