use std::path::Path;

use log::{error, info};
use lumen_assets::{
    BufferStore, Document, LoadError, MeshSet, Result, assemble_meshes, material::load_materials,
    path::base_dir,
};
use lumen_core::LoaderConfig;

use crate::{graph::build_nodes, scene::Scene};

impl Scene {
    /// Loads a `.gltf` file and its sidecar buffers into a new scene.
    pub fn load(path: impl AsRef<Path>, config: &LoaderConfig) -> Result<Self> {
        let mut scene = Scene::default();
        scene.reload(path, config)?;
        Ok(scene)
    }

    /// Builds a scene from an already-parsed document; relative URIs resolve
    /// against `base_dir`.
    pub fn from_document(document: &Document, base_dir: &Path, config: &LoaderConfig) -> Result<Self> {
        let mut scene = Scene::default();
        scene.run_steps(document, base_dir, config).inspect_err(|e| {
            error!("Failed to build scene: {e}");
            scene.teardown();
        })?;
        Ok(scene)
    }

    /// Tears this scene down and loads `path` in its place.
    ///
    /// On failure the scene is left torn down, never half populated.
    pub fn reload(&mut self, path: impl AsRef<Path>, config: &LoaderConfig) -> Result<()> {
        let path = path.as_ref();
        self.teardown();
        info!("Loading scene {}", path.display());

        let result = std::fs::read(path)
            .map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })
            .and_then(|bytes| Document::from_slice(&bytes, path))
            .and_then(|document| self.run_steps(&document, &base_dir(path), config));

        match result {
            Ok(()) => {
                info!(
                    "Loaded {}: {} buffers ({} bytes), {} materials, {} meshes, {} primitives, {} nodes",
                    path.display(),
                    self.buffers.len(),
                    self.buffers.total_bytes(),
                    self.materials.len(),
                    self.meshes.len(),
                    self.primitives.len(),
                    self.nodes.len()
                );
                Ok(())
            }
            Err(e) => {
                error!("Failed to load scene {}: {}", path.display(), e);
                self.teardown();
                Err(e)
            }
        }
    }

    /// Buffers -> materials -> primitives -> nodes -> world transforms.
    /// Stops at the first failing step.
    fn run_steps(&mut self, document: &Document, base_dir: &Path, config: &LoaderConfig) -> Result<()> {
        self.buffers = BufferStore::load(document, base_dir, config)?;
        self.materials = load_materials(document, base_dir, config)?;

        let MeshSet { meshes, primitives } =
            assemble_meshes(document, &self.buffers, self.materials.len(), config)?;
        self.meshes = meshes;
        self.primitives = primitives;

        let graph = build_nodes(document, self.meshes.len(), config)?;
        self.nodes = graph.nodes;
        self.roots = graph.roots;

        self.recompute_world_transforms();
        Ok(())
    }
}
