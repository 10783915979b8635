//! Scene graph on top of `lumen_assets`: node hierarchy, world transforms
//! and the load / teardown lifecycle.
//!
//! ```no_run
//! use lumen_core::LoaderConfig;
//! use lumen_scene::Scene;
//!
//! let scene = Scene::load("assets/box/box.gltf", &LoaderConfig::default())?;
//! for node in scene.nodes() {
//!     if let Some(mesh) = node.mesh {
//!         let primitives = scene.mesh_primitives(&scene.meshes()[mesh]);
//!         println!("{} primitives at {:?}", primitives.len(), node.world_transform);
//!     }
//! }
//! # Ok::<(), lumen_assets::LoadError>(())
//! ```

pub mod graph;
mod loader;
pub mod propagate;
pub mod scene;

pub use graph::{NodeGraph, build_nodes};
pub use propagate::propagate_world_transforms;
pub use scene::{Node, Scene};
