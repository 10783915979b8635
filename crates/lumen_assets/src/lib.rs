//! Asset-level glTF loading: buffers, accessors, primitives and materials.
//!
//! Nothing here knows about the node hierarchy; `lumen_scene` drives these
//! steps and assembles the results into a scene.

pub mod accessor;
pub mod assets;
pub mod buffer;
pub mod document;
pub mod error;
pub mod material;
pub mod path;
pub mod primitive;

pub use accessor::{AccessorView, ComponentType, ElementType, resolve_accessor};
pub use assets::{Indices, Mesh, Primitive, Vertex};
pub use buffer::{Buffer, BufferStore};
pub use document::Document;
pub use error::{ErrorKind, LoadError, Result};
pub use material::{AlphaMode, Material, MaterialSettings};
pub use primitive::{MeshSet, assemble_meshes};
