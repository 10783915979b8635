//! Mesh / primitive assembly.
//!
//! Failures here are recovered locally:
//! - a bad NORMAL, TEXCOORD_0 or TANGENT degrades to "attribute absent",
//! - a bad POSITION or index accessor drops that one primitive.
//! Only a mesh count over the configured maximum aborts the load.

use log::warn;
use lumen_core::LoaderConfig;
use serde_json::Value;

use crate::{
    accessor::{ComponentType, ElementType, resolve_accessor},
    assets::{DEFAULT_NORMAL, Indices, Mesh, Primitive, Vertex},
    buffer::BufferStore,
    document::{Document, index_field, str_field},
    error::{Result, check_capacity},
};

#[derive(Debug, Default)]
pub struct MeshSet {
    pub meshes: Vec<Mesh>,
    pub primitives: Vec<Primitive>,
}

/// Builds every mesh of the document. Mesh `i` covers a contiguous range of
/// `primitives`, assigned in document order.
pub fn assemble_meshes(
    document: &Document,
    buffers: &BufferStore,
    material_count: usize,
    config: &LoaderConfig,
) -> Result<MeshSet> {
    let gltf_meshes = document.array("meshes")?;
    check_capacity("meshes", gltf_meshes.len(), config.max_meshes)?;

    let mut set = MeshSet::default();

    for (mesh_index, gltf_mesh) in gltf_meshes.iter().enumerate() {
        let first_primitive = set.primitives.len();
        let gltf_primitives = gltf_mesh
            .get("primitives")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for (primitive_index, gltf_primitive) in gltf_primitives.iter().enumerate() {
            if set.primitives.len() >= config.max_primitives {
                warn!(
                    "Primitive limit ({}) reached: dropping {} primitive(s) of meshes[{}]",
                    config.max_primitives,
                    gltf_primitives.len() - primitive_index,
                    mesh_index
                );
                break;
            }

            let context = format!("meshes[{mesh_index}].primitives[{primitive_index}]");
            if let Some(primitive) =
                assemble_primitive(document, buffers, gltf_primitive, material_count, &context)
            {
                set.primitives.push(primitive);
            }
        }

        set.meshes.push(Mesh {
            name: str_field(gltf_mesh, "name").map(str::to_owned),
            first_primitive,
            primitive_count: set.primitives.len() - first_primitive,
        });
    }

    Ok(set)
}

/// Builds one primitive, or `None` if it has to be skipped.
pub fn assemble_primitive(
    document: &Document,
    buffers: &BufferStore,
    gltf_primitive: &Value,
    material_count: usize,
    context: &str,
) -> Option<Primitive> {
    let attributes = gltf_primitive.get("attributes").unwrap_or(&Value::Null);

    let Some(position_accessor) = index_field(attributes, "POSITION") else {
        warn!("{context}: no POSITION attribute, skipping primitive");
        return None;
    };
    let positions = match resolve_accessor(document, buffers, position_accessor) {
        Ok(view) => view.read_f32::<3>(ElementType::Vec3),
        Err(e) => {
            warn!("{context}: POSITION unusable ({e}), skipping primitive");
            return None;
        }
    };
    let Some(positions) = positions else {
        warn!("{context}: POSITION is not FLOAT VEC3, skipping primitive");
        return None;
    };
    let vertex_count = positions.len();

    let normals = read_attribute::<3>(
        document,
        buffers,
        attributes,
        "NORMAL",
        ElementType::Vec3,
        vertex_count,
        context,
    );
    let uvs = read_attribute::<2>(
        document,
        buffers,
        attributes,
        "TEXCOORD_0",
        ElementType::Vec2,
        vertex_count,
        context,
    );
    let tangents = read_attribute::<4>(
        document,
        buffers,
        attributes,
        "TANGENT",
        ElementType::Vec4,
        vertex_count,
        context,
    );

    let indices = match index_field(gltf_primitive, "indices") {
        None => None,
        Some(accessor) => Some(read_indices(document, buffers, accessor, context)?),
    };

    if let Some(max) = indices.as_ref().and_then(Indices::max_index) {
        if max as usize >= vertex_count {
            warn!("{context}: index {max} out of range for {vertex_count} vertices, skipping primitive");
            return None;
        }
    }

    let material = index_field(gltf_primitive, "material").and_then(|index| {
        if index < material_count {
            Some(index)
        } else {
            warn!("{context}: material {index} does not exist, using none");
            None
        }
    });

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, position)| Vertex {
            position: *position,
            normal: normals.as_ref().map_or(DEFAULT_NORMAL, |n| n[i]),
            uv: uvs.as_ref().map_or([0.0, 0.0], |uv| uv[i]),
        })
        .collect();

    Some(Primitive {
        vertices,
        indices,
        tangents,
        material,
        has_uv: uvs.is_some(),
    })
}

/// Reads an optional FLOAT attribute of the given element type. Anything
/// unusable reads as absent.
fn read_attribute<const N: usize>(
    document: &Document,
    buffers: &BufferStore,
    attributes: &Value,
    name: &str,
    element_type: ElementType,
    vertex_count: usize,
    context: &str,
) -> Option<Vec<[f32; N]>> {
    let accessor = index_field(attributes, name)?;

    let values = match resolve_accessor(document, buffers, accessor) {
        Ok(view) => view.read_f32::<N>(element_type),
        Err(e) => {
            warn!("{context}: ignoring {name} ({e})");
            return None;
        }
    };
    let Some(values) = values else {
        warn!("{context}: ignoring {name}, expected FLOAT {element_type:?}");
        return None;
    };
    if values.len() != vertex_count {
        warn!(
            "{context}: ignoring {name}, {} elements for {vertex_count} vertices",
            values.len()
        );
        return None;
    }
    Some(values)
}

fn read_indices(document: &Document, buffers: &BufferStore, accessor: usize, context: &str) -> Option<Indices> {
    let view = match resolve_accessor(document, buffers, accessor) {
        Ok(view) => view,
        Err(e) => {
            warn!("{context}: indices unusable ({e}), skipping primitive");
            return None;
        }
    };

    let indices = match view.component_type() {
        ComponentType::UnsignedShort => view.read_u16().map(Indices::U16),
        ComponentType::UnsignedInt => view.read_u32().map(Indices::U32),
        _ => None,
    };
    if indices.is_none() {
        warn!(
            "{context}: unsupported index type {:?}/{:?}, skipping primitive",
            view.element_type(),
            view.component_type()
        );
    }
    indices
}
