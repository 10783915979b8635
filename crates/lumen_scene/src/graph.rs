//! Node records -> parent/child graph and root set.

use glam::Mat4;
use log::warn;
use lumen_assets::{
    Document, LoadError, Result,
    document::{as_index, f32_array, index_field, optional_usize, str_field},
    error::check_capacity,
};
use lumen_core::{LoaderConfig, Transform};
use serde_json::Value;

use crate::scene::Node;

#[derive(Debug, Default)]
pub struct NodeGraph {
    pub nodes: Vec<Node>,
    pub roots: Vec<usize>,
}

/// Reads every node, links parents, and picks the roots of the active scene.
///
/// A node listed as a child by two parents ends up with the parent that
/// appears last in the `nodes` array.
pub fn build_nodes(document: &Document, mesh_count: usize, config: &LoaderConfig) -> Result<NodeGraph> {
    let gltf_nodes = document.array("nodes")?;
    check_capacity("nodes", gltf_nodes.len(), config.max_nodes)?;
    let node_count = gltf_nodes.len();

    let mut nodes: Vec<Node> = gltf_nodes
        .iter()
        .enumerate()
        .map(|(index, gltf_node)| read_node(index, gltf_node, node_count, mesh_count, config))
        .collect();

    // Second pass, so every child slot exists before it is written.
    let links: Vec<(usize, usize)> = nodes
        .iter()
        .enumerate()
        .flat_map(|(parent, node)| node.children.iter().map(move |&child| (parent, child)))
        .collect();
    for (parent, child) in links {
        nodes[child].parent = Some(parent);
    }

    let roots = scene_roots(document, &nodes)?;
    Ok(NodeGraph { nodes, roots })
}

fn read_node(index: usize, gltf_node: &Value, node_count: usize, mesh_count: usize, config: &LoaderConfig) -> Node {
    let mesh = index_field(gltf_node, "mesh").and_then(|mesh| {
        if mesh < mesh_count {
            Some(mesh)
        } else {
            warn!("nodes[{index}]: mesh {mesh} does not exist, ignoring");
            None
        }
    });

    let mut children = Vec::new();
    if let Some(entries) = gltf_node.get("children").and_then(Value::as_array) {
        for entry in entries {
            match as_index(entry) {
                Some(child) if child < node_count => children.push(child),
                _ => warn!("nodes[{index}]: dropping invalid child {entry}"),
            }
        }
    }
    if children.len() > config.max_children {
        warn!(
            "nodes[{index}]: {} children exceed the limit of {}, dropping {}",
            children.len(),
            config.max_children,
            children.len() - config.max_children
        );
        children.truncate(config.max_children);
    }

    Node {
        name: str_field(gltf_node, "name").map(str::to_owned),
        mesh,
        parent: None,
        children,
        local_transform: local_transform(gltf_node),
        world_transform: Mat4::IDENTITY,
    }
}

/// A 16-element `matrix` (column-major) wins; otherwise `T * R * S`.
pub fn local_transform(gltf_node: &Value) -> Mat4 {
    if let Some(matrix) = f32_array::<16>(gltf_node, "matrix") {
        return Mat4::from_cols_array(&matrix);
    }

    Transform::from_gltf(
        f32_array::<3>(gltf_node, "translation"),
        f32_array::<4>(gltf_node, "rotation"),
        f32_array::<3>(gltf_node, "scale"),
    )
    .compute_matrix()
}

fn scene_roots(document: &Document, nodes: &[Node]) -> Result<Vec<usize>> {
    let requested = optional_usize(document.root(), "scene", "document")?;
    let scenes = document.array("scenes")?;

    if scenes.is_empty() {
        if let Some(scene) = requested {
            return Err(LoadError::Parse(format!("scene {scene} does not exist")));
        }
        // No scene list: every parentless node is a root.
        return Ok((0..nodes.len()).filter(|&i| nodes[i].parent.is_none()).collect());
    }

    let scene_index = requested.unwrap_or(0);
    let scene = scenes
        .get(scene_index)
        .ok_or_else(|| LoadError::Parse(format!("scene {scene_index} does not exist")))?;

    let mut roots = Vec::new();
    if let Some(entries) = scene.get("nodes").and_then(Value::as_array) {
        for entry in entries {
            match as_index(entry) {
                Some(root) if root < nodes.len() => roots.push(root),
                _ => warn!("scenes[{scene_index}]: dropping invalid root {entry}"),
            }
        }
    }
    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use lumen_assets::ErrorKind;
    use serde_json::json;

    fn build(doc: Value) -> Result<NodeGraph> {
        build_nodes(&Document::from_value(doc), 2, &LoaderConfig::default())
    }

    #[test]
    fn children_get_their_parent() {
        let graph = build(json!({
            "nodes": [{ "children": [1, 2] }, { "children": [3] }, {}, {}],
            "scenes": [{ "nodes": [0] }]
        }))
        .unwrap();

        assert_eq!(graph.nodes[0].parent, None);
        assert_eq!(graph.nodes[1].parent, Some(0));
        assert_eq!(graph.nodes[2].parent, Some(0));
        assert_eq!(graph.nodes[3].parent, Some(1));
        for (parent, node) in graph.nodes.iter().enumerate() {
            for &child in &node.children {
                assert_eq!(graph.nodes[child].parent, Some(parent));
            }
        }
        assert_eq!(graph.roots, vec![0]);
    }

    #[test]
    fn doubly_claimed_child_keeps_last_parent() {
        // Malformed input accepted as-is: node 2 is claimed by 0 and 1.
        let graph = build(json!({ "nodes": [{ "children": [2] }, { "children": [2] }, {}] })).unwrap();
        assert_eq!(graph.nodes[2].parent, Some(1));
    }

    #[test]
    fn children_over_the_limit_are_dropped() {
        let config = LoaderConfig {
            max_children: 2,
            ..Default::default()
        };
        let doc = Document::from_value(json!({ "nodes": [{ "children": [1, 2, 3] }, {}, {}, {}] }));

        let graph = build_nodes(&doc, 0, &config).unwrap();
        assert_eq!(graph.nodes[0].children, vec![1, 2]);
        assert_eq!(graph.nodes[3].parent, None);
    }

    #[test]
    fn invalid_child_entries_are_dropped() {
        let graph = build(json!({ "nodes": [{ "children": [1, 7, -1, "x"] }, {}] })).unwrap();
        assert_eq!(graph.nodes[0].children, vec![1]);
    }

    #[test]
    fn node_cap_is_fatal() {
        let config = LoaderConfig {
            max_nodes: 1,
            ..Default::default()
        };
        let doc = Document::from_value(json!({ "nodes": [{}, {}] }));
        let err = build_nodes(&doc, 0, &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
    }

    #[test]
    fn mesh_references_are_checked() {
        let graph = build(json!({ "nodes": [{ "mesh": 1 }, { "mesh": 5 }, {}] })).unwrap();
        assert_eq!(graph.nodes[0].mesh, Some(1));
        assert_eq!(graph.nodes[1].mesh, None);
        assert_eq!(graph.nodes[2].mesh, None);
    }

    #[test]
    fn matrix_is_copied_column_major() {
        let m: Vec<f32> = (0..16).map(|i| i as f32).collect();
        let local = local_transform(&json!({ "matrix": m, "translation": [9.0, 9.0, 9.0] }));

        assert_eq!(local.x_axis.to_array(), [0.0, 1.0, 2.0, 3.0]);
        assert_eq!(local.w_axis.to_array(), [12.0, 13.0, 14.0, 15.0]);
    }

    #[test]
    fn trs_composes_translation_rotation_scale() {
        let half = std::f32::consts::FRAC_PI_4;
        let local = local_transform(&json!({
            "translation": [1.0, 2.0, 3.0],
            "rotation": [0.0, 0.0, half.sin(), half.cos()],
            "scale": [2.0, 2.0, 2.0]
        }));

        let expected = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))
            * Mat4::from_quat(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2))
            * Mat4::from_scale(Vec3::splat(2.0));
        assert!(local.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn missing_trs_is_identity() {
        assert_eq!(local_transform(&json!({})), Mat4::IDENTITY);
        // A short matrix is ignored in favour of TRS.
        assert_eq!(local_transform(&json!({ "matrix": [1.0, 0.0] })), Mat4::IDENTITY);
    }

    #[test]
    fn roots_come_from_the_selected_scene() {
        let graph = build(json!({
            "nodes": [{}, {}, {}],
            "scenes": [{ "nodes": [0] }, { "nodes": [2, 1, 99] }],
            "scene": 1
        }))
        .unwrap();
        assert_eq!(graph.roots, vec![2, 1]);
    }

    #[test]
    fn scene_defaults_to_zero() {
        let graph = build(json!({
            "nodes": [{}, {}],
            "scenes": [{ "nodes": [1] }, { "nodes": [0] }]
        }))
        .unwrap();
        assert_eq!(graph.roots, vec![1]);
    }

    #[test]
    fn without_scenes_parentless_nodes_are_roots() {
        let graph = build(json!({ "nodes": [{ "children": [2] }, {}, {}] })).unwrap();
        assert_eq!(graph.roots, vec![0, 1]);
    }

    #[test]
    fn missing_scene_is_an_error() {
        let err = build(json!({ "nodes": [{}], "scenes": [{ "nodes": [0] }], "scene": 3 })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);

        let err = build(json!({ "nodes": [{}], "scene": 0 })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }
}
