use std::process::ExitCode;

use glam::Vec3;
use log::{error, info};
use lumen_assets::{Indices, Material};
use lumen_core::LoaderConfig;
use lumen_scene::Scene;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let Some(scene_path) = args.next() else {
        error!("usage: lumen_app <scene.gltf> [config.json]");
        return ExitCode::FAILURE;
    };

    let config = match args.next() {
        Some(config_path) => match LoaderConfig::from_json_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => LoaderConfig::default(),
    };

    match Scene::load(&scene_path, &config) {
        Ok(scene) => {
            log_summary(&scene);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{scene_path}: {e} ({:?})", e.kind());
            ExitCode::FAILURE
        }
    }
}

fn log_summary(scene: &Scene) {
    for (index, material) in scene.materials().iter().enumerate() {
        info!("material {index}: {}", describe_material(material));
    }

    for (index, mesh) in scene.meshes().iter().enumerate() {
        info!(
            "mesh {index} {:?}: {} primitives",
            mesh.name.as_deref().unwrap_or(""),
            mesh.primitive_count
        );
        for primitive in scene.mesh_primitives(mesh) {
            let indices = match &primitive.indices {
                Some(Indices::U16(list)) => format!("{} u16 indices", list.len()),
                Some(Indices::U32(list)) => format!("{} u32 indices", list.len()),
                None => "non-indexed".to_owned(),
            };
            info!(
                "  {} vertices, {indices}, uv: {}, tangents: {}, material: {:?}",
                primitive.vertex_count(),
                primitive.has_uv,
                primitive.has_tangents(),
                primitive.material
            );
        }
    }

    log_node_tree(scene);
}

fn describe_material(material: &Material) -> String {
    let [r, g, b, a] = material.settings.base_color;
    format!(
        "{:?} {:?} color ({r:.2}, {g:.2}, {b:.2}, {a:.2}){}",
        material.name.as_deref().unwrap_or(""),
        material.alpha_mode,
        if material.double_sided { " double-sided" } else { "" }
    )
}

/// Logs each root's subtree, following parent links so every node is
/// printed at most once per root.
fn log_node_tree(scene: &Scene) {
    let mut seen = vec![false; scene.nodes().len()];

    for &root in scene.roots() {
        seen.fill(false);
        let mut stack = vec![(root, 0usize)];

        while let Some((index, depth)) = stack.pop() {
            let Some(node) = scene.node(index) else {
                continue;
            };
            if std::mem::replace(&mut seen[index], true) {
                continue;
            }

            let position = node.world_transform.transform_point3(Vec3::ZERO);
            info!(
                "{:indent$}node {index} {:?} at {position}{}",
                "",
                node.name.as_deref().unwrap_or(""),
                node.mesh.map(|mesh| format!(" -> mesh {mesh}")).unwrap_or_default(),
                indent = depth * 2
            );

            for &child in node.children.iter().rev() {
                if scene.node(child).is_some_and(|c| c.parent == Some(index)) {
                    stack.push((child, depth + 1));
                }
            }
        }
    }
}
