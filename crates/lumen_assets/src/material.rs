use std::path::{Path, PathBuf};

use log::debug;
use lumen_core::LoaderConfig;
use serde_json::Value;

use crate::{
    document::{Document, bool_field, f32_array, f32_array_or, f32_field, index_field, str_field},
    error::{Result, check_capacity},
    path::{is_data_uri, resolve_uri},
};

pub const TRANSMISSION_EXTENSION: &str = "KHR_materials_transmission";

/// Elements of a malformed `baseColorFactor` fall back to these.
const BASE_COLOR_FALLBACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

impl AlphaMode {
    /// `"MASK"` and `"BLEND"` are recognised; anything else is opaque.
    pub fn from_gltf(name: &str) -> Self {
        match name {
            "MASK" => AlphaMode::Mask,
            "BLEND" => AlphaMode::Blend,
            _ => AlphaMode::Opaque,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MaterialSettings {
    pub base_color: [f32; 4],
    pub roughness: f32,
    pub metallic: f32,
    pub emissive: [f32; 3],
}

impl Default for MaterialSettings {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            roughness: 1.0,
            metallic: 1.0,
            emissive: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    pub settings: MaterialSettings,
    pub alpha_mode: AlphaMode,
    /// Only meaningful under [`AlphaMode::Mask`]. Always within [0, 1].
    pub alpha_cutoff: f32,
    pub double_sided: bool,
    pub base_color_texture: Option<PathBuf>,
    pub normal_texture: Option<PathBuf>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            settings: MaterialSettings::default(),
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
            base_color_texture: None,
            normal_texture: None,
        }
    }
}

/// Extracts every material of the document.
///
/// Individual fields never fail; only a material count over the configured
/// maximum does.
pub fn load_materials(document: &Document, base_dir: &Path, config: &LoaderConfig) -> Result<Vec<Material>> {
    let gltf_materials = document.array("materials")?;
    check_capacity("materials", gltf_materials.len(), config.max_materials)?;

    Ok(gltf_materials
        .iter()
        .map(|gltf_mat| extract_material(document, base_dir, gltf_mat, config.transmission_alpha))
        .collect())
}

/// Builds one material from its JSON record. Steps run in a fixed order:
/// the transmission override must see the parsed base color, not the default.
pub fn extract_material(document: &Document, base_dir: &Path, gltf_mat: &Value, transmission_alpha: f32) -> Material {
    let mut material = Material {
        name: str_field(gltf_mat, "name").map(str::to_owned),
        ..Default::default()
    };

    if let Some(mode) = str_field(gltf_mat, "alphaMode") {
        material.alpha_mode = AlphaMode::from_gltf(mode);
    }
    if let Some(cutoff) = f32_field(gltf_mat, "alphaCutoff") {
        material.alpha_cutoff = cutoff.clamp(0.0, 1.0);
    }
    if let Some(double_sided) = bool_field(gltf_mat, "doubleSided") {
        material.double_sided = double_sided;
    }

    let pbr = gltf_mat.get("pbrMetallicRoughness").unwrap_or(&Value::Null);
    if let Some(color) = f32_array_or(pbr, "baseColorFactor", BASE_COLOR_FALLBACK) {
        material.settings.base_color = color;
    }
    if let Some(metallic) = f32_field(pbr, "metallicFactor") {
        material.settings.metallic = metallic.clamp(0.0, 1.0);
    }
    if let Some(roughness) = f32_field(pbr, "roughnessFactor") {
        material.settings.roughness = roughness.clamp(0.0, 1.0);
    }
    if let Some(emissive) = f32_array::<3>(gltf_mat, "emissiveFactor") {
        material.settings.emissive = emissive;
    }

    let has_transmission = gltf_mat
        .get("extensions")
        .and_then(|ext| ext.get(TRANSMISSION_EXTENSION))
        .is_some();
    if has_transmission && material.alpha_mode == AlphaMode::Opaque {
        debug!("Approximating {TRANSMISSION_EXTENSION} as alpha blend ({transmission_alpha})");
        material.alpha_mode = AlphaMode::Blend;
        material.settings.base_color[3] = transmission_alpha;
    }

    material.base_color_texture = pbr
        .get("baseColorTexture")
        .and_then(|info| resolve_texture(document, base_dir, info));
    material.normal_texture = gltf_mat
        .get("normalTexture")
        .and_then(|info| resolve_texture(document, base_dir, info));

    material
}

/// Follows texture info -> `textures[i].source` -> `images[j].uri`.
fn resolve_texture(document: &Document, base_dir: &Path, info: &Value) -> Option<PathBuf> {
    let texture = document.item("textures", index_field(info, "index")?)?;
    let image = document.item("images", index_field(texture, "source")?)?;
    let uri = str_field(image, "uri")?;

    if is_data_uri(uri) {
        debug!("Skipping embedded image data URI");
        return None;
    }
    Some(resolve_uri(base_dir, uri))
}
