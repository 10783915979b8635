//! Limits and tunables for scene loading.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default maximum number of binary buffers per document.
pub const DEFAULT_MAX_BUFFERS: usize = 64;
pub const DEFAULT_MAX_MATERIALS: usize = 256;
pub const DEFAULT_MAX_MESHES: usize = 512;
pub const DEFAULT_MAX_PRIMITIVES: usize = 4096;
pub const DEFAULT_MAX_NODES: usize = 4096;
/// Children beyond this count are dropped (with a warning), not rejected.
pub const DEFAULT_MAX_CHILDREN: usize = 128;
/// Alpha given to materials using `KHR_materials_transmission`.
pub const DEFAULT_TRANSMISSION_ALPHA: f32 = 0.5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Per-collection limits applied while loading a scene.
///
/// Missing keys in a config file keep their defaults, so an override file
/// only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub max_buffers: usize,
    pub max_materials: usize,
    pub max_meshes: usize,
    pub max_primitives: usize,
    pub max_nodes: usize,
    pub max_children: usize,
    pub transmission_alpha: f32,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_buffers: DEFAULT_MAX_BUFFERS,
            max_materials: DEFAULT_MAX_MATERIALS,
            max_meshes: DEFAULT_MAX_MESHES,
            max_primitives: DEFAULT_MAX_PRIMITIVES,
            max_nodes: DEFAULT_MAX_NODES,
            max_children: DEFAULT_MAX_CHILDREN,
            transmission_alpha: DEFAULT_TRANSMISSION_ALPHA,
        }
    }
}

impl LoaderConfig {
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(text)?;
        config.transmission_alpha = config.transmission_alpha.clamp(0.0, 1.0);
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_json_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded loader config from {}: {:?}", path.display(), config);
        Ok(config)
    }
}
