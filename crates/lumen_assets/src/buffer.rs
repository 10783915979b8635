use std::path::Path;

use base64::Engine;
use log::debug;
use lumen_core::LoaderConfig;

use crate::{
    document::{Document, optional_usize, str_field},
    error::{LoadError, Result, check_capacity},
    path::{is_data_uri, resolve_uri},
};

/// One binary blob referenced by `buffers[i].uri`. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    data: Vec<u8>,
}

impl Buffer {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Every buffer of a document, in document order (buffer index == array index).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferStore {
    buffers: Vec<Buffer>,
}

impl BufferStore {
    pub fn from_buffers(buffers: Vec<Vec<u8>>) -> Self {
        Self {
            buffers: buffers.into_iter().map(Buffer::new).collect(),
        }
    }

    /// Loads every entry of `buffers`, resolving file URIs against `base_dir`.
    pub fn load(document: &Document, base_dir: &Path, config: &LoaderConfig) -> Result<Self> {
        let entries = document.array("buffers")?;
        check_capacity("buffers", entries.len(), config.max_buffers)?;

        let mut buffers = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let context = format!("buffers[{index}]");
            let uri = str_field(entry, "uri").ok_or_else(|| LoadError::missing(&context, "uri"))?;

            let data = if is_data_uri(uri) {
                decode_data_uri(uri, &context)?
            } else {
                let path = resolve_uri(base_dir, uri);
                let data = std::fs::read(&path).map_err(|source| LoadError::Io {
                    path: path.clone(),
                    source,
                })?;
                debug!("Loaded buffer {} from {} ({} bytes)", index, path.display(), data.len());
                data
            };

            if let Some(declared) = optional_usize(entry, "byteLength", &context)? {
                if declared > data.len() {
                    return Err(LoadError::BoundsExceeded {
                        what: format!("{context} declared byteLength"),
                        offset: 0,
                        length: declared,
                        limit: data.len(),
                    });
                }
            }

            buffers.push(Buffer::new(data));
        }

        Ok(Self { buffers })
    }

    pub fn get(&self, index: usize) -> Option<&Buffer> {
        self.buffers.get(index)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Buffer> {
        self.buffers.iter()
    }

    /// Total bytes held across all buffers.
    pub fn total_bytes(&self) -> usize {
        self.buffers.iter().map(Buffer::len).sum()
    }

    /// Releases every buffer. Safe to call repeatedly.
    pub fn clear(&mut self) {
        self.buffers = Vec::new();
    }
}

fn decode_data_uri(uri: &str, context: &str) -> Result<Vec<u8>> {
    let (header, payload) = uri
        .split_once(',')
        .ok_or_else(|| LoadError::Parse(format!("{context}: data URI has no payload")))?;

    if !header.ends_with(";base64") {
        return Err(LoadError::Parse(format!(
            "{context}: only base64 data URIs are supported"
        )));
    }

    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| LoadError::Parse(format!("{context}: invalid base64 payload: {e}")))
}
