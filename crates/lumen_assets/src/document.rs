//! Thin typed access over a parsed glTF JSON tree.
//!
//! The JSON tree itself is a `serde_json::Value`; this module only adds the
//! field lookups the loader needs, with two flavours:
//! - strict lookups (`required_usize`, `optional_usize`) that report a
//!   [`LoadError`] when a field is present but malformed,
//! - lenient lookups (`f32_field`, `bool_field`, ...) that return `None` and
//!   let the caller keep its default.

use std::path::Path;

use serde_json::Value;

use crate::error::{LoadError, Result};

#[derive(Debug, Clone)]
pub struct Document {
    root: Value,
}

impl Document {
    pub fn from_slice(bytes: &[u8], path: &Path) -> Result<Self> {
        let root: Value = serde_json::from_slice(bytes).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        if !root.is_object() {
            return Err(LoadError::Parse(format!(
                "'{}' does not contain a JSON object",
                path.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// A top-level array such as `accessors` or `nodes`.
    ///
    /// An absent array reads as empty; a field of the wrong type is an error.
    pub fn array(&self, name: &'static str) -> Result<&[Value]> {
        match self.root.get(name) {
            None => Ok(&[]),
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(LoadError::Parse(format!("top-level '{name}' is not an array"))),
        }
    }

    /// Item `index` of a top-level array, if both exist.
    pub fn item(&self, name: &'static str, index: usize) -> Option<&Value> {
        self.root.get(name)?.as_array()?.get(index)
    }
}

/// Reads a JSON number as a non-negative integer.
///
/// Integral floats (`3.0`) are accepted since some exporters write them.
pub fn as_index(value: &Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return usize::try_from(n).ok();
    }
    let f = value.as_f64()?;
    if f >= 0.0 && f.fract() == 0.0 && f <= usize::MAX as f64 {
        Some(f as usize)
    } else {
        None
    }
}

pub fn index_field(value: &Value, name: &str) -> Option<usize> {
    value.get(name).and_then(as_index)
}

pub fn optional_usize(value: &Value, name: &'static str, context: &str) -> Result<Option<usize>> {
    match value.get(name) {
        None => Ok(None),
        Some(v) => as_index(v).map(Some).ok_or_else(|| {
            LoadError::Parse(format!("{context}: '{name}' must be a non-negative integer"))
        }),
    }
}

pub fn required_usize(value: &Value, name: &'static str, context: &str) -> Result<usize> {
    optional_usize(value, name, context)?.ok_or_else(|| LoadError::missing(context, name))
}

pub fn str_field<'a>(value: &'a Value, name: &str) -> Option<&'a str> {
    value.get(name).and_then(Value::as_str)
}

pub fn f32_field(value: &Value, name: &str) -> Option<f32> {
    value
        .get(name)
        .and_then(Value::as_f64)
        .map(|f| f as f32)
        .filter(|f| f.is_finite())
}

pub fn bool_field(value: &Value, name: &str) -> Option<bool> {
    value.get(name).and_then(Value::as_bool)
}

/// An array of exactly `N` numbers, or `None`.
pub fn f32_array<const N: usize>(value: &Value, name: &str) -> Option<[f32; N]> {
    let items = value.get(name)?.as_array()?;
    if items.len() != N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item.as_f64().map(|f| f as f32).filter(|f| f.is_finite())?;
    }
    Some(out)
}

/// An array of up to `N` numbers where each missing or non-numeric element
/// takes the matching element of `fallback`. `None` if the field is not an
/// array at all.
pub fn f32_array_or<const N: usize>(value: &Value, name: &str, fallback: [f32; N]) -> Option<[f32; N]> {
    let items = value.get(name)?.as_array()?;
    let mut out = fallback;
    for (slot, item) in out.iter_mut().zip(items) {
        if let Some(f) = item.as_f64().map(|f| f as f32).filter(|f| f.is_finite()) {
            *slot = f;
        }
    }
    Some(out)
}
