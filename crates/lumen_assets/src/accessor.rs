//! Accessor resolution: turns an accessor index into a bounds-checked view
//! of buffer memory.
//!
//! Every read the loader makes from a binary buffer goes through an
//! [`AccessorView`], and a view only exists once its whole strided range has
//! been checked against both the buffer view and the backing buffer.

use log::debug;

use crate::{
    buffer::BufferStore,
    document::{Document, optional_usize, required_usize, str_field},
    error::{LoadError, Result},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    UnsignedInt,
    Float,
}

impl ComponentType {
    pub fn from_gl(code: usize) -> Option<Self> {
        match code {
            5120 => Some(Self::Byte),
            5121 => Some(Self::UnsignedByte),
            5122 => Some(Self::Short),
            5123 => Some(Self::UnsignedShort),
            5125 => Some(Self::UnsignedInt),
            5126 => Some(Self::Float),
            _ => None,
        }
    }

    /// Size of one component in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::Byte | Self::UnsignedByte => 1,
            Self::Short | Self::UnsignedShort => 2,
            Self::UnsignedInt | Self::Float => 4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl ElementType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SCALAR" => Some(Self::Scalar),
            "VEC2" => Some(Self::Vec2),
            "VEC3" => Some(Self::Vec3),
            "VEC4" => Some(Self::Vec4),
            "MAT2" => Some(Self::Mat2),
            "MAT3" => Some(Self::Mat3),
            "MAT4" => Some(Self::Mat4),
            _ => None,
        }
    }

    pub fn component_count(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }
}

/// A validated, strided window into one buffer.
#[derive(Clone, Copy, Debug)]
pub struct AccessorView<'a> {
    data: &'a [u8],
    /// Absolute byte offset of element 0 inside the backing buffer.
    offset: usize,
    buffer: usize,
    count: usize,
    stride: usize,
    component_type: ComponentType,
    element_type: ElementType,
}

impl<'a> AccessorView<'a> {
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn element_size(&self) -> usize {
        self.element_type.component_count() * self.component_type.size()
    }

    pub fn buffer_index(&self) -> usize {
        self.buffer
    }

    pub fn byte_offset(&self) -> usize {
        self.offset
    }

    /// Raw bytes of element `i`. Panics if `i >= count`.
    pub fn element(&self, i: usize) -> &'a [u8] {
        let start = i * self.stride;
        &self.data[start..start + self.element_size()]
    }

    /// Decodes every element as `N` little-endian floats.
    ///
    /// `None` unless the accessor is FLOAT, of element type `expected`, and
    /// `expected` has exactly `N` components.
    pub fn read_f32<const N: usize>(&self, expected: ElementType) -> Option<Vec<[f32; N]>> {
        if self.component_type != ComponentType::Float
            || self.element_type != expected
            || expected.component_count() != N
        {
            return None;
        }

        let values = (0..self.count)
            .map(|i| {
                let mut out = [0.0f32; N];
                for (slot, bytes) in out.iter_mut().zip(self.element(i).chunks_exact(4)) {
                    *slot = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                }
                out
            })
            .collect();
        Some(values)
    }

    /// Decodes a SCALAR UNSIGNED_SHORT accessor.
    pub fn read_u16(&self) -> Option<Vec<u16>> {
        if self.component_type != ComponentType::UnsignedShort || self.element_type != ElementType::Scalar {
            return None;
        }
        Some(
            (0..self.count)
                .map(|i| {
                    let b = self.element(i);
                    u16::from_le_bytes([b[0], b[1]])
                })
                .collect(),
        )
    }

    /// Decodes a SCALAR UNSIGNED_INT accessor.
    pub fn read_u32(&self) -> Option<Vec<u32>> {
        if self.component_type != ComponentType::UnsignedInt || self.element_type != ElementType::Scalar {
            return None;
        }
        Some(
            (0..self.count)
                .map(|i| {
                    let b = self.element(i);
                    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
                })
                .collect(),
        )
    }
}

/// Resolves `accessors[index]` into a view over `buffers`.
///
/// Has no side effects; callers decide whether a failure is fatal.
pub fn resolve_accessor<'a>(
    document: &Document,
    buffers: &'a BufferStore,
    index: usize,
) -> Result<AccessorView<'a>> {
    let context = format!("accessors[{index}]");
    let accessor = document
        .item("accessors", index)
        .ok_or_else(|| LoadError::Parse(format!("{context} does not exist")))?;

    let code = required_usize(accessor, "componentType", &context)?;
    let component_type = ComponentType::from_gl(code)
        .ok_or_else(|| LoadError::InvalidFormat(format!("{context}: unknown componentType {code}")))?;

    let type_name = str_field(accessor, "type").ok_or_else(|| LoadError::missing(&context, "type"))?;
    let element_type = ElementType::from_name(type_name)
        .ok_or_else(|| LoadError::InvalidFormat(format!("{context}: unknown type '{type_name}'")))?;

    let count = required_usize(accessor, "count", &context)?;
    let accessor_offset = optional_usize(accessor, "byteOffset", &context)?.unwrap_or(0);

    let view_index = required_usize(accessor, "bufferView", &context)?;
    let view_context = format!("bufferViews[{view_index}]");
    let view = document
        .item("bufferViews", view_index)
        .ok_or_else(|| LoadError::Parse(format!("{context} references missing {view_context}")))?;

    let buffer_index = required_usize(view, "buffer", &view_context)?;
    let buffer = buffers.get(buffer_index).ok_or_else(|| {
        LoadError::Parse(format!("{view_context} references missing buffers[{buffer_index}]"))
    })?;

    let view_offset = optional_usize(view, "byteOffset", &view_context)?.unwrap_or(0);
    let view_length = required_usize(view, "byteLength", &view_context)?;
    if view_length == 0 {
        return Err(LoadError::Parse(format!("{view_context}: byteLength must be positive")));
    }

    let view_end = view_offset.checked_add(view_length);
    if view_end.is_none_or(|end| end > buffer.len()) {
        return Err(LoadError::BoundsExceeded {
            what: view_context,
            offset: view_offset,
            length: view_length,
            limit: buffer.len(),
        });
    }
    let view_bytes = &buffer.bytes()[view_offset..view_offset + view_length];

    let element_size = element_type.component_count() * component_type.size();
    let stride = optional_usize(view, "byteStride", &view_context)?.unwrap_or(element_size);

    let data = if count == 0 {
        &view_bytes[..0]
    } else {
        let required = (count - 1)
            .checked_mul(stride)
            .and_then(|span| span.checked_add(accessor_offset))
            .and_then(|span| span.checked_add(element_size));

        match required {
            Some(required) if required <= view_length => &view_bytes[accessor_offset..required],
            _ => {
                return Err(LoadError::BoundsExceeded {
                    what: format!("{context} ({count} x {stride} byte stride)"),
                    offset: accessor_offset,
                    length: required.map_or(usize::MAX, |r| r - accessor_offset),
                    limit: view_length,
                });
            }
        }
    };

    debug!(
        "Resolved {}: {} x {:?}/{:?}, stride {}, buffer {} @ {}",
        context,
        count,
        element_type,
        component_type,
        stride,
        buffer_index,
        view_offset + accessor_offset
    );

    Ok(AccessorView {
        data,
        offset: view_offset + accessor_offset,
        buffer: buffer_index,
        count,
        stride,
        component_type,
        element_type,
    })
}
