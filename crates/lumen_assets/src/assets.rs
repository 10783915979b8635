use bytemuck::{Pod, Zeroable};

// #[repr(C)] keeps the field order so the slice can be handed to a GPU as-is.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Normal used when a primitive has no usable NORMAL attribute.
pub const DEFAULT_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];

/// Owned index array; the variant fixes the stride (2 or 4 bytes).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Indices {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl Indices {
    pub fn len(&self) -> usize {
        match self {
            Indices::U16(v) => v.len(),
            Indices::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes per index.
    pub fn stride(&self) -> usize {
        match self {
            Indices::U16(_) => 2,
            Indices::U32(_) => 4,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Indices::U16(v) => bytemuck::cast_slice(v),
            Indices::U32(v) => bytemuck::cast_slice(v),
        }
    }

    /// Largest index value, if any.
    pub fn max_index(&self) -> Option<u32> {
        match self {
            Indices::U16(v) => v.iter().copied().max().map(u32::from),
            Indices::U32(v) => v.iter().copied().max(),
        }
    }
}

/// One drawable unit: interleaved vertices, optional indices and tangents.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Primitive {
    pub vertices: Vec<Vertex>,
    pub indices: Option<Indices>,
    /// xyz direction + w handedness, one per vertex when present.
    pub tangents: Option<Vec<[f32; 4]>>,
    pub material: Option<usize>,
    pub has_uv: bool,
}

impl Primitive {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.as_ref().map_or(0, Indices::len)
    }

    pub fn index_stride(&self) -> Option<usize> {
        self.indices.as_ref().map(Indices::stride)
    }

    pub fn has_tangents(&self) -> bool {
        self.tangents.is_some()
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// A named, contiguous range of the scene's primitive collection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Mesh {
    pub name: Option<String>,
    pub first_primitive: usize,
    pub primitive_count: usize,
}

impl Mesh {
    pub fn primitive_range(&self) -> std::ops::Range<usize> {
        self.first_primitive..self.first_primitive + self.primitive_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);

        let primitive = Primitive {
            vertices: vec![Vertex::zeroed(); 3],
            ..Default::default()
        };
        assert_eq!(primitive.vertex_bytes().len(), 96);
    }

    #[test]
    fn index_stride_follows_variant() {
        let short = Indices::U16(vec![0, 1, 2]);
        let long = Indices::U32(vec![0, 1, 2]);

        assert_eq!(short.stride(), 2);
        assert_eq!(long.stride(), 4);
        assert_eq!(short.as_bytes().len(), 6);
        assert_eq!(long.as_bytes().len(), 12);
        assert_eq!(short.max_index(), Some(2));
        assert_eq!(Indices::U32(Vec::new()).max_index(), None);
    }

    #[test]
    fn unindexed_primitive_reports_zero_indices() {
        let primitive = Primitive::default();
        assert_eq!(primitive.index_count(), 0);
        assert_eq!(primitive.index_stride(), None);
        assert!(!primitive.has_tangents());
    }

    #[test]
    fn mesh_range() {
        let mesh = Mesh {
            name: None,
            first_primitive: 3,
            primitive_count: 2,
        };
        assert_eq!(mesh.primitive_range(), 3..5);
    }
}
