/// Buffer trait, buffer descriptor and vertex attribute layouts

use crate::error::Result;

/// What a buffer is bound as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// Per-vertex or per-instance attributes
    Vertex,
    /// Element indices
    Index,
    /// Uniform block storage
    Uniform,
}

/// Expected update frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Written once
    Static,
    /// Rewritten occasionally
    Dynamic,
    /// Rewritten every frame
    Stream,
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone)]
pub struct BufferDesc {
    /// Debug label
    pub label: String,
    /// Binding kind
    pub kind: BufferKind,
    /// Update frequency hint
    pub usage: BufferUsage,
    /// Initial contents; the buffer size is the data length
    pub data: Vec<u8>,
}

/// Buffer resource
///
/// `allocate` replaces the storage (and may change its size); `update`
/// writes into existing storage and never resizes.
pub trait Buffer: Send + Sync {
    /// Debug label
    fn label(&self) -> &str;

    /// Current storage size in bytes
    fn size(&self) -> u64;

    /// Replace the whole storage with `data`
    fn allocate(&self, data: &[u8]) -> Result<()>;

    /// Write `data` at `offset`
    ///
    /// # Errors
    ///
    /// Fails if `offset + data.len()` exceeds the current size.
    fn update(&self, offset: u64, data: &[u8]) -> Result<()>;
}

// ===== VERTEX LAYOUT =====

/// Scalar component type of a vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Byte,
    UByte,
    Short,
    UShort,
    Int,
    UInt,
    Float,
}

impl DataType {
    /// Size of one component in bytes
    pub const fn size_bytes(self) -> u32 {
        match self {
            DataType::Byte | DataType::UByte => 1,
            DataType::Short | DataType::UShort => 2,
            DataType::Int | DataType::UInt | DataType::Float => 4,
        }
    }

    /// Integer attributes are read without conversion to float
    pub const fn is_integer(self) -> bool {
        !matches!(self, DataType::Float)
    }
}

/// One attribute of a vertex or instance layout
///
/// Attributes are packed in declaration order; offsets are implied by the
/// sizes of the preceding attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Component count (1..=4)
    pub components: u32,
    /// Component type
    pub data_type: DataType,
    /// Normalize integer data to [0, 1] / [-1, 1]
    pub normalized: bool,
}

impl VertexAttribute {
    pub const fn float(components: u32) -> Self {
        Self { components, data_type: DataType::Float, normalized: false }
    }

    pub const fn int(components: u32) -> Self {
        Self { components, data_type: DataType::Int, normalized: false }
    }

    /// Size of this attribute in bytes
    pub const fn size_bytes(&self) -> u32 {
        self.components * self.data_type.size_bytes()
    }
}

/// Byte offset of every attribute in `layout`
pub fn attribute_offsets(layout: &[VertexAttribute]) -> Vec<u32> {
    let mut offset = 0;
    layout
        .iter()
        .map(|attribute| {
            let current = offset;
            offset += attribute.size_bytes();
            current
        })
        .collect()
}

/// Sum of the attribute sizes in `layout`
pub fn packed_stride(layout: &[VertexAttribute]) -> u32 {
    layout.iter().map(VertexAttribute::size_bytes).sum()
}
