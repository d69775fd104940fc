/// Vertex array trait - vertex/index buffers plus attribute bindings

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{Buffer, VertexAttribute};

/// Per-vertex buffer bound starting at a given attribute location
#[derive(Clone)]
pub struct VertexBufferBinding {
    pub buffer: Arc<dyn Buffer>,
    pub layout: Vec<VertexAttribute>,
    /// Location of the first attribute in `layout`
    pub first_location: u32,
}

/// Descriptor for creating a vertex array
#[derive(Clone)]
pub struct VertexArrayDesc {
    pub label: String,
    /// Per-vertex buffers (geometry, optional skinning stream)
    pub vertex_buffers: Vec<VertexBufferBinding>,
    /// 32-bit index buffer
    pub index_buffer: Arc<dyn Buffer>,
}

/// Vertex array resource
pub trait VertexArray: Send + Sync {
    /// Debug label
    fn label(&self) -> &str;

    /// Bind `buffer` as a per-instance stream
    ///
    /// Each attribute of `layout` occupies consecutive locations from
    /// `first_location` (vec4 columns for matrices) and advances once per
    /// instance. `stride` is the size of one instance record.
    fn attach_instance_buffer(
        &self,
        buffer: &Arc<dyn Buffer>,
        layout: &[VertexAttribute],
        stride: u32,
        first_location: u32,
    ) -> Result<()>;

    /// Buffer currently bound as the instance stream, if any
    fn instance_buffer(&self) -> Option<Arc<dyn Buffer>>;
}
