/// GraphicsDevice trait - factory for GPU resources and command submission

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{
    Buffer, BufferDesc, Texture, TextureDesc, Framebuffer, FramebufferDesc,
    ShaderProgram, ShaderProgramDesc, VertexArray, VertexArrayDesc, CommandList,
};

/// Counters exposed by a device for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    /// Command lists submitted since creation
    pub submitted_command_lists: u64,
    /// Live framebuffers
    pub framebuffers: u32,
    /// Live shader programs
    pub shader_programs: u32,
}

/// Graphics device
///
/// Every `create_*` call either returns a complete, usable resource or an
/// error. Programs are linked at creation time and carry their reflection
/// table; framebuffers are checked for completeness at creation time.
pub trait GraphicsDevice: Send + Sync {
    /// Create a buffer (vertex, index, uniform or instance data)
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>>;

    /// Create a texture, optionally uploading initial pixels
    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>>;

    /// Create a framebuffer and all of its attachments
    ///
    /// # Errors
    ///
    /// `Error::IncompleteFramebuffer` when the attachment set is rejected.
    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>>;

    /// Compile and link a shader program
    ///
    /// # Errors
    ///
    /// `Error::ShaderCompilation` with the compiler/linker log.
    fn create_shader_program(&mut self, desc: &ShaderProgramDesc) -> Result<Arc<dyn ShaderProgram>>;

    /// Create a vertex array from vertex and index buffers
    fn create_vertex_array(&mut self, desc: VertexArrayDesc) -> Result<Arc<dyn VertexArray>>;

    /// Create a command list for recording one frame of work
    fn create_command_list(&self) -> Result<Box<dyn CommandList>>;

    /// Execute recorded command lists in order
    fn submit(&mut self, commands: &[&dyn CommandList]) -> Result<()>;

    /// Block until the GPU is idle
    fn wait_idle(&self) -> Result<()>;

    /// Diagnostic counters
    fn stats(&self) -> DeviceStats;
}
