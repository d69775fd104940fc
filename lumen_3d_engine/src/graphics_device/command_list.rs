/// CommandList trait - records one frame of GPU work
///
/// State set on a command list (blend, depth, culling, bound program and
/// textures) persists until changed, as on an immediate-mode context. Work is
/// executed when the list is handed to `GraphicsDevice::submit`.

use std::sync::Arc;
use bitflags::bitflags;
use crate::error::Result;
use crate::graphics_device::{
    Buffer, Framebuffer, ShaderProgram, Texture, TextureFilter, UniformLocation,
    UniformValue, VertexArray,
};

bitflags! {
    /// Buffers affected by a clear
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        const COLOR = 0b001;
        const DEPTH = 0b010;
        const STENCIL = 0b100;
    }
}

/// Viewport rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport covering a `width` x `height` target from the origin
    pub const fn extent(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// 2D rectangle used by blits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect2D {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

impl From<Viewport> for Rect2D {
    fn from(v: Viewport) -> Self {
        Rect2D::new(v.x as i32, v.y as i32, v.width, v.height)
    }
}

/// Face culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    None,
    Front,
    Back,
}

/// Fixed blend configurations used by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendState {
    /// Blending off
    Disabled,
    /// `SRC_ALPHA, ONE_MINUS_SRC_ALPHA`
    Alpha,
    /// `ONE, ONE`
    Additive,
}

/// Color attachments written by subsequent draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawBuffers {
    /// Every color attachment of the bound framebuffer
    All,
    /// A single color attachment
    Single(u32),
    /// No color output (depth-only passes)
    None,
}

/// Destination of a blit
#[derive(Clone, Copy)]
pub enum BlitTarget<'a> {
    /// A color attachment of an offscreen framebuffer
    Framebuffer {
        framebuffer: &'a Arc<dyn Framebuffer>,
        attachment: u32,
    },
    /// The host's presentation surface
    Presentation,
}

/// Command list for recording rendering commands
pub trait CommandList: Send {
    /// Begin recording
    fn begin(&mut self) -> Result<()>;

    /// End recording
    fn end(&mut self) -> Result<()>;

    /// Bind an offscreen framebuffer as the render target
    ///
    /// Sets the viewport to the framebuffer extent. The previous viewport is
    /// kept so `unbind_framebuffer(true)` can restore it.
    fn bind_framebuffer(&mut self, framebuffer: &Arc<dyn Framebuffer>, draw_buffers: DrawBuffers) -> Result<()>;

    /// Select which color attachments of the bound framebuffer are written
    fn set_draw_buffers(&mut self, draw_buffers: DrawBuffers) -> Result<()>;

    /// Return to the presentation target, optionally restoring the viewport
    fn unbind_framebuffer(&mut self, restore_viewport: bool) -> Result<()>;

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Clear the selected buffers of the current target
    ///
    /// Color is cleared to `color`, depth to 1.0 and stencil to 0.
    fn clear(&mut self, flags: ClearFlags, color: [f32; 4]) -> Result<()>;

    fn set_depth_test(&mut self, enabled: bool) -> Result<()>;

    fn set_cull_mode(&mut self, mode: CullMode) -> Result<()>;

    fn set_blend_state(&mut self, state: BlendState) -> Result<()>;

    /// Make `program` current for uniforms and draws
    fn bind_program(&mut self, program: &Arc<dyn ShaderProgram>) -> Result<()>;

    /// Write a uniform of the current program
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) -> Result<()>;

    /// Bind `buffer` to uniform block `block_index` of `program` through `binding`
    fn bind_uniform_block(
        &mut self,
        program: &Arc<dyn ShaderProgram>,
        block_index: u32,
        binding: u32,
        buffer: &Arc<dyn Buffer>,
    ) -> Result<()>;

    /// Bind `texture` to sampler unit `unit`
    fn bind_texture(&mut self, unit: u32, texture: &Arc<dyn Texture>) -> Result<()>;

    /// Rebuild the mip chain of `texture` from its base level
    fn generate_mipmaps(&mut self, texture: &Arc<dyn Texture>) -> Result<()>;

    /// Write `data` into `buffer` at `offset`, ordered with the recorded draws
    fn write_buffer(&mut self, buffer: &Arc<dyn Buffer>, offset: u64, data: &[u8]) -> Result<()>;

    /// Replace the storage of `buffer` with `data`, ordered with the recorded draws
    fn reallocate_buffer(&mut self, buffer: &Arc<dyn Buffer>, data: &[u8]) -> Result<()>;

    /// Indexed draw; `instance_count` > 1 draws instanced
    fn draw_indexed(&mut self, vertex_array: &Arc<dyn VertexArray>, index_count: u32, instance_count: u32) -> Result<()>;

    /// Copy a color attachment region into another target
    fn blit(
        &mut self,
        source: &Arc<dyn Framebuffer>,
        source_attachment: u32,
        source_rect: Rect2D,
        target: BlitTarget<'_>,
        target_rect: Rect2D,
        filter: TextureFilter,
    ) -> Result<()>;

    /// Set a uniform by name on the current program
    ///
    /// Returns `Ok(false)` when `program` has no such uniform.
    fn set_named_uniform(
        &mut self,
        program: &Arc<dyn ShaderProgram>,
        name: &str,
        value: UniformValue,
    ) -> Result<bool> {
        match program.reflection().uniform(name) {
            Some(location) => {
                self.set_uniform(location, value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Bind a uniform block by name
    ///
    /// Returns `Ok(false)` when `program` has no such block.
    fn bind_named_uniform_block(
        &mut self,
        program: &Arc<dyn ShaderProgram>,
        name: &str,
        binding: u32,
        buffer: &Arc<dyn Buffer>,
    ) -> Result<bool> {
        match program.reflection().uniform_block(name) {
            Some(index) => {
                self.bind_uniform_block(program, index, binding, buffer)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
