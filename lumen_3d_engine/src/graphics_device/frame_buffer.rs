/// Framebuffer trait - a fixed set of render attachments
///
/// The attachment list is decided at creation time and never changes. Passes
/// create their framebuffers lazily on first use, sized to the viewport.

use std::sync::Arc;
use crate::graphics_device::{Texture, TextureFormat, TextureTarget};

/// One color attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorAttachmentDesc {
    pub format: TextureFormat,
    pub target: TextureTarget,
    /// Allocate a mip chain so the attachment can be mipmapped after rendering
    pub mipmapped: bool,
}

impl ColorAttachmentDesc {
    pub const fn new(format: TextureFormat) -> Self {
        Self { format, target: TextureTarget::Texture2D, mipmapped: false }
    }

    pub const fn mipmapped(format: TextureFormat) -> Self {
        Self { format, target: TextureTarget::Texture2D, mipmapped: true }
    }
}

/// Depth (and optional stencil) attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthAttachmentDesc {
    /// Sampleable depth texture (shadow maps)
    Texture { format: TextureFormat },
    /// Write-only renderbuffer, optionally multisampled
    RenderBuffer { format: TextureFormat, samples: u32 },
}

impl DepthAttachmentDesc {
    pub const fn format(&self) -> TextureFormat {
        match self {
            DepthAttachmentDesc::Texture { format } => *format,
            DepthAttachmentDesc::RenderBuffer { format, .. } => *format,
        }
    }
}

/// Descriptor for creating a framebuffer
#[derive(Debug, Clone)]
pub struct FramebufferDesc {
    /// Debug label; attachments are labelled `<label>.color<i>` / `<label>.depth`
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub color_attachments: Vec<ColorAttachmentDesc>,
    pub depth_attachment: Option<DepthAttachmentDesc>,
}

/// Framebuffer resource
pub trait Framebuffer: Send + Sync {
    /// Debug label
    fn label(&self) -> &str;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Color attachment textures, in attachment order
    fn color_attachments(&self) -> &[Arc<dyn Texture>];

    /// Depth texture, when the depth attachment is sampleable
    fn depth_attachment(&self) -> Option<&Arc<dyn Texture>>;

    /// Color attachment `index`, if present
    fn color_attachment(&self, index: usize) -> Option<&Arc<dyn Texture>> {
        self.color_attachments().get(index)
    }
}
