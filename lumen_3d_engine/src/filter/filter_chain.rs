/// Sequence of filters over a two-slot ping-pong framebuffer
///
/// Every filter iteration reads the most recently written slot and writes the
/// other one, then the roles swap. The chain never reads and writes the same
/// slot in one iteration.

use std::sync::Arc;
use crate::error::{Error, Result};
use crate::filter::filter::Filter;
use crate::graphics_device::{
    BlitTarget, ClearFlags, ColorAttachmentDesc, CommandList, DrawBuffers, Framebuffer,
    FramebufferDesc, GraphicsDevice, Rect2D, Texture, TextureFilter, TextureFormat,
};
use crate::renderer::geometry::draw_fullscreen_quad;
use crate::renderer::PassParameters;
use crate::resource::Mesh;

/// Slot written by the first iteration
const INITIAL_WRITE_SLOT: usize = 1;

/// Per-iteration hook: command list, input texture, iteration index
pub type IterationCallback<'a> = dyn FnMut(&mut dyn CommandList, &Arc<dyn Texture>, u32) -> Result<()> + 'a;

pub struct FilterChain {
    label: String,
    filters: Vec<Filter>,
    ping_pong: Option<Arc<dyn Framebuffer>>,
    write_slot: usize,
}

impl FilterChain {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            filters: Vec::new(),
            ping_pong: None,
            write_slot: INITIAL_WRITE_SLOT,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Append a filter; returns its index
    pub fn add_filter(&mut self, filter: Filter) -> usize {
        self.filters.push(filter);
        self.filters.len() - 1
    }

    pub fn filter(&self, index: usize) -> Option<&Filter> {
        self.filters.get(index)
    }

    pub fn filter_mut(&mut self, index: usize) -> Option<&mut Filter> {
        self.filters.get_mut(index)
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Iterations performed by one `render` call
    pub fn total_repeat_count(&self) -> u32 {
        self.filters.iter().map(Filter::repeat_count).sum()
    }

    /// Create the ping-pong framebuffer; no-op once created
    pub fn create(&mut self, device: &mut dyn GraphicsDevice, width: u32, height: u32) -> Result<()> {
        if self.ping_pong.is_some() {
            return Ok(());
        }
        let desc = FramebufferDesc {
            label: self.label.clone(),
            width: width.max(1),
            height: height.max(1),
            color_attachments: vec![
                ColorAttachmentDesc::mipmapped(TextureFormat::RGBA32F),
                ColorAttachmentDesc::mipmapped(TextureFormat::RGBA32F),
            ],
            depth_attachment: None,
        };
        let framebuffer = device.create_framebuffer(&desc).map_err(|err| {
            crate::engine_error!("lumen3d::FilterChain", "Failed to create '{}': {}", self.label, err);
            err
        })?;
        crate::engine_debug!(
            "lumen3d::FilterChain",
            "Ping-pong buffer '{}' created ({}x{})",
            self.label,
            desc.width,
            desc.height
        );
        self.ping_pong = Some(framebuffer);
        Ok(())
    }

    pub fn is_created(&self) -> bool {
        self.ping_pong.is_some()
    }

    pub fn ping_pong_buffer(&self) -> Option<&Arc<dyn Framebuffer>> {
        self.ping_pong.as_ref()
    }

    /// Most recently written slot (0 or 1)
    pub fn slot(&self) -> usize {
        1 - self.write_slot
    }

    /// Texture of the most recently written slot
    pub fn result(&self) -> Option<&Arc<dyn Texture>> {
        self.ping_pong.as_ref()?.color_attachment(self.slot())
    }

    fn require_framebuffer(&self) -> Result<Arc<dyn Framebuffer>> {
        self.ping_pong.clone().ok_or_else(|| {
            Error::InvalidResource(format!("filter chain '{}' used before create()", self.label))
        })
    }

    /// Blit attachment 0 of `source` into the slot the next iteration reads
    pub fn seed(&self, cmd: &mut dyn CommandList, source: &Arc<dyn Framebuffer>, source_rect: Rect2D) -> Result<()> {
        let framebuffer = self.require_framebuffer()?;
        let target_rect = Rect2D::new(0, 0, framebuffer.width(), framebuffer.height());
        cmd.blit(
            source,
            0,
            source_rect,
            BlitTarget::Framebuffer { framebuffer: &framebuffer, attachment: self.slot() as u32 },
            target_rect,
            TextureFilter::Linear,
        )
    }

    /// Run every filter for its repeat count; returns the result slot
    ///
    /// Filters not yet compiled are created first. Before each iteration's
    /// uniforms are applied, the input slot is bound at unit 0 and
    /// `on_iteration` (if any) is invoked with it.
    pub fn render(
        &mut self,
        device: &mut dyn GraphicsDevice,
        cmd: &mut dyn CommandList,
        quad: &Mesh,
        params: &PassParameters,
        mut on_iteration: Option<&mut IterationCallback<'_>>,
    ) -> Result<usize> {
        let framebuffer = self.require_framebuffer()?;

        for filter in self.filters.iter_mut() {
            filter.create(device, &self.label)?;
        }

        cmd.bind_framebuffer(&framebuffer, DrawBuffers::Single(self.write_slot as u32))?;
        cmd.set_viewport(params.viewport)?;

        let mut iteration = 0;
        for filter in self.filters.iter_mut() {
            filter.bind(cmd)?;
            for _ in 0..filter.repeat_count() {
                let write = self.write_slot;
                let read = 1 - write;
                debug_assert_ne!(read, write);

                cmd.set_draw_buffers(DrawBuffers::Single(write as u32))?;
                cmd.clear(ClearFlags::COLOR, [0.0, 0.0, 0.0, 0.0])?;

                let input = framebuffer.color_attachment(read).cloned().ok_or_else(|| {
                    Error::InvalidResource(format!("'{}' lacks ping-pong slot {}", self.label, read))
                })?;
                cmd.bind_texture(0, &input)?;
                if let Some(callback) = on_iteration.as_deref_mut() {
                    callback(&mut *cmd, &input, iteration)?;
                }

                filter.set_uniforms(cmd)?;
                draw_fullscreen_quad(cmd, quad)?;

                crate::engine_trace!(
                    "lumen3d::FilterChain",
                    "'{}' iteration {} ({}) read slot {} wrote slot {}",
                    self.label,
                    iteration,
                    filter.kind().name(),
                    read,
                    write
                );
                self.write_slot = read;
                iteration += 1;
            }
        }

        cmd.unbind_framebuffer(true)?;
        Ok(self.slot())
    }
}

#[cfg(test)]
#[path = "filter_chain_tests.rs"]
mod tests;
