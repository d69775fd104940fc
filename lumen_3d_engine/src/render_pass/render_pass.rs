/// RenderPass trait - one ordered stage of the frame
///
/// A pass reads the previous pass's result and the frame's camera, records
/// its work on the frame's command list, and exposes its own framebuffer as
/// `pass_result` for the next pass (or the final blit).

use std::sync::Arc;
use crate::error::{Error, Result};
use crate::graphics_device::{CommandList, Framebuffer, FramebufferDesc, GraphicsDevice, Texture};
use crate::renderer::{InstanceBuffer, LightParameters, PassParameters, RenderCommand};
use crate::resource::Mesh;

/// Frame contents shared by every pass
pub struct FrameData<'a> {
    pub commands: &'a [RenderCommand],
    pub lights: &'a [LightParameters],
    pub instance_buffer: &'a mut InstanceBuffer,
    /// Unit quad for full-screen draws
    pub quad: &'a Mesh,
}

/// Everything a pass needs to record one frame
pub struct PassContext<'a> {
    pub device: &'a mut dyn GraphicsDevice,
    pub cmd: &'a mut dyn CommandList,
    pub frame: FrameData<'a>,
}

/// Render pass
pub trait RenderPass: Send {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Record this pass
    ///
    /// `previous` is the pass that ran before this one, `None` for the first.
    fn render(
        &mut self,
        ctx: &mut PassContext<'_>,
        params: &PassParameters,
        previous: Option<&dyn RenderPass>,
    ) -> Result<()>;

    /// Framebuffer holding this pass's output, once rendered
    fn pass_result(&self) -> Option<&Arc<dyn Framebuffer>>;
}

/// First color attachment of the previous pass's result
///
/// # Errors
///
/// `Error::InvalidResource` when there is no previous pass or it has not
/// produced a result.
pub fn previous_color(previous: Option<&dyn RenderPass>, consumer: &str) -> Result<Arc<dyn Texture>> {
    let previous = previous.ok_or_else(|| {
        Error::InvalidResource(format!("'{}' needs a previous pass", consumer))
    })?;
    previous
        .pass_result()
        .and_then(|framebuffer| framebuffer.color_attachment(0))
        .cloned()
        .ok_or_else(|| {
            Error::InvalidResource(format!(
                "'{}' has no color result for '{}'",
                previous.name(),
                consumer
            ))
        })
}

/// Create the framebuffer in `slot` on first use
///
/// Later calls return the existing framebuffer unchanged, whatever `desc`
/// would describe.
pub(crate) fn ensure_framebuffer(
    slot: &mut Option<Arc<dyn Framebuffer>>,
    device: &mut dyn GraphicsDevice,
    source: &str,
    desc: impl FnOnce() -> FramebufferDesc,
) -> Result<Arc<dyn Framebuffer>> {
    if let Some(framebuffer) = slot {
        return Ok(Arc::clone(framebuffer));
    }

    let desc = desc();
    let framebuffer = device.create_framebuffer(&desc).map_err(|err| {
        crate::engine_error!(source, "Failed to create framebuffer '{}': {}", desc.label, err);
        err
    })?;
    crate::engine_debug!(
        source,
        "Framebuffer '{}' created ({}x{}, {} color attachments)",
        desc.label,
        desc.width,
        desc.height,
        desc.color_attachments.len()
    );
    *slot = Some(Arc::clone(&framebuffer));
    Ok(framebuffer)
}
