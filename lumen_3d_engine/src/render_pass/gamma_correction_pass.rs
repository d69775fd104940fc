/// Terminal pass: tone-map and gamma-correct the previous result

use std::sync::Arc;
use crate::error::{Error, Result};
use crate::filter::Filter;
use crate::graphics_device::{ClearFlags, ColorAttachmentDesc, DrawBuffers, Framebuffer, FramebufferDesc, TextureFormat};
use crate::render_pass::render_pass::{ensure_framebuffer, previous_color, PassContext, RenderPass};
use crate::renderer::geometry::draw_fullscreen_quad;
use crate::renderer::PassParameters;

const SOURCE: &str = "lumen3d::GammaCorrectionPass";

pub struct GammaCorrectionPass {
    filter: Filter,
    result: Option<Arc<dyn Framebuffer>>,
}

impl GammaCorrectionPass {
    pub fn new(gamma: f32) -> Self {
        Self {
            filter: Filter::gamma_correct(gamma),
            result: None,
        }
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }
}

impl RenderPass for GammaCorrectionPass {
    fn name(&self) -> &str {
        "gamma_correction"
    }

    fn render(
        &mut self,
        ctx: &mut PassContext<'_>,
        params: &PassParameters,
        previous: Option<&dyn RenderPass>,
    ) -> Result<()> {
        let input = previous_color(previous, self.name())?;
        self.filter.create(ctx.device, "gamma")?;
        let (width, height) = (params.viewport.width, params.viewport.height);
        let target = ensure_framebuffer(&mut self.result, ctx.device, SOURCE, || FramebufferDesc {
            label: "gamma.result".to_string(),
            width,
            height,
            color_attachments: vec![ColorAttachmentDesc::new(TextureFormat::RGBA8)],
            depth_attachment: None,
        })?;
        if target.color_attachments().is_empty() {
            return Err(Error::InvalidResource("'gamma.result' has no color attachment".to_string()));
        }

        let cmd = &mut *ctx.cmd;
        cmd.bind_framebuffer(&target, DrawBuffers::All)?;
        cmd.clear(ClearFlags::COLOR, [0.0, 0.0, 0.0, 1.0])?;
        self.filter.bind(cmd)?;
        cmd.bind_texture(0, &input)?;
        self.filter.set_uniforms(cmd)?;
        draw_fullscreen_quad(cmd, ctx.frame.quad)?;
        cmd.unbind_framebuffer(true)
    }

    fn pass_result(&self) -> Option<&Arc<dyn Framebuffer>> {
        self.result.as_ref()
    }
}

#[cfg(test)]
#[path = "gamma_correction_pass_tests.rs"]
mod tests;
