/// Bloom pass
///
/// Bright-pass the previous result, blur it at reduced resolution through a
/// ping-pong chain, then add the blurred glow back onto the original.

use std::sync::Arc;
use glam::Vec2;
use crate::config::BloomConfig;
use crate::error::{Error, Result};
use crate::filter::{Filter, FilterChain, IterationCallback};
use crate::graphics_device::{
    ClearFlags, ColorAttachmentDesc, CommandList, DrawBuffers, Framebuffer, FramebufferDesc, Rect2D,
    Texture, TextureFormat, Viewport,
};
use crate::render_pass::render_pass::{ensure_framebuffer, previous_color, PassContext, RenderPass};
use crate::renderer::geometry::draw_fullscreen_quad;
use crate::renderer::PassParameters;
use crate::resource::Mesh;

const SOURCE: &str = "lumen3d::BloomPass";

pub struct BloomPass {
    config: BloomConfig,
    threshold: Filter,
    combine: Filter,
    chain: FilterChain,
    thresholded: Option<Arc<dyn Framebuffer>>,
    result: Option<Arc<dyn Framebuffer>>,
}

impl BloomPass {
    pub fn new(config: BloomConfig) -> Self {
        let mut chain = FilterChain::new("bloom.chain");
        chain.add_filter(Filter::blur(Vec2::ONE).with_repeat_count(config.blur_iterations));
        Self {
            config,
            threshold: Filter::threshold(config.threshold),
            combine: Filter::combine(),
            chain,
            thresholded: None,
            result: None,
        }
    }

    pub fn config(&self) -> &BloomConfig {
        &self.config
    }

    pub fn chain(&self) -> &FilterChain {
        &self.chain
    }

    fn create(&mut self, ctx: &mut PassContext<'_>, width: u32, height: u32) -> Result<()> {
        self.threshold.create(ctx.device, "bloom")?;
        self.combine.create(ctx.device, "bloom")?;

        ensure_framebuffer(&mut self.thresholded, ctx.device, SOURCE, || FramebufferDesc {
            label: "bloom.thresholded".to_string(),
            width,
            height,
            color_attachments: vec![ColorAttachmentDesc::mipmapped(TextureFormat::RGBA32F)],
            depth_attachment: None,
        })?;
        ensure_framebuffer(&mut self.result, ctx.device, SOURCE, || FramebufferDesc {
            label: "bloom.result".to_string(),
            width,
            height,
            color_attachments: vec![ColorAttachmentDesc::new(TextureFormat::RGBA32F)],
            depth_attachment: None,
        })?;

        if !self.chain.is_created() {
            let downscale = self.config.downscale.max(1);
            self.chain.create(ctx.device, (width / downscale).max(1), (height / downscale).max(1))?;
        }
        Ok(())
    }

    /// Full-screen draw of `filter` into `target` reading `inputs` by unit
    fn apply_filter(
        cmd: &mut dyn CommandList,
        quad: &Mesh,
        filter: &mut Filter,
        target: &Arc<dyn Framebuffer>,
        inputs: &[&Arc<dyn Texture>],
    ) -> Result<()> {
        cmd.bind_framebuffer(target, DrawBuffers::All)?;
        cmd.clear(ClearFlags::COLOR, [0.0, 0.0, 0.0, 0.0])?;
        filter.bind(cmd)?;
        for (unit, texture) in inputs.iter().enumerate() {
            cmd.bind_texture(unit as u32, texture)?;
        }
        filter.set_uniforms(cmd)?;
        draw_fullscreen_quad(cmd, quad)?;
        cmd.unbind_framebuffer(true)
    }
}

impl RenderPass for BloomPass {
    fn name(&self) -> &str {
        "bloom"
    }

    fn render(
        &mut self,
        ctx: &mut PassContext<'_>,
        params: &PassParameters,
        previous: Option<&dyn RenderPass>,
    ) -> Result<()> {
        let scene = previous_color(previous, self.name())?;
        self.create(ctx, params.viewport.width, params.viewport.height)?;
        let (Some(thresholded), Some(result), Some(ping_pong)) = (
            self.thresholded.clone(),
            self.result.clone(),
            self.chain.ping_pong_buffer().cloned(),
        ) else {
            return Err(Error::InvalidResource("bloom framebuffers missing".to_string()));
        };

        Self::apply_filter(ctx.cmd, ctx.frame.quad, &mut self.threshold, &thresholded, &[&scene])?;
        let bright = thresholded.color_attachment(0).cloned().ok_or_else(|| {
            Error::InvalidResource("'bloom.thresholded' has no color attachment".to_string())
        })?;
        ctx.cmd.generate_mipmaps(&bright)?;

        let chain_extent = Viewport::extent(ping_pong.width(), ping_pong.height());
        for index in 0..self.chain.filter_count() {
            if let Some(filter) = self.chain.filter_mut(index) {
                filter.set_resolution(Vec2::new(chain_extent.width as f32, chain_extent.height as f32));
            }
        }
        self.chain.seed(
            ctx.cmd,
            &thresholded,
            Rect2D::new(0, 0, thresholded.width(), thresholded.height()),
        )?;
        let regenerate_mipmaps: &mut IterationCallback<'_> = &mut |cmd, input, _| cmd.generate_mipmaps(input);
        self.chain.render(
            ctx.device,
            ctx.cmd,
            ctx.frame.quad,
            &params.with_viewport(chain_extent),
            Some(regenerate_mipmaps),
        )?;
        let blurred = self.chain.result().cloned().ok_or_else(|| {
            Error::InvalidResource("bloom chain produced no result".to_string())
        })?;

        Self::apply_filter(ctx.cmd, ctx.frame.quad, &mut self.combine, &result, &[&scene, &blurred])?;

        crate::engine_trace!(
            SOURCE,
            "Bloom: {} blur iterations at {}x{}",
            self.chain.total_repeat_count(),
            chain_extent.width,
            chain_extent.height
        );
        Ok(())
    }

    fn pass_result(&self) -> Option<&Arc<dyn Framebuffer>> {
        self.result.as_ref()
    }
}

#[cfg(test)]
#[path = "bloom_pass_tests.rs"]
mod tests;
