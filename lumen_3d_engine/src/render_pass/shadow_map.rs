/// Depth-only shadow map for one directional light
///
/// Rendered from an orthographic light-space camera centred on the origin,
/// with front-face culling so the depth stored is that of back faces.

use std::sync::Arc;
use glam::{Mat4, Vec2, Vec3};
use crate::config::ShadowConfig;
use crate::error::{Error, Result};
use crate::graphics_device::{
    BlendState, ClearFlags, CommandList, CullMode, DepthAttachmentDesc, DrawBuffers, Framebuffer,
    FramebufferDesc, GraphicsDevice, Texture, TextureFormat, Viewport,
};
use crate::render_pass::render_pass::ensure_framebuffer;
use crate::renderer::geometry::{draw_geometry, GeometryBlocks, GeometryPrograms};
use crate::renderer::shaders::{SHADOW_FRAGMENT, SHADOW_INSTANCED_VERTEX, SHADOW_VERTEX};
use crate::renderer::{InstanceBuffer, PassParameters, RenderCommand};

const SOURCE: &str = "lumen3d::ShadowMap";

/// Directions closer to vertical than this use +Z as the up vector
const VERTICAL_THRESHOLD: f32 = 0.999;

/// Light-space camera of a directional light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSpace {
    pub view: Mat4,
    pub projection: Mat4,
    /// Near and far planes, as seen by the lighting shader (`uNF`)
    pub near_far: Vec2,
}

impl LightSpace {
    /// Orthographic camera looking along `direction`
    ///
    /// The box spans `[-extent, extent]` on both axes with near `-extent` and
    /// far `extent + depth_padding`; the eye sits at `-direction * extent / 4`.
    /// A zero direction is treated as straight down.
    pub fn directional(direction: Vec3, config: &ShadowConfig) -> Self {
        let mut direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            direction = Vec3::NEG_Y;
        }
        let up = if direction.dot(Vec3::Y).abs() > VERTICAL_THRESHOLD { Vec3::Z } else { Vec3::Y };

        let extent = config.extent;
        let near = -extent;
        let far = extent + config.depth_padding;
        let eye = -direction * extent / 4.0;

        Self {
            view: Mat4::look_at_rh(eye, Vec3::ZERO, up),
            projection: Mat4::orthographic_rh_gl(-extent, extent, -extent, extent, near, far),
            near_far: Vec2::new(near, far),
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// Shadow map target and its depth-only programs
pub struct ShadowMap {
    config: ShadowConfig,
    framebuffer: Option<Arc<dyn Framebuffer>>,
    programs: Option<GeometryPrograms>,
    blocks: Option<GeometryBlocks>,
}

impl ShadowMap {
    pub fn new(config: ShadowConfig) -> Self {
        Self {
            config,
            framebuffer: None,
            programs: None,
            blocks: None,
        }
    }

    pub fn config(&self) -> &ShadowConfig {
        &self.config
    }

    /// Create the depth target and programs; no-op once created
    pub fn create(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        let size = self.config.map_size;
        ensure_framebuffer(&mut self.framebuffer, device, SOURCE, || FramebufferDesc {
            label: "shadow.map".to_string(),
            width: size,
            height: size,
            color_attachments: Vec::new(),
            depth_attachment: Some(DepthAttachmentDesc::Texture { format: TextureFormat::Depth32F }),
        })?;

        if self.programs.is_none() {
            self.programs = Some(GeometryPrograms::create(
                device,
                "shadow",
                SHADOW_VERTEX,
                SHADOW_INSTANCED_VERTEX,
                SHADOW_FRAGMENT,
            )?);
        }
        if self.blocks.is_none() {
            self.blocks = Some(GeometryBlocks::create(device, "shadow", false)?);
        }
        Ok(())
    }

    pub fn is_created(&self) -> bool {
        self.framebuffer.is_some() && self.programs.is_some() && self.blocks.is_some()
    }

    pub fn framebuffer(&self) -> Option<&Arc<dyn Framebuffer>> {
        self.framebuffer.as_ref()
    }

    /// Sampleable depth texture
    pub fn depth_texture(&self) -> Option<&Arc<dyn Texture>> {
        self.framebuffer.as_ref()?.depth_attachment()
    }

    /// Record the depth-only draw of every command from `light_space`
    ///
    /// Leaves blending disabled, depth test on and back-face culling
    /// restored. Returns the number of geometry draws.
    pub fn render(
        &mut self,
        device: &mut dyn GraphicsDevice,
        cmd: &mut dyn CommandList,
        commands: &[RenderCommand],
        instance_buffer: &mut InstanceBuffer,
        light_space: &LightSpace,
    ) -> Result<u32> {
        self.create(device)?;
        let (Some(framebuffer), Some(programs), Some(blocks)) = (&self.framebuffer, &self.programs, &self.blocks) else {
            return Err(Error::InvalidResource("shadow map resources missing after create()".to_string()));
        };

        let size = self.config.map_size;
        let params = PassParameters::new(Viewport::extent(size, size), light_space.view, light_space.projection);

        cmd.set_blend_state(BlendState::Disabled)?;
        cmd.set_depth_test(true)?;
        cmd.set_cull_mode(CullMode::Front)?;
        cmd.bind_framebuffer(framebuffer, DrawBuffers::None)?;
        cmd.set_viewport(params.viewport)?;
        cmd.clear(ClearFlags::DEPTH, [0.0, 0.0, 0.0, 0.0])?;

        let draws = draw_geometry(cmd, commands, instance_buffer, &params, programs, blocks)?;

        cmd.unbind_framebuffer(true)?;
        cmd.set_cull_mode(CullMode::Back)?;

        crate::engine_trace!(SOURCE, "Shadow map rendered ({} draws)", draws);
        Ok(draws)
    }
}

#[cfg(test)]
#[path = "shadow_map_tests.rs"]
mod tests;
