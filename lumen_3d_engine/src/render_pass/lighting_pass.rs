/// Deferred lighting pass
///
/// Phase one fills the G-buffer (diffuse, material, normal, position) from
/// the frame's draw commands. Phase two accumulates into a single-attachment
/// result: one alpha-blended ambient quad, then one additive quad per light.
/// The first directional light of the frame also gets a shadow map.

use std::sync::Arc;
use glam::Vec3;
use crate::config::{RendererConfig, ShadowConfig};
use crate::error::{Error, Result};
use crate::graphics_device::{
    BlendState, ClearFlags, ColorAttachmentDesc, CommandList, CullMode, DepthAttachmentDesc,
    DrawBuffers, Framebuffer, FramebufferDesc, GraphicsDevice, ShaderProgram, ShaderProgramDesc,
    Texture, TextureFormat, UniformValue,
};
use crate::render_pass::render_pass::{ensure_framebuffer, PassContext, RenderPass};
use crate::render_pass::shadow_map::{LightSpace, ShadowMap};
use crate::renderer::geometry::{draw_fullscreen_quad, draw_geometry, GeometryBlocks, GeometryPrograms};
use crate::renderer::shaders::{
    AMBIENT_FRAGMENT, GBUFFER_FRAGMENT, GEOMETRY_INSTANCED_VERTEX, GEOMETRY_VERTEX, LIGHTING_FRAGMENT,
    QUAD_VERTEX,
};
use crate::renderer::{LightParameters, LightType, PassParameters};

const SOURCE: &str = "lumen3d::LightingPass";

/// G-buffer attachment samplers, in attachment order
const GBUFFER_SAMPLERS: [&str; 4] = ["rtDiffuse", "rtMaterial", "rtNormals", "rtPosition"];

/// Texture unit of the shadow map during light accumulation
const SHADOW_UNIT: u32 = 4;

/// Counters of the most recent frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightingStats {
    pub geometry_draws: u32,
    pub ambient_draws: u32,
    pub light_draws: u32,
    pub shadow_draws: u32,
}

struct LightingPrograms {
    ambient: Arc<dyn ShaderProgram>,
    light: Arc<dyn ShaderProgram>,
}

pub struct LightingPass {
    ambient_color: Vec3,
    gbuffer: Option<Arc<dyn Framebuffer>>,
    result: Option<Arc<dyn Framebuffer>>,
    geometry: Option<(GeometryPrograms, GeometryBlocks)>,
    programs: Option<LightingPrograms>,
    shadow_map: ShadowMap,
    stats: LightingStats,
}

impl LightingPass {
    pub fn new(ambient_color: Vec3, shadow: ShadowConfig) -> Self {
        Self {
            ambient_color,
            gbuffer: None,
            result: None,
            geometry: None,
            programs: None,
            shadow_map: ShadowMap::new(shadow),
            stats: LightingStats::default(),
        }
    }

    pub fn from_config(config: &RendererConfig) -> Self {
        Self::new(config.ambient_color, config.shadow)
    }

    pub fn ambient_color(&self) -> Vec3 {
        self.ambient_color
    }

    pub fn set_ambient_color(&mut self, color: Vec3) {
        self.ambient_color = color;
    }

    pub fn gbuffer(&self) -> Option<&Arc<dyn Framebuffer>> {
        self.gbuffer.as_ref()
    }

    pub fn shadow_map(&self) -> &ShadowMap {
        &self.shadow_map
    }

    pub fn stats(&self) -> LightingStats {
        self.stats
    }

    fn create_programs(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        if self.geometry.is_none() {
            let programs = GeometryPrograms::create(
                device,
                "gbuffer",
                GEOMETRY_VERTEX,
                GEOMETRY_INSTANCED_VERTEX,
                GBUFFER_FRAGMENT,
            )?;
            let blocks = GeometryBlocks::create(device, "gbuffer", true)?;
            self.geometry = Some((programs, blocks));
        }
        if self.programs.is_none() {
            let ambient = device.create_shader_program(&ShaderProgramDesc::new(
                "lighting.ambient",
                QUAD_VERTEX,
                AMBIENT_FRAGMENT,
            ))?;
            let light = device.create_shader_program(&ShaderProgramDesc::new(
                "lighting.light",
                QUAD_VERTEX,
                LIGHTING_FRAGMENT,
            ))?;
            self.programs = Some(LightingPrograms { ambient, light });
        }
        Ok(())
    }

    fn create_framebuffers(&mut self, device: &mut dyn GraphicsDevice, width: u32, height: u32) -> Result<()> {
        ensure_framebuffer(&mut self.gbuffer, device, SOURCE, || FramebufferDesc {
            label: "lighting.gbuffer".to_string(),
            width,
            height,
            color_attachments: vec![
                ColorAttachmentDesc::new(TextureFormat::RGBA32F),
                ColorAttachmentDesc::new(TextureFormat::RGB32F),
                ColorAttachmentDesc::new(TextureFormat::RGB32F),
                ColorAttachmentDesc::new(TextureFormat::RGB32F),
            ],
            depth_attachment: Some(DepthAttachmentDesc::RenderBuffer {
                format: TextureFormat::Depth24Stencil8,
                samples: 1,
            }),
        })?;
        ensure_framebuffer(&mut self.result, device, SOURCE, || FramebufferDesc {
            label: "lighting.result".to_string(),
            width,
            height,
            color_attachments: vec![ColorAttachmentDesc::new(TextureFormat::RGBA32F)],
            depth_attachment: None,
        })?;
        Ok(())
    }

    /// Index of the light that gets the shadow map
    fn shadow_caster(lights: &[LightParameters]) -> Option<usize> {
        lights.iter().position(|light| light.light_type == LightType::Directional)
    }

    fn fill_gbuffer(&self, ctx: &mut PassContext<'_>, params: &PassParameters, gbuffer: &Arc<dyn Framebuffer>) -> Result<u32> {
        let Some((programs, blocks)) = &self.geometry else {
            return Err(Error::InvalidResource("G-buffer programs missing".to_string()));
        };
        let cmd = &mut *ctx.cmd;

        cmd.bind_framebuffer(gbuffer, DrawBuffers::All)?;
        cmd.set_depth_test(true)?;
        cmd.set_cull_mode(CullMode::Back)?;
        cmd.set_blend_state(BlendState::Disabled)?;
        cmd.clear(ClearFlags::COLOR | ClearFlags::DEPTH | ClearFlags::STENCIL, [0.0, 0.0, 0.0, 0.0])?;

        let draws = draw_geometry(cmd, ctx.frame.commands, ctx.frame.instance_buffer, params, programs, blocks)?;

        cmd.set_cull_mode(CullMode::None)?;
        cmd.set_depth_test(false)?;
        cmd.unbind_framebuffer(true)?;
        Ok(draws)
    }

    fn bind_gbuffer_textures(
        cmd: &mut dyn CommandList,
        program: &Arc<dyn ShaderProgram>,
        gbuffer: &Arc<dyn Framebuffer>,
        count: usize,
    ) -> Result<()> {
        for (unit, (name, texture)) in GBUFFER_SAMPLERS.iter().zip(gbuffer.color_attachments()).take(count).enumerate() {
            cmd.set_named_uniform(program, name, UniformValue::Int(unit as i32))?;
            cmd.bind_texture(unit as u32, texture)?;
        }
        Ok(())
    }

    fn draw_ambient(&self, ctx: &mut PassContext<'_>, program: &Arc<dyn ShaderProgram>, gbuffer: &Arc<dyn Framebuffer>) -> Result<()> {
        let cmd = &mut *ctx.cmd;
        cmd.bind_program(program)?;
        Self::bind_gbuffer_textures(cmd, program, gbuffer, 2)?;
        cmd.set_named_uniform(program, "uAmbientColor", UniformValue::Vec3(self.ambient_color))?;
        cmd.set_blend_state(BlendState::Alpha)?;
        draw_fullscreen_quad(cmd, ctx.frame.quad)
    }

    fn draw_lights(
        &self,
        ctx: &mut PassContext<'_>,
        params: &PassParameters,
        program: &Arc<dyn ShaderProgram>,
        gbuffer: &Arc<dyn Framebuffer>,
        shadow: Option<(usize, &LightSpace, &Arc<dyn Texture>)>,
    ) -> Result<u32> {
        let cmd = &mut *ctx.cmd;
        cmd.bind_program(program)?;
        Self::bind_gbuffer_textures(cmd, program, gbuffer, GBUFFER_SAMPLERS.len())?;
        cmd.set_named_uniform(program, "uView", UniformValue::Mat4(params.view))?;
        cmd.set_blend_state(BlendState::Additive)?;

        let mut draws = 0;
        for (index, light) in ctx.frame.lights.iter().enumerate() {
            if !light.is_enabled() {
                continue;
            }

            match shadow {
                Some((caster, light_space, depth)) if caster == index => {
                    cmd.set_named_uniform(program, "uLightViewProj", UniformValue::Mat4(light_space.view_projection()))?;
                    cmd.set_named_uniform(program, "uNF", UniformValue::Vec2(light_space.near_far))?;
                    cmd.set_named_uniform(program, "rtShadowEnabled", UniformValue::Int(1))?;
                    cmd.set_named_uniform(program, "rtShadow", UniformValue::Int(SHADOW_UNIT as i32))?;
                    cmd.bind_texture(SHADOW_UNIT, depth)?;
                }
                _ => {
                    if light.light_type == LightType::Directional {
                        crate::engine_warn!(
                            SOURCE,
                            "Directional light {} drawn without shadows (one shadow map per frame)",
                            index
                        );
                    }
                    cmd.set_named_uniform(program, "rtShadowEnabled", UniformValue::Int(0))?;
                }
            }

            light.apply(cmd, program)?;
            draw_fullscreen_quad(cmd, ctx.frame.quad)?;
            draws += 1;
        }
        Ok(draws)
    }
}

impl RenderPass for LightingPass {
    fn name(&self) -> &str {
        "lighting"
    }

    fn render(
        &mut self,
        ctx: &mut PassContext<'_>,
        params: &PassParameters,
        _previous: Option<&dyn RenderPass>,
    ) -> Result<()> {
        self.create_programs(ctx.device)?;
        self.create_framebuffers(ctx.device, params.viewport.width, params.viewport.height)?;
        let (Some(gbuffer), Some(result)) = (self.gbuffer.clone(), self.result.clone()) else {
            return Err(Error::InvalidResource("lighting framebuffers missing".to_string()));
        };
        let Some(programs) = &self.programs else {
            return Err(Error::InvalidResource("lighting programs missing".to_string()));
        };
        let (ambient, light) = (Arc::clone(&programs.ambient), Arc::clone(&programs.light));

        let mut stats = LightingStats {
            geometry_draws: self.fill_gbuffer(ctx, params, &gbuffer)?,
            ..LightingStats::default()
        };

        let shadow_light = Self::shadow_caster(ctx.frame.lights)
            .map(|index| (index, LightSpace::directional(ctx.frame.lights[index].direction, self.shadow_map.config())));
        if let Some((_, light_space)) = &shadow_light {
            stats.shadow_draws = self.shadow_map.render(
                ctx.device,
                ctx.cmd,
                ctx.frame.commands,
                ctx.frame.instance_buffer,
                light_space,
            )?;
        }
        let depth = self.shadow_map.depth_texture().cloned();
        let shadow = match (&shadow_light, &depth) {
            (Some((index, light_space)), Some(depth)) => Some((*index, light_space, depth)),
            _ => None,
        };

        ctx.cmd.bind_framebuffer(&result, DrawBuffers::All)?;
        ctx.cmd.set_depth_test(false)?;
        ctx.cmd.set_cull_mode(CullMode::None)?;
        ctx.cmd.clear(ClearFlags::COLOR, [0.0, 0.0, 0.0, 0.0])?;

        self.draw_ambient(ctx, &ambient, &gbuffer)?;
        stats.ambient_draws = 1;
        stats.light_draws = self.draw_lights(ctx, params, &light, &gbuffer, shadow)?;

        ctx.cmd.set_blend_state(BlendState::Disabled)?;
        ctx.cmd.unbind_framebuffer(true)?;

        crate::engine_trace!(
            SOURCE,
            "Frame: {} geometry draws, {} lights, {} shadow draws",
            stats.geometry_draws,
            stats.light_draws,
            stats.shadow_draws
        );
        self.stats = stats;
        Ok(())
    }

    fn pass_result(&self) -> Option<&Arc<dyn Framebuffer>> {
        self.result.as_ref()
    }
}

#[cfg(test)]
#[path = "lighting_pass_tests.rs"]
mod tests;
