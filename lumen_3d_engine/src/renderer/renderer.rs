/// Renderer - per-frame draw and light accumulation, pass orchestration
///
/// Draw calls and lights collected during a frame are consumed by
/// `render_all`, which records every registered pass into one command list,
/// blits the last pass's color output to the presentation surface, submits,
/// and clears the frame's collections.

use std::sync::{Arc, Mutex, MutexGuard};
use glam::{Mat4, Vec3};
use crate::config::RendererConfig;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::graphics_device::{BlitTarget, Buffer, CommandList, GraphicsDevice, Rect2D, TextureFilter, Viewport};
use crate::render_pass::{BloomPass, FrameData, GammaCorrectionPass, LightingPass, PassContext, RenderPass};
use crate::renderer::instance_buffer::InstanceBuffer;
use crate::renderer::light::LightParameters;
use crate::renderer::pass_parameters::PassParameters;
use crate::renderer::render_command::{Instance, RenderCommand, INSTANCE_FIRST_LOCATION, INSTANCE_LAYOUT, INSTANCE_STRIDE};
use crate::resource::{Material, Mesh};

const SOURCE: &str = "lumen3d::Renderer";

pub struct Renderer {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    config: RendererConfig,
    commands: Vec<RenderCommand>,
    lights: Vec<LightParameters>,
    view: Mat4,
    projection: Mat4,
    instance_buffer: InstanceBuffer,
    quad: Mesh,
    passes: Vec<Box<dyn RenderPass>>,
    frame_extent: Option<(u32, u32)>,
}

fn lock_device<'a>(device: &'a Mutex<dyn GraphicsDevice + 'static>) -> Result<MutexGuard<'a, dyn GraphicsDevice + 'static>> {
    device
        .lock()
        .map_err(|_| Engine::log_and_return_error(Error::BackendError("GraphicsDevice lock poisoned".to_string())))
}

fn same_buffer(a: &Arc<dyn Buffer>, b: &Arc<dyn Buffer>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

impl Renderer {
    /// Renderer with no passes
    ///
    /// # Errors
    ///
    /// Invalid configuration, or failure to create the shared instance
    /// buffer and full-screen quad.
    pub fn new(device: Arc<Mutex<dyn GraphicsDevice>>, config: RendererConfig) -> Result<Self> {
        config.validate().map_err(Engine::log_and_return_error)?;

        let (instance_buffer, quad) = {
            let mut guard = lock_device(&device)?;
            (InstanceBuffer::new(&mut *guard)?, Mesh::fullscreen_quad(&mut *guard)?)
        };

        crate::engine_debug!(SOURCE, "Renderer created");
        Ok(Self {
            device,
            config,
            commands: Vec::new(),
            lights: Vec::new(),
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            instance_buffer,
            quad,
            passes: Vec::new(),
            frame_extent: None,
        })
    }

    /// Lighting, then bloom (when enabled), then gamma correction
    pub fn with_default_passes(device: Arc<Mutex<dyn GraphicsDevice>>, config: RendererConfig) -> Result<Self> {
        let mut renderer = Self::new(device, config)?;
        renderer.add_pass(LightingPass::from_config(&config));
        if config.bloom.enabled {
            renderer.add_pass(BloomPass::new(config.bloom));
        }
        renderer.add_pass(GammaCorrectionPass::new(config.gamma));
        Ok(renderer)
    }

    /// Default pipeline on the device registered with `Engine`
    pub fn from_engine(config: RendererConfig) -> Result<Self> {
        Self::with_default_passes(Engine::graphics_device()?, config)
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn device(&self) -> &Arc<Mutex<dyn GraphicsDevice>> {
        &self.device
    }

    /// Append a pass; passes run in insertion order
    pub fn add_pass<P: RenderPass + 'static>(&mut self, pass: P) {
        crate::engine_debug!(SOURCE, "Pass '{}' added at position {}", pass.name(), self.passes.len());
        self.passes.push(Box::new(pass));
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    pub fn pass(&self, index: usize) -> Option<&dyn RenderPass> {
        self.passes.get(index).map(|pass| &**pass)
    }

    // ===== FRAME INPUT =====

    /// Queue a single draw of `mesh`
    pub fn draw(&mut self, mesh: &Arc<Mesh>, model: Mat4, material: &Material) {
        self.commands.push(RenderCommand::Single {
            mesh: Arc::clone(mesh),
            model,
            material: material.clone(),
            joint_matrices: mesh.joint_matrices().map(Arc::from),
        });
    }

    /// Queue one instanced draw of `mesh`, one instance per record
    ///
    /// The shared instance buffer is attached to the mesh's vertex array
    /// unless that array already streams from it.
    pub fn draw_instanced(&mut self, mesh: &Arc<Mesh>, instances: &[Instance], material: &Material) -> Result<()> {
        let attached = mesh
            .vertex_array()
            .instance_buffer()
            .is_some_and(|buffer| same_buffer(&buffer, self.instance_buffer.buffer()));
        if !attached {
            mesh.vertex_array().attach_instance_buffer(
                self.instance_buffer.buffer(),
                &INSTANCE_LAYOUT,
                INSTANCE_STRIDE,
                INSTANCE_FIRST_LOCATION,
            )?;
            crate::engine_trace!(SOURCE, "Instance buffer attached to '{}'", mesh.label());
        }

        self.commands.push(RenderCommand::Instanced {
            mesh: Arc::clone(mesh),
            instances: Arc::from(instances),
            material: material.clone(),
            joint_matrices: mesh.joint_matrices().map(Arc::from),
        });
        Ok(())
    }

    pub fn put_point_light(&mut self, position: Vec3, radius: f32, color: Vec3, intensity: f32) {
        self.lights.push(LightParameters::point(position, radius, color, intensity));
    }

    pub fn put_directional_light(&mut self, direction: Vec3, color: Vec3, intensity: f32) {
        self.lights.push(LightParameters::directional(direction, color, intensity));
    }

    pub fn put_spot_light(
        &mut self,
        position: Vec3,
        direction: Vec3,
        radius: f32,
        cut_off: f32,
        color: Vec3,
        intensity: f32,
    ) {
        self.lights.push(LightParameters::spot(position, direction, radius, cut_off, color, intensity));
    }

    /// Append an already-built light
    pub fn put_light(&mut self, light: LightParameters) {
        self.lights.push(light);
    }

    pub fn set_camera(&mut self, view: Mat4, projection: Mat4) {
        self.view = view;
        self.projection = projection;
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn lights(&self) -> &[LightParameters] {
        &self.lights
    }

    // ===== FRAME EXECUTION =====

    /// Render the frame into the presentation rectangle `(x, y, width, height)`
    ///
    /// The frame's commands and lights are cleared whatever the outcome. A
    /// failing pass stops the remaining passes; the work recorded so far is
    /// still submitted and the pass error is returned.
    pub fn render_all(&mut self, x: u32, y: u32, width: u32, height: u32) -> Result<()> {
        let viewport = Viewport::new(x, y, width, height);
        self.track_extent(width, height);

        let result = self.record_and_submit(viewport);

        self.commands.clear();
        self.lights.clear();
        result
    }

    fn track_extent(&mut self, width: u32, height: u32) {
        match self.frame_extent {
            None => self.frame_extent = Some((width, height)),
            Some(extent) if extent != (width, height) => {
                crate::engine_warn!(
                    SOURCE,
                    "Viewport changed from {}x{} to {}x{}; pass framebuffers keep their original size",
                    extent.0,
                    extent.1,
                    width,
                    height
                );
                self.frame_extent = Some((width, height));
            }
            Some(_) => {}
        }
    }

    fn record_and_submit(&mut self, viewport: Viewport) -> Result<()> {
        let device = Arc::clone(&self.device);
        let mut guard = lock_device(&device)?;
        let device: &mut dyn GraphicsDevice = &mut *guard;

        let mut cmd = device.create_command_list()?;
        cmd.begin()?;

        let params = PassParameters::new(viewport, self.view, self.projection);
        let outcome = self
            .run_passes(device, cmd.as_mut(), &params)
            .and_then(|()| self.present(cmd.as_mut(), viewport));

        let submitted = cmd.end().and_then(|()| device.submit(&[cmd.as_ref()]));
        outcome.and(submitted)
    }

    fn run_passes(&mut self, device: &mut dyn GraphicsDevice, cmd: &mut dyn CommandList, params: &PassParameters) -> Result<()> {
        let Self { passes, commands, lights, instance_buffer, quad, .. } = self;

        for index in 0..passes.len() {
            let (done, rest) = passes.split_at_mut(index);
            let pass = &mut rest[0];
            let previous = done.last().map(|pass| &**pass);

            let mut ctx = PassContext {
                device: &mut *device,
                cmd: &mut *cmd,
                frame: FrameData {
                    commands: commands.as_slice(),
                    lights: lights.as_slice(),
                    instance_buffer: &mut *instance_buffer,
                    quad: &*quad,
                },
            };
            pass.render(&mut ctx, params, previous).map_err(|err| {
                crate::engine_error!(SOURCE, "Pass '{}' failed: {}", pass.name(), err);
                err
            })?;
        }
        Ok(())
    }

    /// Blit the last pass's first color attachment to the presentation target
    fn present(&self, cmd: &mut dyn CommandList, viewport: Viewport) -> Result<()> {
        let Some(last) = self.passes.last() else {
            crate::engine_warn!(SOURCE, "No render pass registered; nothing presented");
            return Ok(());
        };
        let Some(framebuffer) = last.pass_result() else {
            crate::engine_warn!(SOURCE, "Pass '{}' produced no result; nothing presented", last.name());
            return Ok(());
        };

        cmd.blit(
            framebuffer,
            0,
            Rect2D::new(0, 0, framebuffer.width(), framebuffer.height()),
            BlitTarget::Presentation,
            Rect2D::from(viewport),
            TextureFilter::Nearest,
        )
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
