//! Shared fixtures for render pass unit tests

use std::sync::Arc;
use glam::Mat4;
use crate::error::Result;
use crate::graphics_device::mock_graphics_device::{CommandLog, MockGraphicsDevice};
use crate::graphics_device::{ColorAttachmentDesc, Framebuffer, FramebufferDesc, GraphicsDevice, TextureFormat};
use crate::render_pass::{FrameData, PassContext, RenderPass};
use crate::renderer::PassParameters;
use crate::renderer::{InstanceBuffer, LightParameters, RenderCommand};
use crate::resource::{Material, Mesh, MeshData, Vertex};

pub(crate) struct PassHarness {
    pub device: MockGraphicsDevice,
    pub log: CommandLog,
    pub quad: Mesh,
    pub instance_buffer: InstanceBuffer,
}

impl PassHarness {
    pub fn new() -> Self {
        Self::with_device(MockGraphicsDevice::new())
    }

    pub fn with_device(mut device: MockGraphicsDevice) -> Self {
        let log = device.command_log();
        let quad = Mesh::fullscreen_quad(&mut device).unwrap();
        let instance_buffer = InstanceBuffer::new(&mut device).unwrap();
        Self { device, log, quad, instance_buffer }
    }

    pub fn triangle(&mut self, label: &str) -> Arc<Mesh> {
        let data = MeshData {
            vertices: vec![Vertex::default(); 3],
            skin: None,
            indices: vec![0, 1, 2],
            skeleton: None,
        };
        Arc::new(Mesh::from_data(&mut self.device, label, data).unwrap())
    }

    pub fn single(&mut self, label: &str) -> RenderCommand {
        RenderCommand::Single {
            mesh: self.triangle(label),
            model: Mat4::IDENTITY,
            material: Material::new(),
            joint_matrices: None,
        }
    }

    /// Record `f` on a fresh command list between begin and end
    pub fn run<F>(&mut self, commands: &[RenderCommand], lights: &[LightParameters], f: F) -> Result<()>
    where
        F: FnOnce(&mut PassContext<'_>) -> Result<()>,
    {
        let mut cmd = self.device.create_command_list()?;
        cmd.begin()?;
        let mut ctx = PassContext {
            device: &mut self.device,
            cmd: cmd.as_mut(),
            frame: FrameData {
                commands,
                lights,
                instance_buffer: &mut self.instance_buffer,
                quad: &self.quad,
            },
        };
        let result = f(&mut ctx);
        cmd.end()?;
        result
    }
}

/// Stand-in for an earlier pass: a single-attachment framebuffer labelled "scene"
pub(crate) struct ScenePass {
    framebuffer: Arc<dyn Framebuffer>,
}

impl ScenePass {
    pub fn new(device: &mut MockGraphicsDevice, width: u32, height: u32) -> Self {
        let framebuffer = device
            .create_framebuffer(&FramebufferDesc {
                label: "scene".to_string(),
                width,
                height,
                color_attachments: vec![ColorAttachmentDesc::new(TextureFormat::RGBA32F)],
                depth_attachment: None,
            })
            .unwrap();
        Self { framebuffer }
    }
}

impl RenderPass for ScenePass {
    fn name(&self) -> &str {
        "scene"
    }

    fn render(&mut self, _ctx: &mut PassContext<'_>, _params: &PassParameters, _previous: Option<&dyn RenderPass>) -> Result<()> {
        Ok(())
    }

    fn pass_result(&self) -> Option<&Arc<dyn Framebuffer>> {
        Some(&self.framebuffer)
    }
}
