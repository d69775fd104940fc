/// Scene geometry submission shared by the G-buffer fill and the shadow map

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{
    Buffer, BufferDesc, BufferKind, BufferUsage, CommandList, GraphicsDevice, ShaderProgram,
    ShaderProgramDesc, UniformValue,
};
use crate::renderer::instance_buffer::InstanceBuffer;
use crate::renderer::pass_parameters::PassParameters;
use crate::renderer::render_command::RenderCommand;
use crate::resource::{Mesh, MaterialParameters, MAX_JOINTS};

/// Binding point of the `Joints` uniform block
pub const JOINTS_BLOCK_BINDING: u32 = 3;

pub const JOINTS_BLOCK_NAME: &str = "Joints";

const JOINT_BLOCK_SIZE: usize = MAX_JOINTS * std::mem::size_of::<glam::Mat4>();

/// Program pair used for single and instanced draws
pub(crate) struct GeometryPrograms {
    pub single: Arc<dyn ShaderProgram>,
    pub instanced: Arc<dyn ShaderProgram>,
}

impl GeometryPrograms {
    pub fn create(
        device: &mut dyn GraphicsDevice,
        label: &str,
        single_vertex: &str,
        instanced_vertex: &str,
        fragment: &str,
    ) -> Result<Self> {
        let single = device.create_shader_program(&ShaderProgramDesc::new(
            format!("{}.single", label),
            single_vertex,
            fragment,
        ))?;
        let instanced = device.create_shader_program(&ShaderProgramDesc::new(
            format!("{}.instanced", label),
            instanced_vertex,
            fragment,
        ))?;
        Ok(Self { single, instanced })
    }

    fn select(&self, command: &RenderCommand) -> &Arc<dyn ShaderProgram> {
        if command.is_instanced() {
            &self.instanced
        } else {
            &self.single
        }
    }
}

/// Uniform block storage for a geometry pass
pub(crate) struct GeometryBlocks {
    /// `Material` block; `None` for passes that ignore materials
    pub material: Option<Arc<dyn Buffer>>,
    pub joints: Arc<dyn Buffer>,
}

impl GeometryBlocks {
    pub fn create(device: &mut dyn GraphicsDevice, label: &str, with_material: bool) -> Result<Self> {
        let material = if with_material {
            Some(device.create_buffer(BufferDesc {
                label: format!("{}.material", label),
                kind: BufferKind::Uniform,
                usage: BufferUsage::Dynamic,
                data: vec![0; std::mem::size_of::<MaterialParameters>()],
            })?)
        } else {
            None
        };
        let joints = device.create_buffer(BufferDesc {
            label: format!("{}.joints", label),
            kind: BufferKind::Uniform,
            usage: BufferUsage::Dynamic,
            data: vec![0; JOINT_BLOCK_SIZE],
        })?;
        Ok(Self { material, joints })
    }
}

/// Record every command of the frame; returns the number of draws issued
pub(crate) fn draw_geometry(
    cmd: &mut dyn CommandList,
    commands: &[RenderCommand],
    instance_buffer: &mut InstanceBuffer,
    params: &PassParameters,
    programs: &GeometryPrograms,
    blocks: &GeometryBlocks,
) -> Result<u32> {
    let mut draws = 0;

    for command in commands {
        let program = programs.select(command);
        let mesh = command.mesh();

        cmd.bind_program(program)?;
        cmd.set_named_uniform(program, "uView", UniformValue::Mat4(params.view))?;
        cmd.set_named_uniform(program, "uProjection", UniformValue::Mat4(params.projection))?;

        match command {
            RenderCommand::Single { model, .. } => {
                cmd.set_named_uniform(program, "uModel", UniformValue::Mat4(*model))?;
            }
            RenderCommand::Instanced { instances, .. } => {
                if instances.is_empty() {
                    crate::engine_trace!(
                        "lumen3d::Geometry",
                        "Skipping instanced draw of '{}' with no instances",
                        mesh.label()
                    );
                    continue;
                }
                instance_buffer.upload(cmd, instances)?;
            }
        }

        if let Some(parameters) = &blocks.material {
            command.material().bind(cmd, program, parameters)?;
        }

        match command.joint_matrices() {
            Some(matrices) if !matrices.is_empty() => {
                cmd.set_named_uniform(program, "uHasBones", UniformValue::Int(1))?;
                let matrices = &matrices[..matrices.len().min(MAX_JOINTS)];
                cmd.write_buffer(&blocks.joints, 0, bytemuck::cast_slice(matrices))?;
                cmd.bind_named_uniform_block(program, JOINTS_BLOCK_NAME, JOINTS_BLOCK_BINDING, &blocks.joints)?;
            }
            _ => {
                cmd.set_named_uniform(program, "uHasBones", UniformValue::Int(0))?;
            }
        }

        cmd.draw_indexed(mesh.vertex_array(), mesh.index_count(), command.instance_count())?;
        draws += 1;
    }

    Ok(draws)
}

/// Draw the [0,1]² quad covering the current target
pub(crate) fn draw_fullscreen_quad(cmd: &mut dyn CommandList, quad: &Mesh) -> Result<()> {
    cmd.draw_indexed(quad.vertex_array(), quad.index_count(), 1)
}
