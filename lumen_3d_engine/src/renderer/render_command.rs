/// Per-frame draw requests
///
/// Commands live for one frame: `Renderer::render_all` drains them after the
/// passes have read them.

use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use crate::graphics_device::VertexAttribute;
use crate::resource::{Material, Mesh};

/// First attribute location of the instance stream
pub const INSTANCE_FIRST_LOCATION: u32 = 4;

/// One instance record, stepped once per instance
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Instance {
    pub model: [[f32; 4]; 4],
    /// Offset in `xy`, scale in `zw`
    pub tex_coord_transform: [f32; 4],
    pub color: [f32; 4],
    pub emission: f32,
    pub _pad: [f32; 3],
}

impl Default for Instance {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            tex_coord_transform: [0.0, 0.0, 1.0, 1.0],
            color: [1.0; 4],
            emission: 0.0,
            _pad: [0.0; 3],
        }
    }
}

impl Instance {
    pub fn new(model: Mat4) -> Self {
        Self { model: model.to_cols_array_2d(), ..Self::default() }
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color.to_array();
        self
    }

    pub fn with_tex_coord_transform(mut self, transform: Vec4) -> Self {
        self.tex_coord_transform = transform.to_array();
        self
    }

    pub fn with_emission(mut self, emission: f32) -> Self {
        self.emission = emission;
        self
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }
}

/// Layout of [`Instance`]: four matrix columns, texcoord transform, color, emission
pub const INSTANCE_LAYOUT: [VertexAttribute; 7] = [
    VertexAttribute::float(4),
    VertexAttribute::float(4),
    VertexAttribute::float(4),
    VertexAttribute::float(4),
    VertexAttribute::float(4),
    VertexAttribute::float(4),
    VertexAttribute::float(1),
];

/// Stride of one instance record
pub const INSTANCE_STRIDE: u32 = std::mem::size_of::<Instance>() as u32;

/// A draw request
#[derive(Clone)]
pub enum RenderCommand {
    Single {
        mesh: Arc<Mesh>,
        model: Mat4,
        material: Material,
        /// Skinning matrices captured at draw time
        joint_matrices: Option<Arc<[Mat4]>>,
    },
    Instanced {
        mesh: Arc<Mesh>,
        instances: Arc<[Instance]>,
        material: Material,
        joint_matrices: Option<Arc<[Mat4]>>,
    },
}

impl RenderCommand {
    pub fn mesh(&self) -> &Arc<Mesh> {
        match self {
            RenderCommand::Single { mesh, .. } | RenderCommand::Instanced { mesh, .. } => mesh,
        }
    }

    pub fn material(&self) -> &Material {
        match self {
            RenderCommand::Single { material, .. } | RenderCommand::Instanced { material, .. } => material,
        }
    }

    pub fn joint_matrices(&self) -> Option<&[Mat4]> {
        match self {
            RenderCommand::Single { joint_matrices, .. }
            | RenderCommand::Instanced { joint_matrices, .. } => joint_matrices.as_deref(),
        }
    }

    /// 1 for single draws
    pub fn instance_count(&self) -> u32 {
        match self {
            RenderCommand::Single { .. } => 1,
            RenderCommand::Instanced { instances, .. } => instances.len() as u32,
        }
    }

    pub fn is_instanced(&self) -> bool {
        matches!(self, RenderCommand::Instanced { .. })
    }
}

#[cfg(test)]
#[path = "render_command_tests.rs"]
mod tests;
