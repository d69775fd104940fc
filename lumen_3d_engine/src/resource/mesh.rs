/// GPU-resident mesh built from imported vertex/index data
///
/// Attribute locations:
/// - 0..=3: position, normal, tangent, texture coordinate
/// - 4..=10: per-instance stream (see `renderer::INSTANCE_LAYOUT`)
/// - 11..=12: joint ids and weights for skinned meshes

use std::sync::{Arc, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use bytemuck::{Pod, Zeroable};
use crate::error::{Error, Result};
use crate::graphics_device::{
    BufferDesc, BufferKind, BufferUsage, GraphicsDevice, VertexArray, VertexArrayDesc,
    VertexAttribute, VertexBufferBinding,
};
use crate::resource::skeleton::{Skeleton, MAX_JOINTS};

/// Geometry vertex
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub tex_coord: [f32; 2],
}

/// Layout of [`Vertex`], bound from location 0
pub const VERTEX_LAYOUT: [VertexAttribute; 4] = [
    VertexAttribute::float(3),
    VertexAttribute::float(3),
    VertexAttribute::float(3),
    VertexAttribute::float(2),
];

/// Skinning stream of a vertex: up to four joints and their weights
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VertexSkin {
    pub joint_ids: [i32; 4],
    pub weights: [f32; 4],
}

/// Layout of [`VertexSkin`]
pub const SKIN_LAYOUT: [VertexAttribute; 2] = [
    VertexAttribute::int(4),
    VertexAttribute::float(4),
];

/// First attribute location of the skinning stream
pub const SKIN_FIRST_LOCATION: u32 = 11;

/// Output of a mesh importer
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    /// One entry per vertex when present
    pub skin: Option<Vec<VertexSkin>>,
    pub indices: Vec<u32>,
    pub skeleton: Option<Skeleton>,
}

/// Process-unique mesh identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(u64);

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

impl MeshId {
    fn next() -> Self {
        MeshId(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Mesh resource
pub struct Mesh {
    id: MeshId,
    label: String,
    vertex_array: Arc<dyn VertexArray>,
    index_count: u32,
    skeleton: Option<Arc<RwLock<Skeleton>>>,
}

impl Mesh {
    /// Upload imported data and build the vertex array
    ///
    /// # Errors
    ///
    /// `Error::InvalidResource` for empty geometry, out-of-range indices, a
    /// skin stream whose length differs from the vertex count, a skeleton
    /// without a skin stream, or joint ids outside the skeleton.
    pub fn from_data(device: &mut dyn GraphicsDevice, label: impl Into<String>, data: MeshData) -> Result<Self> {
        let label = label.into();

        if data.vertices.is_empty() || data.indices.is_empty() {
            return Err(Error::InvalidResource(format!("mesh '{}' has no geometry", label)));
        }
        if let Some(bad) = data.indices.iter().find(|&&i| i as usize >= data.vertices.len()) {
            return Err(Error::InvalidResource(format!(
                "mesh '{}' index {} out of range ({} vertices)",
                label, bad, data.vertices.len()
            )));
        }
        if let Some(skin) = &data.skin {
            if skin.len() != data.vertices.len() {
                return Err(Error::InvalidResource(format!(
                    "mesh '{}' has {} skin entries for {} vertices",
                    label, skin.len(), data.vertices.len()
                )));
            }
        }
        if let Some(skeleton) = &data.skeleton {
            let Some(skin) = &data.skin else {
                return Err(Error::InvalidResource(format!("mesh '{}' has a skeleton but no skin", label)));
            };
            let joint_limit = skeleton.joint_count().min(MAX_JOINTS);
            let out_of_range = skin
                .iter()
                .flat_map(|entry| entry.joint_ids)
                .find(|&id| id < 0 || id as usize >= joint_limit);
            if let Some(id) = out_of_range {
                return Err(Error::InvalidResource(format!(
                    "mesh '{}' skin references joint {} ({} usable joints)",
                    label, id, joint_limit
                )));
            }
        }

        let vertex_buffer = device.create_buffer(BufferDesc {
            label: format!("{}.vertices", label),
            kind: BufferKind::Vertex,
            usage: BufferUsage::Static,
            data: bytemuck::cast_slice(&data.vertices).to_vec(),
        })?;
        let index_buffer = device.create_buffer(BufferDesc {
            label: format!("{}.indices", label),
            kind: BufferKind::Index,
            usage: BufferUsage::Static,
            data: bytemuck::cast_slice(&data.indices).to_vec(),
        })?;

        let mut vertex_buffers = vec![VertexBufferBinding {
            buffer: vertex_buffer,
            layout: VERTEX_LAYOUT.to_vec(),
            first_location: 0,
        }];
        if let Some(skin) = &data.skin {
            let skin_buffer = device.create_buffer(BufferDesc {
                label: format!("{}.skin", label),
                kind: BufferKind::Vertex,
                usage: BufferUsage::Static,
                data: bytemuck::cast_slice(skin).to_vec(),
            })?;
            vertex_buffers.push(VertexBufferBinding {
                buffer: skin_buffer,
                layout: SKIN_LAYOUT.to_vec(),
                first_location: SKIN_FIRST_LOCATION,
            });
        }

        let vertex_array = device.create_vertex_array(VertexArrayDesc {
            label: label.clone(),
            vertex_buffers,
            index_buffer,
        })?;

        crate::engine_debug!(
            "lumen3d::Mesh",
            "Mesh '{}' created: {} vertices, {} indices{}",
            label,
            data.vertices.len(),
            data.indices.len(),
            if data.skeleton.is_some() { ", skinned" } else { "" }
        );

        Ok(Self {
            id: MeshId::next(),
            label,
            vertex_array,
            index_count: data.indices.len() as u32,
            skeleton: data.skeleton.map(|s| Arc::new(RwLock::new(s))),
        })
    }

    /// Unit quad over [0,1]² used by full-screen passes
    pub fn fullscreen_quad(device: &mut dyn GraphicsDevice) -> Result<Self> {
        let corner = |x: f32, y: f32| Vertex {
            position: [x, y, 0.0],
            normal: [0.0, 0.0, 1.0],
            tangent: [1.0, 0.0, 0.0],
            tex_coord: [x, y],
        };
        Self::from_data(device, "fullscreen_quad", MeshData {
            vertices: vec![corner(0.0, 0.0), corner(1.0, 0.0), corner(1.0, 1.0), corner(0.0, 1.0)],
            skin: None,
            indices: vec![0, 1, 2, 0, 2, 3],
            skeleton: None,
        })
    }

    pub fn id(&self) -> MeshId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn vertex_array(&self) -> &Arc<dyn VertexArray> {
        &self.vertex_array
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Shared skeleton, written by the animation system
    pub fn skeleton(&self) -> Option<&Arc<RwLock<Skeleton>>> {
        self.skeleton.as_ref()
    }

    /// Snapshot of the current skinning matrices
    ///
    /// `None` for static meshes, or when the skeleton lock is poisoned.
    pub fn joint_matrices(&self) -> Option<Vec<glam::Mat4>> {
        let skeleton = self.skeleton.as_ref()?;
        match skeleton.read() {
            Ok(skeleton) => Some(skeleton.joint_matrices()),
            Err(_) => {
                crate::engine_warn!(
                    "lumen3d::Mesh",
                    "Skeleton of mesh '{}' is poisoned; drawing without bones",
                    self.label
                );
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
