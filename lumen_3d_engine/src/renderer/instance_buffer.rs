/// Shared grow-only buffer holding the instance records of one draw at a time

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{Buffer, BufferDesc, BufferKind, BufferUsage, CommandList, GraphicsDevice};
use crate::renderer::render_command::Instance;

pub struct InstanceBuffer {
    buffer: Arc<dyn Buffer>,
    allocated: u64,
}

impl InstanceBuffer {
    pub fn new(device: &mut dyn GraphicsDevice) -> Result<Self> {
        let buffer = device.create_buffer(BufferDesc {
            label: "renderer.instances".to_string(),
            kind: BufferKind::Vertex,
            usage: BufferUsage::Stream,
            data: Vec::new(),
        })?;
        Ok(Self { buffer, allocated: 0 })
    }

    pub fn buffer(&self) -> &Arc<dyn Buffer> {
        &self.buffer
    }

    /// Bytes currently allocated; never decreases
    pub fn allocated(&self) -> u64 {
        self.allocated
    }

    /// Record the upload of `instances` ahead of the next draw
    ///
    /// Storage is reallocated only when the data exceeds the largest size
    /// seen so far; otherwise it is overwritten in place.
    pub fn upload(&mut self, cmd: &mut dyn CommandList, instances: &[Instance]) -> Result<()> {
        let bytes: &[u8] = bytemuck::cast_slice(instances);
        let size = bytes.len() as u64;
        if size > self.allocated {
            crate::engine_trace!(
                "lumen3d::InstanceBuffer",
                "Growing instance buffer {} -> {} bytes",
                self.allocated,
                size
            );
            cmd.reallocate_buffer(&self.buffer, bytes)?;
            self.allocated = size;
        } else {
            cmd.write_buffer(&self.buffer, 0, bytes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "instance_buffer_tests.rs"]
mod tests;
