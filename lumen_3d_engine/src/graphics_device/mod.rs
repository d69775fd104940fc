/// Graphics device module - GPU resource contracts consumed by the pipeline
///
/// The pipeline never talks to a graphics API directly. Backends implement
/// these traits; the pipeline records work on a `CommandList` and hands it
/// to `GraphicsDevice::submit` once per frame.

pub mod graphics_device;
pub mod buffer;
pub mod texture;
pub mod frame_buffer;
pub mod shader_program;
pub mod vertex_array;
pub mod command_list;

pub use graphics_device::*;
pub use buffer::*;
pub use texture::*;
pub use frame_buffer::*;
pub use shader_program::*;
pub use vertex_array::*;
pub use command_list::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
