/// Renderer module - frame input, GLSL sources and the pass orchestrator

pub mod shaders;
pub mod light;
pub mod render_command;
pub mod pass_parameters;
pub mod instance_buffer;
pub(crate) mod geometry;
pub mod renderer;

pub use light::{LightParameters, LightType};
pub use render_command::{Instance, RenderCommand, INSTANCE_FIRST_LOCATION, INSTANCE_LAYOUT, INSTANCE_STRIDE};
pub use pass_parameters::PassParameters;
pub use instance_buffer::InstanceBuffer;
pub use geometry::{JOINTS_BLOCK_BINDING, JOINTS_BLOCK_NAME};
pub use renderer::Renderer;
