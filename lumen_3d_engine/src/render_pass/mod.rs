/// Render pass module - the ordered stages of a frame
///
/// `LightingPass` turns draw commands and lights into a lit HDR image,
/// `BloomPass` adds glow, `GammaCorrectionPass` produces the displayable
/// result. Each pass reads the previous pass's `pass_result`.

pub mod render_pass;
pub mod shadow_map;
pub mod lighting_pass;
pub mod bloom_pass;
pub mod gamma_correction_pass;

pub use render_pass::{previous_color, FrameData, PassContext, RenderPass};
pub use shadow_map::{LightSpace, ShadowMap};
pub use lighting_pass::{LightingPass, LightingStats};
pub use bloom_pass::BloomPass;
pub use gamma_correction_pass::GammaCorrectionPass;

#[cfg(test)]
pub(crate) mod pass_test_utils;
