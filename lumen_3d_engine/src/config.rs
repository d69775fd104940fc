/// Renderer configuration
///
/// Plain data with `Default` values matching the stock pipeline. Call
/// `validate` (done by `Renderer::new`) before building passes from it.

use glam::Vec3;
use crate::error::{Error, Result};

/// Directional shadow map settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowConfig {
    /// Width and height of the square depth map
    pub map_size: u32,
    /// Half-size of the light-space orthographic box
    pub extent: f32,
    /// Extra depth range behind the box
    pub depth_padding: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: 4096,
            extent: 16.0,
            depth_padding: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomConfig {
    pub enabled: bool,
    /// Luminance cutoff of the bright-pass
    pub threshold: f32,
    /// Viewport divisor of the blur chain
    pub downscale: u32,
    pub blur_iterations: u32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 1.0,
            downscale: 3,
            blur_iterations: 10,
        }
    }
}

/// Renderer-wide settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererConfig {
    pub ambient_color: Vec3,
    pub shadow: ShadowConfig,
    pub bloom: BloomConfig,
    pub gamma: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            ambient_color: Vec3::splat(0.02),
            shadow: ShadowConfig::default(),
            bloom: BloomConfig::default(),
            gamma: 2.2,
        }
    }
}

impl RendererConfig {
    /// Check every value the passes rely on
    ///
    /// # Errors
    ///
    /// `Error::InitializationFailed` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        fn reject(field: &str, reason: &str) -> Result<()> {
            Err(Error::InitializationFailed(format!("RendererConfig.{} {}", field, reason)))
        }

        if !self.ambient_color.is_finite() {
            return reject("ambient_color", "must be finite");
        }
        if self.shadow.map_size == 0 {
            return reject("shadow.map_size", "must be non-zero");
        }
        if !(self.shadow.extent > 0.0 && self.shadow.extent.is_finite()) {
            return reject("shadow.extent", "must be positive");
        }
        if !(self.shadow.depth_padding >= 0.0 && self.shadow.depth_padding.is_finite()) {
            return reject("shadow.depth_padding", "must not be negative");
        }
        if !self.bloom.threshold.is_finite() {
            return reject("bloom.threshold", "must be finite");
        }
        if self.bloom.downscale == 0 {
            return reject("bloom.downscale", "must be non-zero");
        }
        if self.bloom.blur_iterations == 0 {
            return reject("bloom.blur_iterations", "must be non-zero");
        }
        if !(self.gamma > 0.0 && self.gamma.is_finite()) {
            return reject("gamma", "must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
