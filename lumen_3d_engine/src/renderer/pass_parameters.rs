use glam::Mat4;
use crate::graphics_device::Viewport;

/// Read-only per-frame context handed to every pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassParameters {
    pub viewport: Viewport,
    pub view: Mat4,
    pub projection: Mat4,
}

impl Default for PassParameters {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }
}

impl PassParameters {
    pub fn new(viewport: Viewport, view: Mat4, projection: Mat4) -> Self {
        Self { viewport, view, projection }
    }

    /// Same camera, different viewport
    pub fn with_viewport(&self, viewport: Viewport) -> Self {
        Self { viewport, ..*self }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}
