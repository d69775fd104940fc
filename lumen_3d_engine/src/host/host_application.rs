/// Host lifecycle traits and the signals shared with the render thread

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use crate::error::Result;

/// Presentation surface supplied by the host (window swap chain, offscreen target, ...)
pub trait HostSurface: Send {
    /// Show the frame recorded since the previous call
    fn present(&mut self) -> Result<()>;
}

/// Application callbacks driven by the render loop
///
/// All hooks run on the render thread. `on_draw` is where the application
/// queues draws and lights and calls `Renderer::render_all`.
pub trait HostApplication: Send {
    fn on_create(&mut self) -> Result<()> {
        Ok(())
    }

    /// `elapsed_seconds` is the time since the previous frame (0 for the first)
    fn on_draw(&mut self, elapsed_seconds: f32) -> Result<()>;

    fn on_resize(&mut self, _width: u32, _height: u32) {}

    fn on_destroy(&mut self) {}
}

/// Shutdown flag and pending resize, written by the host's event thread
#[derive(Debug, Default)]
pub struct HostSignals {
    shutdown: AtomicBool,
    pending_resize: Mutex<Option<(u32, u32)>>,
}

impl HostSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the render loop to stop after the current frame
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Record a new surface size; only the latest one is delivered
    pub fn notify_resize(&self, width: u32, height: u32) {
        let mut pending = match self.pending_resize.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *pending = Some((width, height));
    }

    /// Take the pending resize, if any
    pub fn take_resize(&self) -> Option<(u32, u32)> {
        let mut pending = match self.pending_resize.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        pending.take()
    }
}

#[cfg(test)]
#[path = "host_application_tests.rs"]
mod tests;
