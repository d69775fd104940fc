/// Render loop - create, draw and present until shutdown, then destroy
///
/// Pending resizes are delivered before the frame they apply to. A failing
/// `on_draw` or `present` ends the loop; `on_destroy` still runs and the
/// error is returned from `RenderThread::join`.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::host::host_application::{HostApplication, HostSignals, HostSurface};

const SOURCE: &str = "lumen3d::RenderLoop";

/// Run the loop on the calling thread and return the number of presented frames
///
/// # Errors
///
/// The first error from `on_create`, `on_draw` or `present`. When
/// `on_create` fails the loop never starts and `on_destroy` is not called.
pub fn run_render_loop<A, S>(app: &mut A, surface: &mut S, signals: &HostSignals) -> Result<u64>
where
    A: HostApplication + ?Sized,
    S: HostSurface + ?Sized,
{
    app.on_create().map_err(|err| {
        crate::engine_error!(SOURCE, "on_create failed: {}", err);
        err
    })?;
    crate::engine_info!(SOURCE, "Render loop started");

    let mut frames = 0u64;
    let mut previous: Option<Instant> = None;
    let outcome = loop {
        if signals.is_shutdown_requested() {
            break Ok(());
        }
        if let Some((width, height)) = signals.take_resize() {
            crate::engine_debug!(SOURCE, "Resize to {}x{}", width, height);
            app.on_resize(width, height);
        }

        let now = Instant::now();
        let elapsed = previous.map_or(0.0, |prev| (now - prev).as_secs_f32());
        previous = Some(now);

        if let Err(err) = app.on_draw(elapsed).and_then(|()| surface.present()) {
            crate::engine_error!(SOURCE, "Frame {} failed: {}", frames, err);
            break Err(err);
        }
        frames += 1;
    };

    app.on_destroy();
    crate::engine_info!(SOURCE, "Render loop stopped after {} frames", frames);
    outcome.map(|()| frames)
}

/// Handle on a render loop running on its own thread
pub struct RenderThread {
    signals: Arc<HostSignals>,
    handle: JoinHandle<Result<u64>>,
}

impl RenderThread {
    pub fn signals(&self) -> &Arc<HostSignals> {
        &self.signals
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the loop to end and return its frame count
    pub fn join(self) -> Result<u64> {
        self.handle
            .join()
            .map_err(|_| Engine::log_and_return_error(Error::BackendError("render thread panicked".to_string())))?
    }

    /// Request shutdown, then join
    pub fn stop(self) -> Result<u64> {
        self.signals.request_shutdown();
        self.join()
    }
}

/// Move `app` and `surface` to a new thread and run the loop there
///
/// # Errors
///
/// `Error::InitializationFailed` if the thread cannot be spawned.
pub fn spawn_render_loop<A, S>(mut app: A, mut surface: S, signals: Arc<HostSignals>) -> Result<RenderThread>
where
    A: HostApplication + 'static,
    S: HostSurface + 'static,
{
    let loop_signals = Arc::clone(&signals);
    let handle = thread::Builder::new()
        .name("lumen3d-render".to_string())
        .spawn(move || run_render_loop(&mut app, &mut surface, &loop_signals))
        .map_err(|err| {
            Engine::log_and_return_error(Error::InitializationFailed(format!(
                "failed to spawn render thread: {}",
                err
            )))
        })?;

    Ok(RenderThread { signals, handle })
}

#[cfg(test)]
#[path = "render_loop_tests.rs"]
mod tests;
