/// Host module - the contract between a windowing host and the render thread
///
/// The host owns the window and its event loop. Rendering runs on a
/// dedicated thread that talks to the host only through `HostSignals`.

pub mod host_application;
pub mod render_loop;

pub use host_application::{HostApplication, HostSignals, HostSurface};
pub use render_loop::{run_render_loop, spawn_render_loop, RenderThread};
