/*!
# Lumen 3D Engine

Deferred rendering pipeline for real-time 3D scenes.

Each frame, draw requests and lights are accumulated by the `Renderer` and
resolved through an ordered list of render passes recorded into a single
command list:

- **LightingPass**: G-buffer fill, ambient term, one additive draw per light,
  with a directional shadow map
- **BloomPass**: bright-pass threshold, ping-pong blur at reduced
  resolution, additive combine
- **GammaCorrectionPass**: display-ready 8-bit result

The last pass's output is blitted to the presentation surface.

## Architecture

- **GraphicsDevice**: backend trait creating buffers, textures, framebuffers
  and shader programs; records work on a `CommandList`
- **Filter / FilterChain**: full-screen effects and ping-pong chains built
  from one shared fragment template
- **HostApplication / HostSurface**: lifecycle hooks driven by a dedicated
  render thread

Backends implement the graphics device traits; the pipeline never talks to
a graphics API directly.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod config;
pub mod graphics_device;
pub mod resource;
pub mod renderer;
pub mod render_pass;
pub mod filter;
pub mod host;

// Main lumen3d namespace module
pub mod lumen3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Configuration
    pub use crate::config::{BloomConfig, RendererConfig, ShadowConfig};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Renderer and render passes
    pub mod render {
        pub use crate::renderer::*;
        pub use crate::render_pass::*;
    }

    // Post-process filters
    pub mod filter {
        pub use crate::filter::*;
    }

    // Backend contracts
    pub mod graphics {
        pub use crate::graphics_device::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Host integration
    pub mod host {
        pub use crate::host::*;
    }
}

// Re-export math library at crate root
pub use glam;
