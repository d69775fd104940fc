//! Error types for the Lumen3D engine
//!
//! Resource creation (shader programs, framebuffers, buffers) reports failures
//! through these values so a host can refuse to proceed. Uniform lookups never
//! produce errors: a missing name simply means the effect has no such parameter.

use std::fmt;

/// Result type for Lumen3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lumen3D engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (OpenGL, Vulkan, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, buffer, pass input, etc.)
    InvalidResource(String),

    /// Initialization failed (engine, renderer, passes, configuration)
    InitializationFailed(String),

    /// A shader program failed to compile or link
    ShaderCompilation {
        /// Label of the program that failed
        label: String,
        /// Compiler or linker output
        log: String,
    },

    /// A framebuffer did not pass its completeness check
    IncompleteFramebuffer(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::ShaderCompilation { label, log } => {
                write!(f, "Shader program '{}' failed to build: {}", label, log)
            }
            Error::IncompleteFramebuffer(label) => {
                write!(f, "Framebuffer '{}' is incomplete", label)
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
