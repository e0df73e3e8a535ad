//! Error types for the Nebula3D engine
//!
//! Recoverable failures on the API surface (factory failures, lock poisoning,
//! unknown assets handed in by the caller) are reported through [`Error`].
//! Contract violations inside trusted code stay debug assertions.

use std::fmt;

/// Result type for Nebula3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Nebula3D engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (Null RHI, native backends, etc.)
    BackendError(String),

    /// Out of GPU memory or out of handle IDs
    OutOfMemory,

    /// Invalid resource (texture, framebuffer, compositor node, etc.)
    InvalidResource(String),

    /// Initialization failed (engine, RHI, subsystems)
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Log an error and build an [`Error::BackendError`] from it
///
/// # Example
///
/// ```ignore
/// let texture = textures.get(id)
///     .ok_or_else(|| engine_err!("nebula3d::Renderer", "Unknown texture {}", id))?;
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::nebula3d::Error::BackendError(message)
    }};
}

/// Log an error and return it from the current function
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
