//! Error types for the Celeritas engine
//!
//! This module defines the error type shared by the memory layer, the render
//! abstraction layer and every backend.

use std::fmt;

/// Result type for Celeritas engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Celeritas engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (OpenGL, Vulkan, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, buffer, shader, renderpass, etc.)
    InvalidResource(String),

    /// Initialization failed (engine, backend, subsystems)
    InitializationFailed(String),

    /// Handle is out of range for its pool or is the invalid sentinel
    InvalidHandle(String),

    /// Handle refers to a slot that was released (and possibly reused)
    StaleHandle(String),

    /// A fixed-capacity pool has no free slot left
    PoolExhausted(String),

    /// A bump arena cannot satisfy an allocation
    ArenaExhausted {
        requested: usize,
        available: usize,
    },

    /// Shader compilation or program linking failed (carries the info log)
    ShaderCompilation(String),

    /// Operation issued in the wrong frame/encoder state
    InvalidState(String),

    /// Feature not supported by the active backend
    Unsupported(String),
}

impl Error {
    /// Whether this error belongs to the class an application cannot recover
    /// from (arena exhaustion, shader compilation, failed initialization).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ArenaExhausted { .. }
                | Error::ShaderCompilation(_)
                | Error::InitializationFailed(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::InvalidHandle(msg) => write!(f, "Invalid handle: {}", msg),
            Error::StaleHandle(msg) => write!(f, "Stale handle: {}", msg),
            Error::PoolExhausted(msg) => write!(f, "Pool exhausted: {}", msg),
            Error::ArenaExhausted { requested, available } => write!(
                f,
                "Arena exhausted: requested {} bytes, {} available",
                requested, available
            ),
            Error::ShaderCompilation(log) => write!(f, "Shader compilation failed: {}", log),
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Error::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an ERROR (with file:line) and build an `Error::BackendError` from the
/// same message.
///
/// # Example
///
/// ```no_run
/// # use celeritas_engine::engine_err;
/// let err = engine_err!("celeritas::Pool", "slot {} out of range", 7);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::celeritas::Engine::log_detailed(
            $crate::celeritas::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::celeritas::Error::BackendError(message)
    }};
}

/// Log an ERROR and return early with `Err(Error::BackendError(..))`.
///
/// # Example
///
/// ```no_run
/// # use celeritas_engine::engine_bail;
/// fn check(n: u32) -> celeritas_engine::celeritas::Result<()> {
///     if n > 8 {
///         engine_bail!("celeritas::Pipeline", "too many layouts: {}", n);
///     }
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

/// Log an ERROR and return early with the given error value.
///
/// Used where the error variant carries meaning beyond `BackendError`
/// (stale handles, invalid state, ...).
#[macro_export]
macro_rules! engine_fail {
    ($source:expr, $err:expr) => {{
        let err = $err;
        $crate::celeritas::Engine::log_detailed(
            $crate::celeritas::log::LogSeverity::Error,
            $source,
            err.to_string(),
            file!(),
            line!()
        );
        return Err(err);
    }};
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
