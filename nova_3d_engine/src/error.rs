//! Engine error type and the macros that build it.
//!
//! One enum covers the whole crate. The variants follow the failure
//! classes the engine actually distinguishes: fatal configuration errors
//! caught at construction, backend faults, and resource problems.
//! Not-ready conditions are deliberately NOT errors — passes signal them
//! by returning `Ok(None)` / `false` and retry next frame.

use std::fmt;

/// Result type for Nova3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Nova3D engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Invalid authored content detected at construction (duplicate scene
    /// object id, mismatched texture array lengths, ...). Fatal: there is
    /// no recovery path, initialization must abort.
    Configuration(String),

    /// Fault reported by the graphics backend
    BackendError(String),

    /// GPU memory exhausted
    OutOfMemory,

    /// A buffer, texture or pipeline object in an unusable state
    InvalidResource(String),

    /// Engine, device or subsystem failed to start
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Build an `Error::InvalidResource`, logging it through the engine logger.
///
/// # Example
///
/// ```ignore
/// let err = engine_err!("nova3d::Scene", "Mesh has no LODs");
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::nova3d::Error::InvalidResource(message)
    }};
}

/// Return early with an `Error::InvalidResource`, logging it first.
///
/// # Example
///
/// ```ignore
/// if registry.contains(name) {
///     engine_bail!("nova3d::DrawerRegistry", "Drawer '{}' already exists", name);
/// }
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

/// Build an `Error::Configuration`, logging it through the engine logger.
///
/// Configuration errors indicate invalid authored content and abort
/// initialization of the component that detected them.
#[macro_export]
macro_rules! engine_config_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::nova3d::Error::Configuration(message)
    }};
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
