//! Error types for the geovis runtime
//!
//! Most "nothing found" outcomes (picking, terrain, visibility) are expressed
//! with `Option` and never reach this module. `Error` covers the failures a
//! host scene can report back: operations against a destroyed scene, invalid
//! configurations and unknown resources.

use std::fmt;

/// Result type for geovis operations
pub type Result<T> = std::result::Result<T, Error>;

/// Geovis runtime errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The host scene has already been torn down
    SceneDestroyed,

    /// Caller supplied a configuration the engine cannot act on
    InvalidConfiguration(String),

    /// Unknown or stale resource handle (entity, primitive, shadow map)
    InvalidResource(String),

    /// Host-specific failure
    HostError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SceneDestroyed => write!(f, "Scene already destroyed"),
            Error::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::HostError(msg) => write!(f, "Host error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an ERROR with file:line and build an `Error::HostError`
///
/// # Example
///
/// ```ignore
/// let key = map.get(name).ok_or_else(|| geovis_err!("geovis::Mock", "unknown entity {}", name))?;
/// ```
#[macro_export]
macro_rules! geovis_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::geovis::Runtime::log_detailed(
            $crate::geovis::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::geovis::Error::HostError(message)
    }};
}

/// Log an ERROR and return early with `Err(Error::HostError)`
#[macro_export]
macro_rules! geovis_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::geovis_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
