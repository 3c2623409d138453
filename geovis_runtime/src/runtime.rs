/// Geovis runtime - process-wide services
///
/// Holds the global logger and an optional shared `MaterialRegistry`.
/// Engines never reach for the shared registry implicitly: callers either
/// pass an explicit registry or fetch this one and pass it along, which keeps
/// tests free to use their own isolated registry.

use std::sync::{OnceLock, RwLock, Arc, Mutex};
use std::time::SystemTime;
use crate::material::MaterialRegistry;
use crate::error::{Result, Error};
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global runtime state storage
static RUNTIME_STATE: OnceLock<RuntimeState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

struct RuntimeState {
    /// Shared material registry
    material_registry: RwLock<Option<Arc<Mutex<MaterialRegistry>>>>,
}

impl RuntimeState {
    fn new() -> Self {
        Self {
            material_registry: RwLock::new(None),
        }
    }
}

// ===== PUBLIC API =====

/// Process-wide runtime services
///
/// # Example
///
/// ```no_run
/// use geovis_runtime::geovis::Runtime;
///
/// Runtime::initialize()?;
/// Runtime::create_material_registry()?;
/// let registry = Runtime::material_registry()?;
/// // build materials against registry...
/// Runtime::shutdown();
/// # Ok::<(), geovis_runtime::geovis::Error>(())
/// ```
pub struct Runtime;

impl Runtime {
    fn log_and_return_error(error: Error) -> Error {
        crate::geovis_error!("geovis::Runtime", "{}", error);
        error
    }

    fn state() -> Result<&'static RuntimeState> {
        RUNTIME_STATE.get().ok_or_else(|| Self::log_and_return_error(
            Error::InvalidConfiguration("Runtime not initialized. Call Runtime::initialize() first.".to_string())
        ))
    }

    /// Initialize the runtime (idempotent)
    pub fn initialize() -> Result<()> {
        RUNTIME_STATE.get_or_init(RuntimeState::new);
        Ok(())
    }

    /// Drop every runtime-owned service
    pub fn shutdown() {
        if let Some(state) = RUNTIME_STATE.get() {
            if let Ok(mut registry) = state.material_registry.write() {
                *registry = None;
            }
        }
    }

    // ===== MATERIAL REGISTRY API =====

    /// Create the shared material registry
    ///
    /// # Errors
    ///
    /// - runtime not initialized
    /// - a shared registry already exists
    pub fn create_material_registry() -> Result<()> {
        let state = Self::state()?;

        let mut lock = state.material_registry.write()
            .map_err(|_| crate::geovis_err!("geovis::Runtime", "MaterialRegistry lock poisoned"))?;

        if lock.is_some() {
            return Err(Self::log_and_return_error(
                Error::InvalidConfiguration("MaterialRegistry already exists. Call Runtime::destroy_material_registry() first.".to_string())
            ));
        }

        *lock = Some(Arc::new(Mutex::new(MaterialRegistry::new())));

        crate::geovis_info!("geovis::Runtime", "Shared MaterialRegistry created");

        Ok(())
    }

    /// Get the shared material registry
    pub fn material_registry() -> Result<Arc<Mutex<MaterialRegistry>>> {
        let state = Self::state()?;

        let lock = state.material_registry.read()
            .map_err(|_| crate::geovis_err!("geovis::Runtime", "MaterialRegistry lock poisoned"))?;

        lock.clone()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InvalidConfiguration("MaterialRegistry not created. Call Runtime::create_material_registry() first.".to_string())
            ))
    }

    /// Destroy the shared material registry
    ///
    /// Existing `Arc` holders keep their registry alive; the next
    /// `create_material_registry()` starts from an empty cache.
    pub fn destroy_material_registry() -> Result<()> {
        let state = Self::state()?;

        let mut lock = state.material_registry.write()
            .map_err(|_| crate::geovis_err!("geovis::Runtime", "MaterialRegistry lock poisoned"))?;

        *lock = None;

        crate::geovis_info!("geovis::Runtime", "Shared MaterialRegistry destroyed");

        Ok(())
    }

    /// Reset all singletons (test builds only)
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state) = RUNTIME_STATE.get() {
            if let Ok(mut registry) = state.material_registry.write() {
                *registry = None;
            }
        }
    }

    // ===== LOGGING API =====

    /// Replace the default logger
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut lock) = logger_slot().write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to `DefaultLogger`
    pub fn reset_logger() {
        Self::set_logger(DefaultLogger::default());
    }

    /// Log without file:line (used by `geovis_info!`, `geovis_warn!`, ...)
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        dispatch(severity, source, message, None);
    }

    /// Log with file:line (used by `geovis_error!`)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        dispatch(severity, source, message, Some((file, line)));
    }
}

fn logger_slot() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::default())))
}

fn dispatch(severity: LogSeverity, source: &str, message: String, location: Option<(&'static str, u32)>) {
    if let Ok(logger) = logger_slot().read() {
        logger.log(&LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: location.map(|(file, _)| file),
            line: location.map(|(_, line)| line),
        });
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
