/// Engine singleton — process-wide home of the device and the logger.
///
/// The engine owns the two pieces of state that genuinely span the whole
/// process: the graphics device and the log sink. Both live behind an
/// explicit initialize/shutdown lifecycle so tests can tear the world down
/// and rebuild it; nothing else in the crate keeps hidden global state.

use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::time::SystemTime;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::log::{DefaultLogger, LogEntry, Logger, LogSeverity};

// ===== INTERNAL STATE =====

static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Installed log sink; lazily seeded with `DefaultLogger`.
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

struct EngineState {
    /// The device slot. Empty until `create_device`, empty again after
    /// `destroy_device` or `shutdown`.
    device: RwLock<Option<Arc<Mutex<dyn Device>>>>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            device: RwLock::new(None),
        }
    }
}

fn logger_slot() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

// ===== PUBLIC API =====

/// Static access point for the engine-wide singletons.
///
/// # Example
///
/// ```no_run
/// use nova_3d_engine::nova3d::Engine;
///
/// Engine::initialize()?;
///
/// // A backend crate provides the concrete device:
/// // Engine::create_device(VulkanDevice::new(&window, config)?)?;
///
/// let device = Engine::device()?;
///
/// Engine::shutdown();
/// # Ok::<(), nova_3d_engine::nova3d::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Log an error through the engine logger, then hand it back for `?`.
    fn log_and_return_error(error: Error) -> Error {
        crate::engine_error!("nova3d::Engine", "{}", error);
        error
    }

    /// Set up the engine state. Call once at application startup; calling
    /// again is harmless.
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(EngineState::new);
        Ok(())
    }

    /// Drop every singleton the engine holds.
    ///
    /// Call at application exit. `initialize()` must run again before a new
    /// device can be registered.
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut device) = state.device.write() {
                *device = None;
            }
        }
    }

    /// Wrap a backend device and register it as the process-wide singleton.
    ///
    /// # Errors
    ///
    /// Fails if the engine is uninitialized or a device is already
    /// registered.
    pub fn create_device<D: Device + 'static>(device: D) -> Result<()> {
        let shared: Arc<Mutex<dyn Device>> = Arc::new(Mutex::new(device));
        Self::register_device(shared)?;

        crate::engine_info!("nova3d::Engine", "Device singleton created successfully");
        Ok(())
    }

    /// Install an already-shared device (backend plugin path).
    pub(crate) fn register_device(device: Arc<Mutex<dyn Device>>) -> Result<()> {
        let state = ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized. Call Engine::initialize() first.".to_string())
            ))?;

        let mut slot = state.device.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Device lock poisoned".to_string())
            ))?;

        if slot.is_some() {
            return Err(Self::log_and_return_error(
                Error::InitializationFailed("Device already exists. Call Engine::destroy_device() first.".to_string())
            ));
        }

        *slot = Some(device);
        Ok(())
    }

    /// The registered device.
    ///
    /// # Errors
    ///
    /// Fails if the engine is uninitialized or no device is registered yet.
    pub fn device() -> Result<Arc<Mutex<dyn Device>>> {
        let state = ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized. Call Engine::initialize() first.".to_string())
            ))?;

        let slot = state.device.read()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Device lock poisoned".to_string())
            ))?;

        slot.clone()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Device not created. Call Engine::create_device() first.".to_string())
            ))
    }

    /// Unregister the device so a new one can take its place.
    ///
    /// Handles already held by callers stay valid until dropped.
    pub fn destroy_device() -> Result<()> {
        let state = ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized".to_string())
            ))?;

        let mut slot = state.device.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Device lock poisoned".to_string())
            ))?;

        *slot = None;

        crate::engine_info!("nova3d::Engine", "Device singleton destroyed");
        Ok(())
    }

    /// Clear singleton state between tests.
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut device) = state.device.write() {
                *device = None;
            }
        }
    }

    // ===== LOGGING API =====

    /// Install a custom log sink in place of the console logger.
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut slot) = logger_slot().write() {
            *slot = Box::new(logger);
        }
    }

    /// Put the default console logger back.
    pub fn reset_logger() {
        if let Ok(mut slot) = logger_slot().write() {
            *slot = Box::new(DefaultLogger);
        }
    }

    /// Emit a log entry through the installed sink (macro plumbing).
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        if let Ok(logger) = logger_slot().read() {
            logger.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Emit a log entry that carries its call site (`engine_error!` plumbing).
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if let Ok(logger) = logger_slot().read() {
            logger.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
