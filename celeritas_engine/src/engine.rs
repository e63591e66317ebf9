/// Celeritas Engine - process-wide singleton state
///
/// Holds the active logger and the engine lifecycle flag. Rendering state
/// never lives here: backends are owned values created by the application.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;

use crate::error::Result;
use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

struct EngineState {
    running: AtomicBool,
}

fn logger() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::new())))
}

// ===== PUBLIC API =====

/// Engine singleton manager
///
/// # Example
///
/// ```no_run
/// use celeritas_engine::celeritas::Engine;
///
/// Engine::initialize()?;
/// // create a backend, run frames...
/// Engine::shutdown();
/// # Ok::<(), celeritas_engine::celeritas::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Initialize the engine
    ///
    /// Idempotent. Must be called before any backend is created.
    ///
    /// # Errors
    ///
    /// Currently always succeeds, but returns Result for future extensibility.
    pub fn initialize() -> Result<()> {
        let state = ENGINE_STATE.get_or_init(|| EngineState {
            running: AtomicBool::new(false),
        });
        if !state.running.swap(true, Ordering::SeqCst) {
            crate::engine_info!("celeritas::Engine", "Engine initialized");
        }
        Ok(())
    }

    /// Mark the engine as shut down
    ///
    /// Backends must already have been shut down by their owners.
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            if state.running.swap(false, Ordering::SeqCst) {
                crate::engine_info!("celeritas::Engine", "Engine shut down");
            }
        }
    }

    /// Whether `initialize()` has been called without a matching `shutdown()`
    pub fn is_initialized() -> bool {
        ENGINE_STATE
            .get()
            .map(|state| state.running.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    /// Reset singleton state for testing (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state) = ENGINE_STATE.get() {
            state.running.store(false, Ordering::SeqCst);
        }
        Self::reset_logger();
    }

    // ===== LOGGING API =====

    /// Replace the active logger
    ///
    /// # Example
    ///
    /// ```no_run
    /// use celeritas_engine::celeritas::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct Silent;
    /// impl Logger for Silent {
    ///     fn log(&self, _entry: &LogEntry) {}
    /// }
    ///
    /// Engine::set_logger(Silent);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger_impl: L) {
        if let Ok(mut lock) = logger().write() {
            *lock = Box::new(logger_impl);
        }
    }

    /// Restore the [`DefaultLogger`]
    pub fn reset_logger() {
        if let Ok(mut lock) = logger().write() {
            *lock = Box::new(DefaultLogger::new());
        }
    }

    /// Forward an entry without location to the active logger
    ///
    /// Used by `engine_trace!` .. `engine_warn!`.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        if let Ok(lock) = logger().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Forward an entry carrying file:line to the active logger
    ///
    /// Used by `engine_error!`, `engine_err!` and `engine_bail!`.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if let Ok(lock) = logger().read() {
            lock.log(&LogEntry {
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
