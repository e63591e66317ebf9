//! Integration tests for the logging system
//!
//! Exercises the public logging API and the entries the memory layer emits.
//! No GPU required.
//!
//! Run with: cargo test --test logging_integration_tests

use celeritas_engine::celeritas::log::{LogEntry, LogSeverity, Logger};
use celeritas_engine::celeritas::memory::Pool;
use celeritas_engine::celeritas::render::BufferHandle;
use celeritas_engine::celeritas::{Engine, Error};
use serial_test::serial;
use std::sync::{Arc, Mutex};

// ============================================================================
// Test Logger
// ============================================================================

struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn from_source(entries: &Arc<Mutex<Vec<LogEntry>>>, source: &str) -> Vec<LogEntry> {
    entries
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.source == source)
        .cloned()
        .collect()
}

// ============================================================================
// Custom logger
// ============================================================================

#[test]
#[serial]
fn test_custom_logger_receives_entries() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    Engine::log(LogSeverity::Info, "it::custom", "hello".to_string());
    Engine::log(LogSeverity::Warn, "it::custom", "careful".to_string());

    let logged = from_source(&entries, "it::custom");
    assert_eq!(logged.len(), 2);
    assert_eq!(logged[0].severity, LogSeverity::Info);
    assert_eq!(logged[0].message, "hello");
    assert!(logged[0].file.is_none());
    assert_eq!(logged[1].severity, LogSeverity::Warn);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_detailed_entries_carry_location() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    Engine::log_detailed(LogSeverity::Error, "it::detailed", "boom".to_string(), "lib.rs", 42);

    let logged = from_source(&entries, "it::detailed");
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].file, Some("lib.rs"));
    assert_eq!(logged[0].line, Some(42));

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_reset_logger_stops_forwarding() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);
    Engine::reset_logger();

    Engine::log(LogSeverity::Info, "it::reset", "dropped".to_string());
    assert!(from_source(&entries, "it::reset").is_empty());
}

// ============================================================================
// Entries emitted by the memory layer
// ============================================================================

#[test]
#[serial]
fn test_pool_exhaustion_is_warned() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    let mut pool: Pool<u32, BufferHandle> = Pool::new("it_buffers", 1).unwrap();
    assert!(pool.insert(1).is_some());
    assert!(pool.insert(2).is_none());

    let warnings: Vec<LogEntry> = from_source(&entries, "celeritas::Pool")
        .into_iter()
        .filter(|e| e.severity == LogSeverity::Warn)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("it_buffers"));

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_stale_release_is_logged_as_error() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    let mut pool: Pool<u32, BufferHandle> = Pool::new("it_stale", 2).unwrap();
    let handle = pool.insert(7).unwrap();
    pool.dealloc(handle).unwrap();
    let result = pool.dealloc(handle);
    assert!(matches!(result, Err(Error::StaleHandle(_))));

    let errors: Vec<LogEntry> = from_source(&entries, "celeritas::Pool")
        .into_iter()
        .filter(|e| e.severity == LogSeverity::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].file.is_some());
    assert!(errors[0].line.is_some());

    Engine::reset_logger();
}

// ============================================================================
// Engine lifecycle
// ============================================================================

#[test]
#[serial]
fn test_initialize_and_shutdown() {
    Engine::initialize().unwrap();
    assert!(Engine::is_initialized());
    Engine::initialize().unwrap();
    assert!(Engine::is_initialized());
    Engine::shutdown();
    assert!(!Engine::is_initialized());
}
