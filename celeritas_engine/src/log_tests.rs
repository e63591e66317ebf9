//! Unit tests for log.rs

use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
use std::time::SystemTime;

fn entry(severity: LogSeverity, file: Option<&'static str>, line: Option<u32>) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "celeritas::Pool".to_string(),
        message: "slot released".to_string(),
        file,
        line,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_labels_are_fixed_width() {
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        assert_eq!(severity.label().len(), 5);
    }
    assert_eq!(LogSeverity::Info.label().trim_end(), "INFO");
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_min_severity() {
    assert_eq!(DefaultLogger::new().min_severity(), LogSeverity::Debug);
    assert_eq!(DefaultLogger::default().min_severity(), LogSeverity::Debug);
    let quiet = DefaultLogger::with_min_severity(LogSeverity::Warn);
    assert_eq!(quiet.min_severity(), LogSeverity::Warn);
}

#[test]
fn test_default_logger_accepts_all_severities() {
    let logger = DefaultLogger::with_min_severity(LogSeverity::Trace);
    logger.log(&entry(LogSeverity::Trace, None, None));
    logger.log(&entry(LogSeverity::Error, Some("pool.rs"), Some(12)));
}

#[test]
fn test_format_plain_without_location() {
    let text = DefaultLogger::format_plain(&entry(LogSeverity::Info, None, None));
    assert!(text.contains("[INFO ]"));
    assert!(text.contains("[celeritas::Pool]"));
    assert!(text.ends_with("slot released"));
}

#[test]
fn test_format_plain_with_location() {
    let text = DefaultLogger::format_plain(&entry(LogSeverity::Error, Some("pool.rs"), Some(12)));
    assert!(text.contains("[ERROR]"));
    assert!(text.ends_with("(pool.rs:12)"));
}

#[test]
fn test_format_plain_needs_both_file_and_line() {
    let text = DefaultLogger::format_plain(&entry(LogSeverity::Error, Some("pool.rs"), None));
    assert!(!text.contains("pool.rs"));
}

// ============================================================================
// CUSTOM LOGGER TESTS
// ============================================================================

struct CountingLogger {
    count: std::sync::atomic::AtomicUsize,
}

impl Logger for CountingLogger {
    fn log(&self, _entry: &LogEntry) {
        self.count.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

#[test]
fn test_custom_logger_trait_object() {
    let logger = CountingLogger { count: std::sync::atomic::AtomicUsize::new(0) };
    {
        let dyn_logger: &dyn Logger = &logger;
        dyn_logger.log(&entry(LogSeverity::Debug, None, None));
        dyn_logger.log(&entry(LogSeverity::Warn, None, None));
    }
    assert_eq!(logger.count.load(std::sync::atomic::Ordering::SeqCst), 2);
}
