//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, and DefaultLogger filtering/formatting.

use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

fn entry(severity: LogSeverity, message: &str) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "nebula3d::test".to_string(),
        message: message.to_string(),
        file: None,
        line: None,
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
fn test_log_severity_labels_have_fixed_width() {
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        assert_eq!(severity.label().len(), 5);
    }
    assert_eq!(LogSeverity::Warn.label().trim(), "WARN");
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_minimum_severity() {
    assert_eq!(DefaultLogger::new().minimum_severity(), LogSeverity::Debug);
    assert_eq!(DefaultLogger::default().minimum_severity(), LogSeverity::Debug);

    let logger = DefaultLogger::with_minimum_severity(LogSeverity::Warn);
    assert_eq!(logger.minimum_severity(), LogSeverity::Warn);
}

#[test]
fn test_default_logger_does_not_panic() {
    let logger = DefaultLogger::with_minimum_severity(LogSeverity::Trace);
    logger.log(&entry(LogSeverity::Trace, "trace"));
    logger.log(&entry(LogSeverity::Info, "info"));

    let mut error = entry(LogSeverity::Error, "error");
    error.file = Some("framebuffer_manager.rs");
    error.line = Some(42);
    logger.log(&error);
}

#[test]
fn test_format_plain_without_location() {
    let text = DefaultLogger::format_plain(&entry(LogSeverity::Info, "Compositor loaded"));
    assert!(text.contains("[INFO ]"));
    assert!(text.contains("[nebula3d::test]"));
    assert!(text.ends_with("Compositor loaded"));
}

#[test]
fn test_format_plain_with_location() {
    let mut error = entry(LogSeverity::Error, "Unknown framebuffer");
    error.file = Some("framebuffer_manager.rs");
    error.line = Some(7);
    let text = DefaultLogger::format_plain(&error);
    assert!(text.contains("[ERROR]"));
    assert!(text.ends_with("Unknown framebuffer (framebuffer_manager.rs:7)"));
}

// ============================================================================
// CUSTOM LOGGER TESTS
// ============================================================================

struct CapturingLogger {
    messages: Arc<Mutex<Vec<String>>>,
}

impl Logger for CapturingLogger {
    fn log(&self, entry: &LogEntry) {
        self.messages.lock().unwrap().push(entry.message.clone());
    }
}

#[test]
fn test_custom_logger_implementation() {
    let messages = Arc::new(Mutex::new(Vec::new()));
    let logger = CapturingLogger { messages: messages.clone() };

    logger.log(&entry(LogSeverity::Debug, "first"));
    logger.log(&entry(LogSeverity::Warn, "second"));

    assert_eq!(*messages.lock().unwrap(), vec!["first".to_string(), "second".to_string()]);
}

#[test]
fn test_logger_trait_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DefaultLogger>();
    assert_send_sync::<CapturingLogger>();
}
