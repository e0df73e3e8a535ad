//! Unit tests for the Engine logging facade
//!
//! IMPORTANT: the logger is process-wide. All tests swapping it are #[serial].

use crate::nebula3d::Engine;
use crate::nebula3d::log::{Logger, LogEntry, LogSeverity};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<(LogSeverity, String, bool)>>>,
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        // Other tests may log concurrently; only keep ours
        if entry.source != "nebula3d::engine_test" {
            return;
        }
        self.entries.lock().unwrap().push((
            entry.severity,
            entry.message.clone(),
            entry.file.is_some() && entry.line.is_some(),
        ));
    }
}

fn install_test_logger() -> Arc<Mutex<Vec<(LogSeverity, String, bool)>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(TestLogger { entries: entries.clone() });
    entries
}

// ============================================================================
// LOGGING API TESTS
// ============================================================================

#[test]
#[serial]
fn test_set_logger_receives_macro_output() {
    let entries = install_test_logger();

    crate::engine_info!("nebula3d::engine_test", "loaded {} nodes", 3);
    crate::engine_warn!("nebula3d::engine_test", "clamped");

    let captured = entries.lock().unwrap().clone();
    assert_eq!(captured.len(), 2);
    assert_eq!(captured[0], (LogSeverity::Info, "loaded 3 nodes".to_string(), false));
    assert_eq!(captured[1].0, LogSeverity::Warn);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_error_macro_carries_location() {
    let entries = install_test_logger();

    crate::engine_error!("nebula3d::engine_test", "broken");

    let captured = entries.lock().unwrap().clone();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].0, LogSeverity::Error);
    assert!(captured[0].2);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_engine_err_logs_once() {
    let entries = install_test_logger();

    let _ = crate::engine_err!("nebula3d::engine_test", "no free id");

    assert_eq!(entries.lock().unwrap().len(), 1);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_reset_logger_detaches_custom_logger() {
    let entries = install_test_logger();
    Engine::reset_logger();

    crate::engine_trace!("nebula3d::engine_test", "goes to the default logger");

    assert!(entries.lock().unwrap().is_empty());
}
