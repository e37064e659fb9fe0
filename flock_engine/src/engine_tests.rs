//! Unit tests for the Engine logging hub
//!
//! IMPORTANT: the logger sink is a process-wide global. All tests are marked
//! with #[serial] and restore the default logger when done.

use crate::flock::Engine;
use crate::flock::log::{Logger, LogEntry, LogSeverity};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Test logger that captures log entries for verification
struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn capture() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CaptureLogger { entries: entries.clone() });
    entries
}

/// Entries logged by these tests; other unit tests may log concurrently
fn ours(entries: &Arc<Mutex<Vec<LogEntry>>>) -> Vec<LogEntry> {
    entries
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.source == "flock::test")
        .cloned()
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[test]
#[serial]
fn test_log_reaches_custom_logger() {
    let entries = capture();

    Engine::log(LogSeverity::Info, "flock::test", "hello".to_string());

    let entries = ours(&entries);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, LogSeverity::Info);
    assert_eq!(entries[0].source, "flock::test");
    assert_eq!(entries[0].message, "hello");
    assert!(entries[0].file.is_none());
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_log_detailed_carries_location() {
    let entries = capture();

    Engine::log_detailed(LogSeverity::Error, "flock::test", "failed".to_string(), "frame.rs", 42);

    let entries = ours(&entries);
    assert_eq!(entries[0].file, Some("frame.rs"));
    assert_eq!(entries[0].line, Some(42));
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_reset_logger_detaches_custom_sink() {
    let entries = capture();
    Engine::reset_logger();

    Engine::log(LogSeverity::Trace, "flock::test", "not captured".to_string());

    assert!(ours(&entries).is_empty());
}

#[test]
#[serial]
fn test_set_logger_replaces_previous_sink() {
    let first = capture();
    let second = capture();

    Engine::log(LogSeverity::Warn, "flock::test", "second only".to_string());

    assert!(ours(&first).is_empty());
    assert_eq!(ours(&second).len(), 1);
    Engine::reset_logger();
}
