//! Integration tests for the engine logging hub and error macros
//!
//! No GPU required.
//!
//! Run with: cargo test --test logging_integration_tests

use flock_engine::flock::log::{LogEntry, LogSeverity, Logger};
use flock_engine::flock::memory::{MemoryProperties, MemoryTypeTable};
use flock_engine::flock::transfer::check_staging_capacity;
use flock_engine::flock::config::STAGING_CAPACITY;
use flock_engine::flock::{Engine, Error, Result};
use flock_engine::{engine_bail, engine_err, engine_info};
use serial_test::serial;
use std::sync::{Arc, Mutex};

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Captures entries for inspection
struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CaptureLogger {
    fn install() -> Arc<Mutex<Vec<LogEntry>>> {
        let entries = Arc::new(Mutex::new(Vec::new()));
        Engine::set_logger(Self { entries: entries.clone() });
        entries
    }
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

// ============================================================================
// LOGGER HUB
// ============================================================================

#[test]
#[serial]
fn test_integration_custom_logger_receives_entries() {
    let entries = CaptureLogger::install();

    Engine::log(LogSeverity::Info, "flock::test", "first".to_string());
    engine_info!("flock::test", "second {}", 2);

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[1].message, "second 2");
        assert_eq!(captured[1].source, "flock::test");
        assert!(captured[1].file.is_none());
    }

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_reset_detaches_custom_logger() {
    let entries = CaptureLogger::install();
    Engine::log(LogSeverity::Info, "flock::test", "captured".to_string());
    Engine::reset_logger();
    Engine::log(LogSeverity::Info, "flock::test", "not captured".to_string());

    assert_eq!(entries.lock().unwrap().len(), 1);
}

// ============================================================================
// ERROR MACROS
// ============================================================================

fn failing_step() -> Result<u32> {
    engine_bail!("flock::test", "fence creation failed: {}", -3);
}

#[test]
#[serial]
fn test_integration_bail_logs_with_location() {
    let entries = CaptureLogger::install();

    let err = failing_step().unwrap_err();
    assert_eq!(err, Error::BackendError("fence creation failed: -3".to_string()));

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].severity, LogSeverity::Error);
        assert!(captured[0].file.unwrap().ends_with("logging_integration_tests.rs"));
        assert!(captured[0].line.is_some());
    }

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_err_macro_builds_backend_error() {
    let entries = CaptureLogger::install();
    let err = engine_err!("flock::test", "vkQueueSubmit: {:?}", "ERROR_UNKNOWN");
    assert!(matches!(err, Error::BackendError(ref m) if m.contains("ERROR_UNKNOWN")));
    assert!(!err.is_recoverable());
    assert_eq!(entries.lock().unwrap().len(), 1);
    Engine::reset_logger();
}

// ============================================================================
// ENGINE PATHS THAT LOG
// ============================================================================

#[test]
#[serial]
fn test_integration_staging_overflow_warns() {
    let entries = CaptureLogger::install();

    let result = check_staging_capacity(STAGING_CAPACITY + 1);
    assert!(matches!(result, Err(Error::InvalidResource(_))));

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].severity, LogSeverity::Warn);
        assert_eq!(captured[0].source, "flock::transfer");
    }

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_memory_fallback_logs_error_then_warning() {
    let entries = CaptureLogger::install();

    let table = MemoryTypeTable::new(vec![MemoryProperties::DEVICE_LOCAL]);
    let index = table
        .find_memory_type_or_degrade(0b1, MemoryProperties::DEVICE_LOCAL | MemoryProperties::LAZILY_ALLOCATED)
        .unwrap();
    assert_eq!(index, 0);

    {
        let captured = entries.lock().unwrap();
        let severities: Vec<LogSeverity> = captured.iter().map(|e| e.severity).collect();
        assert_eq!(severities, vec![LogSeverity::Error, LogSeverity::Warn]);
    }

    Engine::reset_logger();
}
