//! Unit tests for the Runtime singleton
//!
//! RUNTIME_STATE and LOGGER are process-wide, so every test is #[serial].

use crate::geovis::{Runtime, Error};
use crate::geovis::log::{Logger, LogEntry, LogSeverity};
use std::sync::{Arc, Mutex};
use serial_test::serial;

struct CaptureLogger {
    source: &'static str,
    entries: Arc<Mutex<Vec<(LogSeverity, String)>>>,
}

impl Logger for CaptureLogger {
    // Other test modules may log concurrently; keep only our source.
    fn log(&self, entry: &LogEntry) {
        if entry.source == self.source {
            self.entries.lock().unwrap().push((entry.severity, entry.message.clone()));
        }
    }
}

fn setup() {
    Runtime::reset_for_testing();
    let _ = Runtime::initialize();
}

// ============================================================================
// MATERIAL REGISTRY
// ============================================================================

#[test]
#[serial]
fn test_create_and_get_material_registry() {
    setup();
    Runtime::create_material_registry().unwrap();

    let a = Runtime::material_registry().unwrap();
    let b = Runtime::material_registry().unwrap();
    assert!(Arc::ptr_eq(&a, &b));

    Runtime::destroy_material_registry().unwrap();
}

#[test]
#[serial]
fn test_create_material_registry_twice_fails() {
    setup();
    Runtime::create_material_registry().unwrap();

    let result = Runtime::create_material_registry();
    assert!(matches!(result, Err(Error::InvalidConfiguration(_))));

    Runtime::destroy_material_registry().unwrap();
}

#[test]
#[serial]
fn test_material_registry_missing_is_error() {
    setup();
    assert!(Runtime::material_registry().is_err());
}

#[test]
#[serial]
fn test_destroy_keeps_existing_handles_alive() {
    setup();
    Runtime::create_material_registry().unwrap();
    let held = Runtime::material_registry().unwrap();

    Runtime::destroy_material_registry().unwrap();

    assert!(Runtime::material_registry().is_err());
    assert_eq!(held.lock().unwrap().len(), 0);
}

#[test]
#[serial]
fn test_shutdown_clears_registry() {
    setup();
    Runtime::create_material_registry().unwrap();
    Runtime::shutdown();
    assert!(Runtime::material_registry().is_err());
}

// ============================================================================
// LOGGING
// ============================================================================

#[test]
#[serial]
fn test_errors_are_logged() {
    setup();
    let entries = Arc::new(Mutex::new(Vec::new()));
    Runtime::set_logger(CaptureLogger { source: "geovis::Runtime", entries: entries.clone() });

    let _ = Runtime::material_registry();

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].0, LogSeverity::Error);
        assert!(captured[0].1.contains("MaterialRegistry not created"));
    }

    Runtime::reset_logger();
}

#[test]
#[serial]
fn test_macros_route_through_runtime_logger() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Runtime::set_logger(CaptureLogger { source: "geovis::Test", entries: entries.clone() });

    crate::geovis_info!("geovis::Test", "session {} started", 3);
    crate::geovis_warn!("geovis::Test", "ignored");

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0], (LogSeverity::Info, "session 3 started".to_string()));
        assert_eq!(captured[1].0, LogSeverity::Warn);
    }

    Runtime::reset_logger();
}
