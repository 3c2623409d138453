//! Internal logging system for the geovis runtime
//!
//! - Customizable logger via the `Logger` trait
//! - Severity levels (Trace, Debug, Info, Warn, Error)
//! - Colored console output by default
//! - File and line information for ERROR entries
//!
//! Engines log under a short source tag (`geovis::Roaming`, `geovis::Viewshed`,
//! `geovis::Material`, ...). Degraded outcomes that are never surfaced to the
//! user (ignored start requests, teardown against a destroyed scene) are
//! reported here at WARN.

use colored::*;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Logger trait for custom logging implementations
///
/// # Example
///
/// ```no_run
/// use geovis_runtime::geovis::log::{Logger, LogEntry};
///
/// struct OverlayLogger;
///
/// impl Logger for OverlayLogger {
///     fn log(&self, entry: &LogEntry) {
///         // forward to an on-screen console...
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Log an entry
    fn log(&self, entry: &LogEntry);
}

/// Log entry containing all information about a log message
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level
    pub severity: LogSeverity,

    /// Timestamp when the log was created
    pub timestamp: SystemTime,

    /// Source tag (e.g., "geovis::Roaming")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (only for detailed ERROR logs)
    pub file: Option<&'static str>,

    /// Source line (only for detailed ERROR logs)
    pub line: Option<u32>,
}

/// Log severity levels, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Per-frame chatter (hook firing, sample appends)
    Trace,
    Debug,
    /// Session lifecycle (start, stop, analysis built)
    Info,
    /// Degraded but tolerated outcomes
    Warn,
    /// Host failures, with file:line details
    Error,
}

impl LogSeverity {
    /// Fixed-width tag used in console output.
    pub fn label(&self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }

    fn colored_label(&self) -> ColoredString {
        let label = self.label();
        match self {
            LogSeverity::Trace => label.bright_black(),
            LogSeverity::Debug => label.cyan(),
            LogSeverity::Info => label.green(),
            LogSeverity::Warn => label.yellow(),
            LogSeverity::Error => label.red().bold(),
        }
    }
}

/// Console logger.
///
/// Lines look like `[timestamp] [SEVERITY] [source] message`, with
/// ` (file:line)` appended when the entry carries a location. Entries below
/// `min_severity` are dropped; the default threshold is `Debug` so
/// per-frame trace output stays quiet.
#[derive(Debug, Clone, Copy)]
pub struct DefaultLogger {
    min_severity: LogSeverity,
}

impl DefaultLogger {
    pub fn new(min_severity: LogSeverity) -> Self {
        Self { min_severity }
    }

    pub fn min_severity(&self) -> LogSeverity {
        self.min_severity
    }

    pub fn accepts(&self, severity: LogSeverity) -> bool {
        severity >= self.min_severity
    }
}

impl Default for DefaultLogger {
    fn default() -> Self {
        Self::new(LogSeverity::Debug)
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        if !self.accepts(entry.severity) {
            return;
        }

        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f");
        let location = match (entry.file, entry.line) {
            (Some(file), Some(line)) => format!(" ({}:{})", file, line),
            _ => String::new(),
        };

        println!(
            "[{}] [{}] [{}] {}{}",
            timestamp,
            entry.severity.colored_label(),
            entry.source.bright_blue(),
            entry.message,
            location
        );
    }
}

// ===== LOGGING MACROS =====

/// Log at an explicit severity. The per-severity macros below expand to
/// this one.
///
/// ```ignore
/// geovis_log!(LogSeverity::Trace, "geovis::Roaming", "frame at t={}", t);
/// ```
#[macro_export]
macro_rules! geovis_log {
    ($severity:expr, $source:expr, $($arg:tt)*) => {
        $crate::geovis::Runtime::log($severity, $source, format!($($arg)*))
    };
}

/// Log a TRACE message
#[macro_export]
macro_rules! geovis_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::geovis_log!($crate::geovis::log::LogSeverity::Trace, $source, $($arg)*)
    };
}

#[macro_export]
macro_rules! geovis_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::geovis_log!($crate::geovis::log::LogSeverity::Debug, $source, $($arg)*)
    };
}

#[macro_export]
macro_rules! geovis_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::geovis_log!($crate::geovis::log::LogSeverity::Info, $source, $($arg)*)
    };
}

/// Log a WARN message (ignored requests, degraded teardown)
#[macro_export]
macro_rules! geovis_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::geovis_log!($crate::geovis::log::LogSeverity::Warn, $source, $($arg)*)
    };
}

/// Log an ERROR message with file:line information
#[macro_export]
macro_rules! geovis_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::geovis::Runtime::log_detailed(
            $crate::geovis::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
