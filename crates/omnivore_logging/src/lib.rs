#![deny(missing_docs)]
//! Shared logging utilities for the converter workspace.
//!
//! This crate provides the process-log model handed to callers, the
//! `sink_*` logging macros used across the codebase and a minimal test
//! initializer for the global logger.

use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

/// Severity of a process-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Routine progress, e.g. a successful download.
    Info,
    /// A recoverable problem; the run continues.
    Warning,
    /// A failure that lost data for one article or image.
    Error,
}

impl Severity {
    /// The matching level of the `log` facade.
    pub fn level(self) -> log::Level {
        match self {
            Severity::Info => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error => log::Level::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One append-only observability record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Wall-clock time the entry was created.
    pub timestamp: DateTime<Utc>,
    /// How serious the entry is.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
}

impl LogEntry {
    /// Creates an entry stamped with the current time.
    pub fn now(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            message: message.into(),
        }
    }
}

/// Receiver of process-log entries.
///
/// Implementations must not panic; the converter never depends on anyone
/// consuming the entries.
pub trait LogSink: Send + Sync {
    /// Records one entry.
    fn record(&self, entry: LogEntry);
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogSink;

impl LogSink for NullLogSink {
    fn record(&self, _entry: LogEntry) {}
}

/// Sink that keeps every entry in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far.
    pub fn entries(&self) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Returns the messages recorded with the given severity.
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.severity == severity)
            .map(|entry| entry.message)
            .collect()
    }
}

impl LogSink for MemoryLogSink {
    fn record(&self, entry: LogEntry) {
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}

/// Forwards a message to the `log` facade and records it in `sink`.
pub fn emit(sink: &dyn LogSink, severity: Severity, message: String) {
    log::log!(severity.level(), "{}", message);
    sink.record(LogEntry::now(severity, message));
}

/// Logs an info-level message and records it in the given sink.
#[macro_export]
macro_rules! sink_info {
    ($sink:expr, $($arg:tt)*) => {{
        $crate::emit($sink, $crate::Severity::Info, format!($($arg)*));
    }};
}

/// Logs a warn-level message and records it in the given sink.
#[macro_export]
macro_rules! sink_warn {
    ($sink:expr, $($arg:tt)*) => {{
        $crate::emit($sink, $crate::Severity::Warning, format!($($arg)*));
    }};
}

/// Logs an error-level message and records it in the given sink.
#[macro_export]
macro_rules! sink_error {
    ($sink:expr, $($arg:tt)*) => {{
        $crate::emit($sink, $crate::Severity::Error, format!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
