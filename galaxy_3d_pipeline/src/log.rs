//! Diagnostics for the pipeline core
//!
//! Components report through `engine_*!` macros tagged with a
//! `"galaxy3d::<Component>"` source. Entries reach whatever `Logger` is
//! installed on `Engine`; the default prints colored lines to stdout.
//! Only errors record the file and line that emitted them.

use colored::*;
use std::fmt::Display;
use std::time::SystemTime;
use chrono::{DateTime, Local};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Sink for engine diagnostics
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_pipeline::galaxy3d::log::{Logger, LogEntry};
///
/// struct OverlayLogger;
///
/// impl Logger for OverlayLogger {
///     fn log(&self, entry: &LogEntry) {
///         let _ = entry.message.len();
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    fn log(&self, entry: &LogEntry);
}

/// One diagnostic message
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub severity: LogSeverity,
    pub timestamp: SystemTime,
    /// Emitting component, e.g. "galaxy3d::ResourcePool"
    pub source: String,
    pub message: String,
    /// Emitting file, set for errors only
    pub file: Option<&'static str>,
    /// Emitting line, set for errors only
    pub line: Option<u32>,
}

impl LogEntry {
    /// Entry stamped with the current time and no location
    pub fn now(severity: LogSeverity, source: &str, message: String) -> Self {
        Self {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: None,
            line: None,
        }
    }

    pub fn with_location(mut self, file: &'static str, line: u32) -> Self {
        self.file = Some(file);
        self.line = Some(line);
        self
    }

    /// `(file, line)` when both are known
    pub fn location(&self) -> Option<(&'static str, u32)> {
        self.file.zip(self.line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    Trace,
    Debug,
    Info,
    Warn,
    /// Carries file:line
    Error,
}

impl LogSeverity {
    /// Fixed-width tag used in console lines
    pub fn label(self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }

    fn colored_label(self) -> ColoredString {
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

/// Console logger
///
/// Lines read `[timestamp] [SEVERITY] [source] message`, with
/// ` (file:line)` appended when the entry has a location.
pub struct DefaultLogger;

impl DefaultLogger {
    /// The console line without colors
    pub fn format_plain(entry: &LogEntry) -> String {
        compose(entry, entry.severity.label(), &entry.source)
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        println!("{}", compose(entry, entry.severity.colored_label(), entry.source.bright_blue()));
    }
}

fn compose(entry: &LogEntry, severity: impl Display, source: impl Display) -> String {
    let timestamp: DateTime<Local> = entry.timestamp.into();
    let mut line = format!("[{}] [{}] [{}] {}", timestamp.format(TIMESTAMP_FORMAT), severity, source, entry.message);
    if let Some((file, number)) = entry.location() {
        line.push_str(&format!(" ({}:{})", file, number));
    }
    line
}

// ===== LOGGING MACROS =====

#[doc(hidden)]
#[macro_export]
macro_rules! __engine_log {
    ($severity:ident, $source:expr, $($arg:tt)*) => {
        $crate::galaxy3d::Engine::log(
            $crate::galaxy3d::log::LogSeverity::$severity,
            $source,
            format!($($arg)*)
        )
    };
}

#[macro_export]
macro_rules! engine_trace {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Trace, $source, $($arg)*) };
}

#[macro_export]
macro_rules! engine_debug {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Debug, $source, $($arg)*) };
}

/// # Example
///
/// ```no_run
/// # use galaxy_3d_pipeline::engine_info;
/// engine_info!("galaxy3d::Renderer", "Reloaded {} shaders", 3);
/// ```
#[macro_export]
macro_rules! engine_info {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Info, $source, $($arg)*) };
}

#[macro_export]
macro_rules! engine_warn {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Warn, $source, $($arg)*) };
}

/// Error with the caller's file:line
#[macro_export]
macro_rules! engine_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::galaxy3d::Engine::log_detailed(
            $crate::galaxy3d::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

/// Log an error and evaluate to `Error::BackendError` with the same text
///
/// ```no_run
/// # use galaxy_3d_pipeline::engine_err;
/// let err = engine_err!("galaxy3d::MockGraphicsDevice", "Texture creation failed: {}x{}", 0, 0);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::galaxy3d::Error::BackendError(message)
    }};
}

/// `return Err(engine_err!(..))`
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
