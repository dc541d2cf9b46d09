//! Engine logging.
//!
//! All engine output funnels through a single `Logger` installed on the
//! `Engine` singleton. The default sink prints colored lines to the console
//! (`colored` for the palette, `chrono` for timestamps); applications swap in
//! their own sink by implementing `Logger`. Error-severity entries carry the
//! emitting `file!()`/`line!()` so fatal reports point at their call site.

use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};
use std::time::SystemTime;

/// Sink for engine log entries.
///
/// Implementations must be callable from any thread; the engine hands the
/// same logger to render, streaming and resource threads.
pub trait Logger: Send + Sync {
    fn log(&self, entry: &LogEntry);
}

/// One log record, as handed to the installed `Logger`.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub severity: LogSeverity,
    pub timestamp: SystemTime,
    /// Emitting subsystem, e.g. "nova3d::render::LightPass"
    pub source: String,
    pub message: String,
    /// Emitting file, present on Error entries only
    pub file: Option<&'static str>,
    /// Emitting line, present on Error entries only
    pub line: Option<u32>,
}

/// Severity of a log entry, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogSeverity {
    /// Fixed-width console tag for this severity.
    fn tag(self) -> ColoredString {
        match self {
            LogSeverity::Trace => "TRACE".bright_black(),
            LogSeverity::Debug => "DEBUG".cyan(),
            LogSeverity::Info => "INFO ".green(),
            LogSeverity::Warn => "WARN ".yellow(),
            LogSeverity::Error => "ERROR".red().bold(),
        }
    }
}

/// Console logger used until the application installs its own.
///
/// Line format is `[timestamp] [SEVERITY] [source] message`, with a trailing
/// `(file:line)` on Error entries.
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let local: DateTime<Local> = entry.timestamp.into();

        let location = match (entry.file, entry.line) {
            (Some(file), Some(line)) => format!(" ({}:{})", file, line),
            _ => String::new(),
        };

        println!(
            "[{}] [{}] [{}] {}{}",
            local.format("%Y-%m-%d %H:%M:%S%.3f"),
            entry.severity.tag(),
            entry.source.bright_blue(),
            entry.message,
            location
        );
    }
}

// ===== LOGGING MACROS =====
//
// The macros route through the Engine singleton so the installed logger is
// picked up without threading a logger handle through every subsystem.
// Only engine_error! records the call site.

/// Log at Trace severity (high-volume diagnostics).
#[macro_export]
macro_rules! engine_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::nova3d::Engine::log(
            $crate::nova3d::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log at Debug severity.
#[macro_export]
macro_rules! engine_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::nova3d::Engine::log(
            $crate::nova3d::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log at Info severity.
///
/// ```ignore
/// engine_info!("nova3d::FrameRenderer", "{} command lists executed", count);
/// ```
#[macro_export]
macro_rules! engine_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::nova3d::Engine::log(
            $crate::nova3d::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log at Warn severity (degraded but recoverable conditions).
#[macro_export]
macro_rules! engine_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::nova3d::Engine::log(
            $crate::nova3d::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log at Error severity, recording the emitting file and line.
#[macro_export]
macro_rules! engine_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::nova3d::Engine::log_detailed(
            $crate::nova3d::log::LogSeverity::Error,
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
