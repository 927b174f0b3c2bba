//! Engine log records and the macros that emit them
//!
//! Every message goes through `Engine::log` / `Engine::log_detailed` to the
//! installed `Logger`. The `engine_*!` macros take a source tag such as
//! `"vesta::swapchain"` followed by `format!` arguments. Error-level macros
//! also capture the call site.

use chrono::{DateTime, Local};
use colored::*;
use std::fmt;
use std::time::SystemTime;

/// Destination for engine log records
///
/// Install one with `Engine::set_logger`. Tests use this to capture records;
/// applications can forward them to a file or their own logging stack.
///
/// ```no_run
/// use vesta_engine::vesta::log::{Logger, LogEntry};
///
/// struct Stderr;
///
/// impl Logger for Stderr {
///     fn log(&self, entry: &LogEntry) {
///         eprintln!("{}", entry);
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    fn log(&self, entry: &LogEntry);
}

/// Severity of a log record, ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    Trace,
    Debug,
    Info,
    Warn,
    /// Carries the emitting file and line
    Error,
}

impl LogSeverity {
    /// Fixed-width tag used in printed records
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

/// One log record
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub severity: LogSeverity,
    pub timestamp: SystemTime,
    /// Subsystem tag, e.g. "vesta::frame"
    pub source: String,
    pub message: String,
    /// Emitting file, set for error-level records
    pub file: Option<&'static str>,
    pub line: Option<u32>,
}

impl LogEntry {
    /// Record stamped with the current time and no call site
    pub fn new(severity: LogSeverity, source: &str, message: String) -> Self {
        Self {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: None,
            line: None,
        }
    }

    /// Attach the emitting call site
    pub fn at(mut self, file: &'static str, line: u32) -> Self {
        self.file = Some(file);
        self.line = Some(line);
        self
    }

    pub fn location(&self) -> Option<(&'static str, u32)> {
        self.file.zip(self.line)
    }
}

/// `[SEVERITY] [source] message`, plus ` (file:line)` when the call site is known
impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] [{}] {}", self.severity.label(), self.source, self.message)?;
        if let Some((file, line)) = self.location() {
            write!(f, " ({}:{})", file, line)?;
        }
        Ok(())
    }
}

/// Colored stdout logger installed until `Engine::set_logger` replaces it
///
/// Prefixes each record with a local millisecond timestamp.
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let local: DateTime<Local> = entry.timestamp.into();
        let mut line = format!(
            "[{}] [{}] [{}] {}",
            local.format("%Y-%m-%d %H:%M:%S%.3f"),
            entry.severity.colored_label(),
            entry.source.bright_blue(),
            entry.message
        );
        if let Some((file, line_no)) = entry.location() {
            line.push_str(&format!(" ({}:{})", file, line_no));
        }
        println!("{}", line);
    }
}

// ===== MACROS =====

#[doc(hidden)]
#[macro_export]
macro_rules! __engine_log {
    ($severity:ident, $source:expr, $($arg:tt)*) => {
        $crate::vesta::Engine::log(
            $crate::vesta::log::LogSeverity::$severity,
            $source,
            format!($($arg)*)
        )
    };
}

#[macro_export]
macro_rules! engine_trace {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Trace, $source, $($arg)*) };
}

/// ```no_run
/// # use vesta_engine::engine_debug;
/// # let count = 3;
/// engine_debug!("vesta::swapchain", "Created {} framebuffers", count);
/// ```
#[macro_export]
macro_rules! engine_debug {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Debug, $source, $($arg)*) };
}

#[macro_export]
macro_rules! engine_info {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Info, $source, $($arg)*) };
}

#[macro_export]
macro_rules! engine_warn {
    ($source:expr, $($arg:tt)*) => { $crate::__engine_log!(Warn, $source, $($arg)*) };
}

/// Error-level record tagged with the call site
#[macro_export]
macro_rules! engine_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::vesta::Engine::log_detailed(
            $crate::vesta::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

/// Like `engine_error!`, and evaluates to `Error::BackendError` with the same text
///
/// ```no_run
/// # use vesta_engine::engine_err;
/// # fn fence_wait() -> Result<(), &'static str> { Err("VK_ERROR_DEVICE_LOST") }
/// # fn run() -> vesta_engine::vesta::Result<()> {
/// fence_wait().map_err(|e| engine_err!("vesta::vulkan", "Fence wait failed: {}", e))?;
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::vesta::Engine::log_detailed(
            $crate::vesta::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::vesta::Error::BackendError(message)
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
