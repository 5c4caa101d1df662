//! Log levels, run logger settings and line prefixes.

use serde::{Deserialize, Serialize};

/// Severity of a run log line. Ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive string for `EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// How a `RunLogger` writes.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Lines below this level are dropped.
    pub level: LogLevel,
    /// Only log progress on `progress_step` boundaries and keep engine
    /// output in the tail instead of the log.
    pub compact: bool,
    pub progress_step: u32,
    /// Lines kept for `show_tail` after a failure.
    pub error_tail: usize,
    pub show_timestamps: bool,
    /// Dump engine arguments one per line.
    pub show_commands_pretty: bool,
    /// Dump engine arguments as a JSON array.
    pub show_commands_json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            compact: true,
            progress_step: 20,
            error_tail: 20,
            show_timestamps: true,
            show_commands_pretty: false,
            show_commands_json: false,
        }
    }
}

impl LogConfig {
    /// Everything on: debug level, no progress filtering, pretty args.
    pub fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
            compact: false,
            progress_step: 10,
            error_tail: 50,
            show_commands_pretty: true,
            ..Self::default()
        }
    }
}

/// Receives every formatted run log line (terminal echo, UI log view).
pub type LogLineCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Marker put in front of a run log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagePrefix {
    /// `$ ffmpeg ...`
    Command,
    /// `=== File 1/3: a.mp3 ===`
    Phase,
    /// `--- Cleanup ---`
    Section,
    Success,
    Warning,
    Error,
    None,
}

impl MessagePrefix {
    pub fn format(&self, message: &str) -> String {
        match self {
            MessagePrefix::Command => format!("$ {}", message),
            MessagePrefix::Phase => format!("=== {} ===", message),
            MessagePrefix::Section => format!("--- {} ---", message),
            MessagePrefix::Success => format!("[SUCCESS] {}", message),
            MessagePrefix::Warning => format!("[WARNING] {}", message),
            MessagePrefix::Error => format!("[ERROR] {}", message),
            MessagePrefix::None => message.to_string(),
        }
    }
}
