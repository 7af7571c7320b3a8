use std::fmt;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Text,
}

/// Log verbosity. When absent, `RUST_LOG` is consulted, falling back to
/// `info`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logging configuration: console always, rolling file optionally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Explicit level; overrides `RUST_LOG` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,
    #[serde(default = "defaults::default_log_format")]
    pub format: LogFormat,
    #[serde(default = "defaults::default_enable_file_logging")]
    pub enable_file_logging: bool,
    #[serde(default = "defaults::default_log_dir")]
    pub dir: String,
    #[serde(default = "defaults::default_log_filename")]
    pub filename: String,
    /// "daily", "hourly" or "never".
    #[serde(default = "defaults::default_rotation")]
    pub rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
            format: defaults::default_log_format(),
            enable_file_logging: defaults::default_enable_file_logging(),
            dir: defaults::default_log_dir(),
            filename: defaults::default_log_filename(),
            rotation: defaults::default_rotation(),
        }
    }
}
