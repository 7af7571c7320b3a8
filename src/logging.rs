//! Structured logging setup.
//!
//! Console output always; a rolling file appender when
//! `logging.enable_file_logging` is set. The level comes from the config
//! when present, otherwise from `RUST_LOG`, with "info" as the fallback.

use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

pub fn init_with_config(cfg: &LoggingConfig) {
    let filter = match &cfg.level {
        Some(level) => EnvFilter::new(level.as_str()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let json = cfg.format == LogFormat::Json;
    let file_writer = if cfg.enable_file_logging {
        file_writer(cfg)
    } else {
        None
    };

    // Each sink/format combination becomes an optional layer; absent ones
    // are no-ops in the subscriber stack.
    let (console_text, console_json) = if json {
        (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_timer(UtcTime::rfc_3339())
                    .with_writer(std::io::stdout),
            ),
        )
    } else {
        (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_timer(UtcTime::rfc_3339())
                    .with_writer(std::io::stdout),
            ),
            None,
        )
    };

    let (file_text, file_json) = match file_writer {
        Some(writer) if json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_timer(UtcTime::rfc_3339())
                    .with_writer(writer),
            ),
        ),
        Some(writer) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_timer(UtcTime::rfc_3339())
                    .with_writer(writer),
            ),
            None,
        ),
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_text)
        .with(console_json)
        .with(file_text)
        .with(file_json)
        .try_init();
}

/// Builds the non-blocking rolling-file writer, or `None` when the log
/// directory cannot be created (the server then logs to stdout only).
fn file_writer(cfg: &LoggingConfig) -> Option<NonBlocking> {
    let rotation = match cfg.rotation.to_lowercase().as_str() {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    };

    if let Err(err) = std::fs::create_dir_all(&cfg.dir) {
        eprintln!(
            "Failed to create log directory `{}`: {err}; continuing with stdout logs",
            cfg.dir
        );
        return None;
    }

    let appender = RollingFileAppender::new(rotation, &cfg.dir, &cfg.filename);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    // the guard flushes buffered lines on drop; it must live as long as the
    // process does
    std::mem::forget(guard);
    Some(writer)
}
