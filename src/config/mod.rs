//! Configuration module.
//!
//! JSON configuration file with sensible defaults for every field:
//!
//! - [`types`]: root `Config` struct
//! - [`stages`]: per-stage countdown durations
//! - [`storage`]: data directory and avatar size cap
//! - [`logging`]: logging configuration
//! - [`loader`]: loading and validation
//! - [`defaults`]: default value functions

pub mod defaults;
pub mod loader;
pub mod logging;
pub mod stages;
pub mod storage;
pub mod types;

pub use loader::{load, validate};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use stages::StageConfig;
pub use storage::StorageConfig;
pub use types::Config;
