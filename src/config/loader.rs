//! Configuration loading.
//!
//! Precedence: explicit path from `WEREWOLF_CONFIG`, then `./config.json`,
//! then code defaults. A malformed file is an error the operator should see,
//! not something to silently paper over.

use std::path::{Path, PathBuf};

use super::types::Config;

const DEFAULT_CONFIG_PATH: &str = "config.json";
const CONFIG_PATH_ENV: &str = "WEREWOLF_CONFIG";

/// Loads the configuration. A missing file yields defaults; a present but
/// unreadable or malformed file logs an error to stderr and falls back to
/// defaults so the server still comes up.
pub fn load() -> Config {
    let path = config_path();
    match load_from_path(&path) {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(err) => {
            eprintln!("Failed to load config from {}: {err}", path.display());
            Config::default()
        }
    }
}

fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn load_from_path(path: &Path) -> anyhow::Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)?;
    let config = serde_json::from_str(&contents)?;
    Ok(Some(config))
}

/// Validates operator-supplied values that serde cannot check.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if config.port == 0 {
        anyhow::bail!("port must be non-zero");
    }
    if config.storage.max_avatar_bytes == 0 {
        anyhow::bail!("storage.max_avatar_bytes must be non-zero");
    }
    if config.storage.data_dir.trim().is_empty() {
        anyhow::bail!("storage.data_dir must not be empty");
    }
    match config.logging.rotation.to_lowercase().as_str() {
        "daily" | "hourly" | "never" => {}
        other => anyhow::bail!("logging.rotation must be daily, hourly or never (got `{other}`)"),
    }
    Ok(())
}
