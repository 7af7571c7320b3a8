use serde::{Deserialize, Serialize};

use super::defaults;
use super::logging::LoggingConfig;
use super::stages::StageConfig;
use super::storage::StorageConfig;

/// Root configuration, loadable from `config.json` with every field
/// defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::default_port")]
    pub port: u16,
    /// Comma-separated allowed CORS origins, or `*` for permissive.
    #[serde(default = "defaults::default_cors_origins")]
    pub cors_origins: String,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub stages: StageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: defaults::default_port(),
            cors_origins: defaults::default_cors_origins(),
            storage: StorageConfig::default(),
            stages: StageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.port, 6511);
        assert_eq!(config.storage.data_dir, "data");
        assert_eq!(config.storage.max_avatar_bytes, 8 * 1024 * 1024);
        assert_eq!(config.stages.werewolf_turn_secs, 45);
        assert_eq!(config.logging.dir, "logs");
    }

    #[test]
    fn serialization_round_trip() {
        let config: Config = serde_json::from_str("{}").unwrap();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.port, deserialized.port);
        assert_eq!(config.stages.vote_secs, deserialized.stages.vote_secs);
        assert_eq!(config.storage.data_dir, deserialized.storage.data_dir);
    }
}
