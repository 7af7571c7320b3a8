use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Persistent-data configuration: profiles and avatars live on disk, rooms
/// only in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root data directory; profiles go under `<dir>/players`, avatars
    /// under `<dir>/avatars`.
    #[serde(default = "defaults::default_data_dir")]
    pub data_dir: String,
    #[serde(default = "defaults::default_max_avatar_bytes")]
    pub max_avatar_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::default_data_dir(),
            max_avatar_bytes: defaults::default_max_avatar_bytes(),
        }
    }
}

impl StorageConfig {
    pub fn players_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("players")
    }

    pub fn avatars_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("avatars")
    }
}
