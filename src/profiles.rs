//! Persistent player profiles.
//!
//! One JSON object per profile under `<data_dir>/players`, avatars as files
//! named by profile id + extension under `<data_dir>/avatars`. Rooms are
//! never persisted. The store is only ever touched outside a room lock;
//! win/loss counters are updated at game over.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::game::state::ProfileId;

/// Aggregate per-profile statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileStats {
    pub games_played: u64,
    pub games_won: u64,
}

/// A persistent player identity, independent of any room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub stats: ProfileStats,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum ProfileStoreError {
    #[error("profile not found")]
    NotFound,
    #[error("avatar rejected: {0}")]
    InvalidAvatar(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("profile file corrupted: {0}")]
    Corrupted(#[from] serde_json::Error),
}

/// Storage abstraction for profiles, so tests can swap the backing store.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn create(&self, name: String) -> Result<Profile, ProfileStoreError>;
    async fn get(&self, id: ProfileId) -> Result<Profile, ProfileStoreError>;
    async fn update(&self, profile: &Profile) -> Result<(), ProfileStoreError>;

    /// Stores the avatar bytes and returns the updated profile with its new
    /// avatar URL.
    async fn store_avatar(
        &self,
        id: ProfileId,
        extension: &str,
        bytes: &[u8],
    ) -> Result<Profile, ProfileStoreError>;

    /// Bumps the win/loss counters after a finished game.
    async fn record_result(&self, id: ProfileId, won: bool) -> Result<(), ProfileStoreError>;
}

/// File-backed implementation used in production.
pub struct FileProfileStore {
    players_dir: PathBuf,
    avatars_dir: PathBuf,
}

impl FileProfileStore {
    /// Creates the store and its directories.
    pub async fn new(storage: &StorageConfig) -> Result<Arc<Self>, ProfileStoreError> {
        let store = Self {
            players_dir: storage.players_dir(),
            avatars_dir: storage.avatars_dir(),
        };
        tokio::fs::create_dir_all(&store.players_dir).await?;
        tokio::fs::create_dir_all(&store.avatars_dir).await?;
        Ok(Arc::new(store))
    }

    fn profile_path(&self, id: ProfileId) -> PathBuf {
        self.players_dir.join(format!("{id}.json"))
    }

    async fn read_profile(&self, path: &Path) -> Result<Profile, ProfileStoreError> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProfileStoreError::NotFound)
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&contents)?)
    }

    async fn write_profile(&self, profile: &Profile) -> Result<(), ProfileStoreError> {
        let json = serde_json::to_string_pretty(profile)?;
        tokio::fs::write(self.profile_path(profile.id), json).await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for FileProfileStore {
    async fn create(&self, name: String) -> Result<Profile, ProfileStoreError> {
        let profile = Profile {
            id: Uuid::new_v4(),
            name,
            avatar_url: None,
            stats: ProfileStats::default(),
            created_at: Utc::now(),
        };
        self.write_profile(&profile).await?;
        tracing::info!(profile_id = %profile.id, "Profile created");
        Ok(profile)
    }

    async fn get(&self, id: ProfileId) -> Result<Profile, ProfileStoreError> {
        self.read_profile(&self.profile_path(id)).await
    }

    async fn update(&self, profile: &Profile) -> Result<(), ProfileStoreError> {
        // refuse to resurrect a deleted profile
        self.get(profile.id).await?;
        self.write_profile(profile).await
    }

    async fn store_avatar(
        &self,
        id: ProfileId,
        extension: &str,
        bytes: &[u8],
    ) -> Result<Profile, ProfileStoreError> {
        if !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ProfileStoreError::InvalidAvatar(format!(
                "bad file extension `{extension}`"
            )));
        }
        let mut profile = self.get(id).await?;
        let filename = format!("{id}.{extension}");
        tokio::fs::write(self.avatars_dir.join(&filename), bytes).await?;
        profile.avatar_url = Some(format!("/avatars/{filename}"));
        self.write_profile(&profile).await?;
        tracing::info!(profile_id = %id, size = bytes.len(), "Avatar stored");
        Ok(profile)
    }

    async fn record_result(&self, id: ProfileId, won: bool) -> Result<(), ProfileStoreError> {
        let mut profile = self.get(id).await?;
        profile.stats.games_played += 1;
        if won {
            profile.stats.games_won += 1;
        }
        self.write_profile(&profile).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> (tempfile::TempDir, Arc<FileProfileStore>) {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageConfig {
            data_dir: dir.path().to_string_lossy().into_owned(),
            max_avatar_bytes: 1024,
        };
        let store = FileProfileStore::new(&storage).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn create_and_read_back() {
        let (_dir, store) = store().await;
        let created = store.create("小明".to_string()).await.unwrap();
        let loaded = store.get(created.id).await.unwrap();
        assert_eq!(created, loaded);
        assert_eq!(loaded.stats, ProfileStats::default());
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let (_dir, store) = store().await;
        let err = store.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ProfileStoreError::NotFound));
    }

    #[tokio::test]
    async fn avatar_updates_profile_url() {
        let (dir, store) = store().await;
        let profile = store.create("avatar".to_string()).await.unwrap();
        let updated = store
            .store_avatar(profile.id, "png", b"\x89PNG fake")
            .await
            .unwrap();
        assert_eq!(
            updated.avatar_url.as_deref(),
            Some(format!("/avatars/{}.png", profile.id).as_str())
        );
        let on_disk = dir
            .path()
            .join("avatars")
            .join(format!("{}.png", profile.id));
        assert!(on_disk.exists());
    }

    #[tokio::test]
    async fn avatar_extension_is_sanitized() {
        let (_dir, store) = store().await;
        let profile = store.create("avatar".to_string()).await.unwrap();
        let err = store
            .store_avatar(profile.id, "../evil", b"data")
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileStoreError::InvalidAvatar(_)));
    }

    #[tokio::test]
    async fn results_accumulate() {
        let (_dir, store) = store().await;
        let profile = store.create("winner".to_string()).await.unwrap();
        store.record_result(profile.id, true).await.unwrap();
        store.record_result(profile.id, false).await.unwrap();
        let loaded = store.get(profile.id).await.unwrap();
        assert_eq!(loaded.stats.games_played, 2);
        assert_eq!(loaded.stats.games_won, 1);
    }
}
