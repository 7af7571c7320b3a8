//! Server orchestration.
//!
//! Owns the room registry: every room is an explicitly-owned
//! [`RoomCoordinator`] reachable through this struct; there is no hidden
//! process-wide state beyond the immutable template catalog.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::dispatch::MessageDispatcher;
use crate::error::GameError;
use crate::game::coordinator::{LobbySummary, RoomCoordinator};
use crate::game::state::{Player, PlayerId, RoomConfig, RoomId, Stage};
use crate::profiles::{ProfileStore, ProfileStoreError};
use crate::registry::ConnectionRegistry;

pub struct GameServer {
    config: Arc<Config>,
    registry: Arc<ConnectionRegistry>,
    profiles: Arc<dyn ProfileStore>,
    dispatcher: MessageDispatcher,
    rooms: DashMap<RoomId, Arc<RoomCoordinator>>,
}

impl GameServer {
    pub fn new(config: Arc<Config>, profiles: Arc<dyn ProfileStore>) -> Arc<Self> {
        let registry = ConnectionRegistry::new();
        Arc::new(Self {
            config,
            dispatcher: MessageDispatcher::new(registry.clone()),
            registry,
            profiles,
            rooms: DashMap::new(),
        })
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn profiles(&self) -> &Arc<dyn ProfileStore> {
        &self.profiles
    }

    pub fn dispatcher(&self) -> &MessageDispatcher {
        &self.dispatcher
    }

    pub fn room(&self, room_id: RoomId) -> Option<Arc<RoomCoordinator>> {
        self.rooms.get(&room_id).map(|r| Arc::clone(r.value()))
    }

    /// Creates a room with the host already seated at seat 0.
    pub async fn create_room(
        &self,
        host_profile_id: Uuid,
        room_config: RoomConfig,
    ) -> Result<(RoomId, Player), GameError> {
        let profile = self
            .profiles
            .get(host_profile_id)
            .await
            .map_err(profile_error)?;
        if crate::catalog::template_by_name(&room_config.template_name).is_none() {
            return Err(GameError::TemplateNotFound(room_config.template_name));
        }

        let room_id = Uuid::new_v4();
        let mut host = Player::new(profile.id, profile.name.clone(), profile.avatar_url, true);
        host.seat = Some(0);
        let host_snapshot = host.clone();

        let coordinator = RoomCoordinator::new(
            room_id,
            host,
            room_config,
            Arc::clone(&self.config),
            Arc::clone(&self.registry),
            Arc::clone(&self.profiles),
        );
        self.rooms.insert(room_id, coordinator);
        info!(%room_id, host_profile = %host_profile_id, "Room created");
        Ok((room_id, host_snapshot))
    }

    pub async fn join_room(
        &self,
        room_id: RoomId,
        profile_id: Uuid,
    ) -> Result<(RoomId, Player), GameError> {
        let coordinator = self.room(room_id).ok_or(GameError::RoomNotFound)?;
        let profile = self.profiles.get(profile_id).await.map_err(profile_error)?;
        let player = coordinator.join(&profile).await?;
        Ok((room_id, player))
    }

    /// Public lobby listing: waiting, non-private rooms.
    pub async fn list_rooms(&self) -> Vec<LobbySummary> {
        let coordinators: Vec<_> = self
            .rooms
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        let mut summaries = Vec::with_capacity(coordinators.len());
        for coordinator in coordinators {
            let summary = coordinator.lobby_summary().await;
            if summary.stage == Stage::Waiting && !summary.is_private {
                summaries.push(summary);
            }
        }
        summaries
    }

    /// Whether `player_id` belongs to the room (used to gate the channel).
    pub async fn is_member(&self, room_id: RoomId, player_id: PlayerId) -> bool {
        match self.room(room_id) {
            Some(coordinator) => {
                coordinator
                    .with_state(|st| st.player(player_id).is_some())
                    .await
            }
            None => false,
        }
    }

    pub fn remove_room(&self, room_id: RoomId) {
        self.rooms.remove(&room_id);
        self.registry.remove_room(room_id);
        info!(%room_id, "Room removed");
    }

    /// Periodic reaper for finished rooms. Rooms live only in memory; once a
    /// game is over and the loop has seen it twice, the room is torn down.
    pub async fn cleanup_task(self: Arc<Self>, interval: Duration) {
        let mut pending: Vec<RoomId> = Vec::new();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            for room_id in pending.drain(..) {
                if let Some(coordinator) = self.room(room_id) {
                    if coordinator.stage().await == Stage::GameOver {
                        self.remove_room(room_id);
                    }
                }
            }
            let coordinators: Vec<_> = self
                .rooms
                .iter()
                .map(|entry| (*entry.key(), Arc::clone(entry.value())))
                .collect();
            for (room_id, coordinator) in coordinators {
                if coordinator.stage().await == Stage::GameOver {
                    pending.push(room_id);
                }
            }
        }
    }
}

fn profile_error(err: ProfileStoreError) -> GameError {
    match err {
        ProfileStoreError::NotFound => GameError::ProfileNotFound,
        other => {
            tracing::error!(error = %other, "Profile store failure");
            GameError::ProfileNotFound
        }
    }
}
