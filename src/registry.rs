//! Connection registry.
//!
//! Tracks the open client channels keyed by `(room, player)`. Broadcasts
//! iterate a snapshot of the room's channels; a failed send is logged and
//! never aborts the iteration.

use std::sync::Arc;

use dashmap::DashMap;
use smallvec::SmallVec;
use tokio::sync::mpsc;
use tracing::debug;

use crate::game::state::{PlayerId, RoomId};
use crate::protocol::ServerEvent;

/// Typical room size for stack-allocated broadcast snapshots.
const TYPICAL_ROOM_SIZE: usize = 12;

type Channel = mpsc::Sender<Arc<ServerEvent>>;

#[derive(Default)]
pub struct ConnectionRegistry {
    rooms: DashMap<RoomId, DashMap<PlayerId, Channel>>,
}

impl ConnectionRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers an open channel for `(room, player)`, replacing any
    /// previous one (a reconnect supersedes the stale channel).
    pub fn connect(&self, room_id: RoomId, player_id: PlayerId, sender: Channel) {
        self.rooms
            .entry(room_id)
            .or_default()
            .insert(player_id, sender);
    }

    pub fn disconnect(&self, room_id: RoomId, player_id: PlayerId) {
        if let Some(room) = self.rooms.get(&room_id) {
            room.remove(&player_id);
        }
        self.rooms
            .remove_if(&room_id, |_, channels| channels.is_empty());
    }

    /// Drops every channel of a room (room teardown).
    pub fn remove_room(&self, room_id: RoomId) {
        self.rooms.remove(&room_id);
    }

    pub fn is_connected(&self, room_id: RoomId, player_id: PlayerId) -> bool {
        self.rooms
            .get(&room_id)
            .is_some_and(|room| room.contains_key(&player_id))
    }

    /// Sends to a single recipient. Returns `false` when the player has no
    /// open channel or the channel is gone; delivery for that player is
    /// simply suspended until reconnect.
    pub async fn send_to(
        &self,
        room_id: RoomId,
        player_id: PlayerId,
        event: Arc<ServerEvent>,
    ) -> bool {
        let sender = self
            .rooms
            .get(&room_id)
            .and_then(|room| room.get(&player_id).map(|c| c.value().clone()));
        match sender {
            Some(sender) => match sender.send(event).await {
                Ok(()) => true,
                Err(err) => {
                    debug!(%room_id, %player_id, error = %err, "Dropping frame for closed channel");
                    false
                }
            },
            None => {
                debug!(%room_id, %player_id, "No open channel; frame suspended");
                false
            }
        }
    }

    /// Broadcasts to every open channel in the room. Iterates a snapshot so
    /// connects/disconnects during the sends cannot deadlock or skip.
    pub async fn broadcast(&self, room_id: RoomId, event: Arc<ServerEvent>) {
        let snapshot: SmallVec<[(PlayerId, Channel); TYPICAL_ROOM_SIZE]> = match self
            .rooms
            .get(&room_id)
        {
            Some(room) => room
                .iter()
                .map(|entry| (*entry.key(), entry.value().clone()))
                .collect(),
            None => return,
        };

        for (player_id, sender) in snapshot {
            if let Err(err) = sender.send(event.clone()).await {
                debug!(%room_id, %player_id, error = %err, "Broadcast skipped closed channel");
            }
        }
    }
}
