//! Redacted projections of the authoritative state.
//!
//! Hidden information is enforced here, not by client honor: everything that
//! goes out as a broadcast passes through [`public_view`] or
//! [`PublicPlayer::from`], which strip roles, night actions, wolf votes,
//! potion state and seer results. Role panels are built here too and must
//! only ever be sent to their single recipient.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::frames::ServerEvent;
use crate::game::state::{GameState, Player, PlayerId, RoomId, Stage, Winner};

/// A player as every client is allowed to see them. No role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicPlayer {
    pub id: PlayerId,
    pub name: String,
    pub avatar_url: Option<String>,
    pub seat: Option<usize>,
    pub is_alive: bool,
    pub is_host: bool,
    pub is_ready: bool,
    pub is_sheriff: bool,
    pub connected: bool,
}

impl From<&Player> for PublicPlayer {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            avatar_url: p.avatar_url.clone(),
            seat: p.seat,
            is_alive: p.is_alive,
            is_host: p.is_host,
            is_ready: p.is_ready,
            is_sheriff: p.is_sheriff,
            connected: p.connected,
        }
    }
}

/// A wolf teammate entry inside the werewolf panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeammateInfo {
    pub id: PlayerId,
    pub name: String,
    pub seat: Option<usize>,
}

/// The subset of [`GameState`] safe to broadcast.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicGameState {
    pub room_id: RoomId,
    pub host_id: PlayerId,
    pub stage: Stage,
    pub day: u32,
    pub timer: u64,
    pub players: Vec<PublicPlayer>,
    pub speech_order: Vec<PlayerId>,
    pub current_speaker_id: Option<PlayerId>,
    pub sheriff_candidates: Vec<PlayerId>,
    pub nightly_deaths: Vec<PlayerId>,
    /// Exile votes are cast in the open.
    pub day_votes: HashMap<PlayerId, PlayerId>,
    pub sheriff_votes: HashMap<PlayerId, PlayerId>,
    pub winner: Option<Winner>,
}

/// Projects the authoritative state to its broadcast-safe subset.
pub fn public_view(state: &GameState) -> PublicGameState {
    PublicGameState {
        room_id: state.room_id,
        host_id: state.host_id,
        stage: state.stage,
        day: state.day,
        timer: state.timer,
        players: state.players.iter().map(PublicPlayer::from).collect(),
        speech_order: state.speech_order.clone(),
        current_speaker_id: state.current_speaker_id,
        sheriff_candidates: state.sheriff_candidates.clone(),
        nightly_deaths: state.nightly_deaths.clone(),
        day_votes: state.day_votes.clone(),
        sheriff_votes: state.sheriff_votes.clone(),
        winner: state.winner,
    }
}

fn living_public(state: &GameState) -> Vec<PublicPlayer> {
    state.living_players().map(PublicPlayer::from).collect()
}

/// Werewolf panel for one wolf: living players plus the other living wolves.
pub fn werewolf_panel(state: &GameState, wolf_id: PlayerId) -> ServerEvent {
    let teammates = state
        .living_wolves()
        .filter(|w| w.id != wolf_id)
        .map(|w| TeammateInfo {
            id: w.id,
            name: w.name.clone(),
            seat: w.seat,
        })
        .collect();
    ServerEvent::WerewolfPanel {
        players: living_public(state),
        teammates,
    }
}

/// Witch panel: the pending wolf kill and the witch's remaining potions.
pub fn witch_panel(state: &GameState, witch_id: PlayerId) -> ServerEvent {
    ServerEvent::WitchPanel {
        werewolf_target: state.werewolf_kill_target,
        has_save: state.witch_has_save,
        has_poison: state.witch_has_poison,
        players: state
            .living_players()
            .filter(|p| p.id != witch_id)
            .map(PublicPlayer::from)
            .collect(),
    }
}

/// Seer panel: all living players except the seer.
pub fn seer_panel(state: &GameState, seer_id: PlayerId) -> ServerEvent {
    ServerEvent::SeerPanel {
        players: state
            .living_players()
            .filter(|p| p.id != seer_id)
            .map(PublicPlayer::from)
            .collect(),
    }
}

/// Guard panel: all living players with last night's protection excluded.
pub fn guard_panel(state: &GameState) -> ServerEvent {
    ServerEvent::GuardPanel {
        players: living_public(state),
        last_guarded_id: state.last_guarded_id,
    }
}
