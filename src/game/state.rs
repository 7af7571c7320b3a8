//! In-memory record of a single room.
//!
//! `GameState` is a passive record: accessors and bulk reset helpers only.
//! It is owned exclusively by the room's coordinator and mutated while the
//! coordinator holds the room lock.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Role;

pub type PlayerId = Uuid;
pub type RoomId = Uuid;
pub type ProfileId = Uuid;

/// The ordered stage machine. Sheriff stages run on day 1 only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Waiting,
    RoleAssign,
    NightStart,
    WerewolfTurn,
    WitchTurn,
    SeerTurn,
    GuardTurn,
    NightResolve,
    Dawn,
    SheriffElection,
    SheriffSpeech,
    SheriffVote,
    SheriffResult,
    SpeechOrder,
    DayDiscussion,
    Vote,
    VoteResolve,
    GameOver,
}

/// Winning faction, set once at game over.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Winner {
    Good,
    Wolf,
}

/// A night ability use recorded during the role's turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NightActionKind {
    Kill,
    Guard,
    Save,
    Poison,
    Check,
    /// Explicit "done without acting" from CONFIRM_ACTION.
    Skip,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NightAction {
    pub action: NightActionKind,
    pub target: Option<PlayerId>,
}

/// A player seated in a room. `role` is assigned exactly once, at game start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub profile_id: ProfileId,
    pub name: String,
    pub avatar_url: Option<String>,
    pub seat: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub is_alive: bool,
    pub is_host: bool,
    pub is_ready: bool,
    pub is_sheriff: bool,
    /// Revealed Idiot: alive but with zero vote weight.
    pub has_voted_out: bool,
    /// Whether the player's channel is currently open. Delivery state only;
    /// never affects game state.
    pub connected: bool,
}

impl Player {
    pub fn new(profile_id: ProfileId, name: String, avatar_url: Option<String>, is_host: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile_id,
            name,
            avatar_url,
            seat: None,
            role: None,
            is_alive: true,
            is_host,
            is_ready: false,
            is_sheriff: false,
            has_voted_out: false,
            connected: false,
        }
    }

    pub fn is_wolf(&self) -> bool {
        self.role.is_some_and(Role::is_wolf)
    }

    pub fn is_god(&self) -> bool {
        self.role.is_some_and(Role::is_god)
    }

    /// Weight this player's exile vote carries. A living sheriff counts 1.5,
    /// a revealed Idiot 0, everyone else 1.
    pub fn vote_weight(&self) -> f64 {
        if !self.is_alive || self.has_voted_out {
            0.0
        } else if self.is_sheriff {
            1.5
        } else {
            self.role.map_or(1.0, |r| r.capabilities().vote_weight_base)
        }
    }
}

/// Room configuration chosen at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    pub template_name: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub allow_spectators: bool,
}

/// Full authoritative state of one room.
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    pub room_id: RoomId,
    pub host_id: PlayerId,
    pub config: RoomConfig,
    /// Stable insertion order; seats are unique once assigned.
    pub players: Vec<Player>,
    pub stage: Stage,
    pub day: u32,
    /// Duration of the current stage in seconds (0 for untimed stages).
    pub timer: u64,
    pub speech_order: Vec<PlayerId>,
    pub current_speaker_id: Option<PlayerId>,
    /// Cursor into `speech_order` (day) or `sheriff_candidates` (election).
    pub speech_cursor: usize,
    pub night_actions: HashMap<PlayerId, NightAction>,
    pub day_votes: HashMap<PlayerId, PlayerId>,
    pub werewolf_votes: HashMap<PlayerId, PlayerId>,
    pub werewolf_kill_target: Option<PlayerId>,
    /// One tied wolf vote triggers a single re-vote.
    pub werewolf_revote: bool,
    pub witch_has_save: bool,
    pub witch_has_poison: bool,
    pub witch_save_target: Option<PlayerId>,
    pub witch_poison_target: Option<PlayerId>,
    pub guard_target: Option<PlayerId>,
    pub last_guarded_id: Option<PlayerId>,
    pub nightly_deaths: Vec<PlayerId>,
    pub sheriff_candidates: Vec<PlayerId>,
    pub sheriff_votes: HashMap<PlayerId, PlayerId>,
    pub winner: Option<Winner>,
}

impl GameState {
    pub fn new(room_id: RoomId, host: Player, config: RoomConfig) -> Self {
        Self {
            room_id,
            host_id: host.id,
            config,
            players: vec![host],
            stage: Stage::Waiting,
            day: 0,
            timer: 0,
            speech_order: Vec::new(),
            current_speaker_id: None,
            speech_cursor: 0,
            night_actions: HashMap::new(),
            day_votes: HashMap::new(),
            werewolf_votes: HashMap::new(),
            werewolf_kill_target: None,
            werewolf_revote: false,
            witch_has_save: true,
            witch_has_poison: true,
            witch_save_target: None,
            witch_poison_target: None,
            guard_target: None,
            last_guarded_id: None,
            nightly_deaths: Vec::new(),
            sheriff_candidates: Vec::new(),
            sheriff_votes: HashMap::new(),
            winner: None,
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn living_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_alive)
    }

    pub fn living_wolves(&self) -> impl Iterator<Item = &Player> {
        self.living_players().filter(|p| p.is_wolf())
    }

    /// The single living holder of `role`, if any.
    pub fn living_role_holder(&self, role: Role) -> Option<&Player> {
        self.living_players().find(|p| p.role == Some(role))
    }

    /// Seats currently taken.
    pub fn occupied_seats(&self) -> Vec<usize> {
        self.players.iter().filter_map(|p| p.seat).collect()
    }

    /// Lowest free seat below `max`, if any.
    pub fn first_free_seat(&self, max: usize) -> Option<usize> {
        let occupied = self.occupied_seats();
        (0..max).find(|s| !occupied.contains(s))
    }

    /// Clears all per-night records at the NIGHT_START boundary.
    /// `last_guarded_id` is carried over; it was set at the previous
    /// NIGHT_RESOLVE.
    pub fn reset_night_state(&mut self) {
        self.night_actions.clear();
        self.werewolf_votes.clear();
        self.werewolf_kill_target = None;
        self.werewolf_revote = false;
        self.witch_save_target = None;
        self.witch_poison_target = None;
        self.guard_target = None;
        self.nightly_deaths.clear();
    }

    /// Clears exile votes at the VOTE boundary.
    pub fn reset_day_votes(&mut self) {
        self.day_votes.clear();
    }
}
