use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error_codes::ErrorCode;
use super::views::{PublicGameState, PublicPlayer, TeammateInfo};
use crate::catalog::Role;
use crate::game::state::{PlayerId, Stage, Winner};

/// Inbound frames sent by clients over the bidirectional channel.
/// Wire shape is `{"type": "...", "payload": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientFrame {
    Ready {
        ready: bool,
    },
    TakeSeat {
        seat: usize,
    },
    StartGame,
    WerewolfVote {
        target_id: PlayerId,
    },
    WitchAction {
        action: WitchActionKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        target_id: Option<PlayerId>,
    },
    SeerCheck {
        target_id: PlayerId,
    },
    GuardAction {
        target_id: PlayerId,
    },
    VotePlayer {
        target_id: PlayerId,
    },
    RunForSheriff,
    SheriffVote {
        target_id: PlayerId,
    },
    PassTurn,
    /// End the current night turn without using an ability.
    ConfirmAction,
}

/// The witch's choice during WITCH_TURN.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WitchActionKind {
    Save,
    Poison,
}

/// Outbound frames. Panels and private results are sent to a single
/// recipient only; everything else is broadcast in redacted form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerEvent {
    /// Broadcast on every stage transition.
    StageChange {
        stage: Stage,
        timer: u64,
        day: u32,
        players: Vec<PublicPlayer>,
    },
    /// Private: the recipient's own role, sent once at ROLE_ASSIGN.
    RoleAssignment { role: Role },
    /// Private: per-wolf panel with living players and teammates.
    WerewolfPanel {
        players: Vec<PublicPlayer>,
        teammates: Vec<TeammateInfo>,
    },
    /// Private: witch panel with the pending kill and potion availability.
    WitchPanel {
        werewolf_target: Option<PlayerId>,
        has_save: bool,
        has_poison: bool,
        players: Vec<PublicPlayer>,
    },
    /// Private: seer panel.
    SeerPanel { players: Vec<PublicPlayer> },
    /// Private: guard panel; `last_guarded_id` is excluded client-side too.
    GuardPanel {
        players: Vec<PublicPlayer>,
        last_guarded_id: Option<PlayerId>,
    },
    /// Private to living wolves: current kill-vote tallies.
    WerewolfVoteUpdate {
        votes: HashMap<PlayerId, PlayerId>,
    },
    /// Broadcast: open exile-vote progress.
    VoteUpdate {
        votes: HashMap<PlayerId, PlayerId>,
    },
    /// Broadcast at DAWN.
    NightDeaths { deaths: Vec<PlayerId> },
    /// Broadcast after VOTE_RESOLVE.
    VoteResult {
        eliminated: Option<PlayerId>,
        tally: HashMap<PlayerId, f64>,
    },
    /// Broadcast snapshot of the redacted room state.
    GameStateUpdate(Box<PublicGameState>),
    /// Free-form notice; also carries per-recipient state errors.
    GameEvent {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        error_code: Option<ErrorCode>,
    },
    /// Broadcast once; reveals every role.
    GameOver {
        winner: Option<Winner>,
        roles: HashMap<PlayerId, Role>,
    },
    /// Broadcast when a player's channel closes.
    PlayerDisconnected { player_id: PlayerId },
}

impl ServerEvent {
    /// Convenience constructor for per-recipient state errors.
    pub fn error_event(message: impl Into<String>, code: ErrorCode) -> Self {
        ServerEvent::GameEvent {
            message: message.into(),
            error_code: Some(code),
        }
    }

    /// Convenience constructor for informational notices.
    pub fn notice(message: impl Into<String>) -> Self {
        ServerEvent::GameEvent {
            message: message.into(),
            error_code: None,
        }
    }
}
