use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::game::state::Stage;

/// Per-stage countdown durations in seconds. Untimed stages (WAITING,
/// GAME_OVER) have no entry; SHERIFF_SPEECH and DAY_DISCUSSION durations are
/// per speaker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(default = "defaults::default_role_assign_secs")]
    pub role_assign_secs: u64,
    #[serde(default = "defaults::default_night_start_secs")]
    pub night_start_secs: u64,
    #[serde(default = "defaults::default_werewolf_turn_secs")]
    pub werewolf_turn_secs: u64,
    #[serde(default = "defaults::default_witch_turn_secs")]
    pub witch_turn_secs: u64,
    #[serde(default = "defaults::default_seer_turn_secs")]
    pub seer_turn_secs: u64,
    #[serde(default = "defaults::default_guard_turn_secs")]
    pub guard_turn_secs: u64,
    #[serde(default = "defaults::default_night_resolve_secs")]
    pub night_resolve_secs: u64,
    #[serde(default = "defaults::default_dawn_secs")]
    pub dawn_secs: u64,
    #[serde(default = "defaults::default_sheriff_election_secs")]
    pub sheriff_election_secs: u64,
    #[serde(default = "defaults::default_sheriff_speech_secs")]
    pub sheriff_speech_secs: u64,
    #[serde(default = "defaults::default_sheriff_vote_secs")]
    pub sheriff_vote_secs: u64,
    #[serde(default = "defaults::default_sheriff_result_secs")]
    pub sheriff_result_secs: u64,
    #[serde(default = "defaults::default_speech_order_secs")]
    pub speech_order_secs: u64,
    #[serde(default = "defaults::default_discussion_speech_secs")]
    pub discussion_speech_secs: u64,
    #[serde(default = "defaults::default_vote_secs")]
    pub vote_secs: u64,
    #[serde(default = "defaults::default_vote_resolve_secs")]
    pub vote_resolve_secs: u64,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            role_assign_secs: defaults::default_role_assign_secs(),
            night_start_secs: defaults::default_night_start_secs(),
            werewolf_turn_secs: defaults::default_werewolf_turn_secs(),
            witch_turn_secs: defaults::default_witch_turn_secs(),
            seer_turn_secs: defaults::default_seer_turn_secs(),
            guard_turn_secs: defaults::default_guard_turn_secs(),
            night_resolve_secs: defaults::default_night_resolve_secs(),
            dawn_secs: defaults::default_dawn_secs(),
            sheriff_election_secs: defaults::default_sheriff_election_secs(),
            sheriff_speech_secs: defaults::default_sheriff_speech_secs(),
            sheriff_vote_secs: defaults::default_sheriff_vote_secs(),
            sheriff_result_secs: defaults::default_sheriff_result_secs(),
            speech_order_secs: defaults::default_speech_order_secs(),
            discussion_speech_secs: defaults::default_discussion_speech_secs(),
            vote_secs: defaults::default_vote_secs(),
            vote_resolve_secs: defaults::default_vote_resolve_secs(),
        }
    }
}

impl StageConfig {
    /// Countdown for entering `stage`, in seconds. Zero means untimed.
    /// Speech stages return the per-speaker duration.
    pub fn duration_secs(&self, stage: Stage) -> u64 {
        match stage {
            Stage::Waiting | Stage::GameOver => 0,
            Stage::RoleAssign => self.role_assign_secs,
            Stage::NightStart => self.night_start_secs,
            Stage::WerewolfTurn => self.werewolf_turn_secs,
            Stage::WitchTurn => self.witch_turn_secs,
            Stage::SeerTurn => self.seer_turn_secs,
            Stage::GuardTurn => self.guard_turn_secs,
            Stage::NightResolve => self.night_resolve_secs,
            Stage::Dawn => self.dawn_secs,
            Stage::SheriffElection => self.sheriff_election_secs,
            Stage::SheriffSpeech => self.sheriff_speech_secs,
            Stage::SheriffVote => self.sheriff_vote_secs,
            Stage::SheriffResult => self.sheriff_result_secs,
            Stage::SpeechOrder => self.speech_order_secs,
            Stage::DayDiscussion => self.discussion_speech_secs,
            Stage::Vote => self.vote_secs,
            Stage::VoteResolve => self.vote_resolve_secs,
        }
    }

    pub fn duration(&self, stage: Stage) -> Duration {
        Duration::from_secs(self.duration_secs(stage))
    }
}
