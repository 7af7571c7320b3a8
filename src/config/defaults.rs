//! Default value functions for configuration fields, used by serde's
//! `#[serde(default = ...)]` attributes.

use super::logging::LogFormat;

// =============================================================================
// Port & Root Config
// =============================================================================

pub const fn default_port() -> u16 {
    6511
}

pub fn default_cors_origins() -> String {
    "http://localhost:6500,http://127.0.0.1:6500".to_string()
}

// =============================================================================
// Storage Defaults
// =============================================================================

pub fn default_data_dir() -> String {
    "data".to_string()
}

/// 8 MiB avatar cap.
pub const fn default_max_avatar_bytes() -> usize {
    8 * 1024 * 1024
}

// =============================================================================
// Stage Duration Defaults (seconds)
// =============================================================================

pub const fn default_role_assign_secs() -> u64 {
    5
}

pub const fn default_night_start_secs() -> u64 {
    5
}

pub const fn default_werewolf_turn_secs() -> u64 {
    45
}

pub const fn default_witch_turn_secs() -> u64 {
    45
}

pub const fn default_seer_turn_secs() -> u64 {
    45
}

pub const fn default_guard_turn_secs() -> u64 {
    45
}

pub const fn default_night_resolve_secs() -> u64 {
    5
}

pub const fn default_dawn_secs() -> u64 {
    5
}

pub const fn default_sheriff_election_secs() -> u64 {
    15
}

/// Per sheriff candidate.
pub const fn default_sheriff_speech_secs() -> u64 {
    45
}

pub const fn default_sheriff_vote_secs() -> u64 {
    45
}

pub const fn default_sheriff_result_secs() -> u64 {
    5
}

pub const fn default_speech_order_secs() -> u64 {
    5
}

/// Per living speaker during day discussion.
pub const fn default_discussion_speech_secs() -> u64 {
    45
}

pub const fn default_vote_secs() -> u64 {
    45
}

pub const fn default_vote_resolve_secs() -> u64 {
    5
}

// =============================================================================
// Logging Defaults
// =============================================================================

pub fn default_log_dir() -> String {
    "logs".to_string()
}

pub fn default_log_filename() -> String {
    "server.log".to_string()
}

pub fn default_rotation() -> String {
    "daily".to_string()
}

pub const fn default_enable_file_logging() -> bool {
    true
}

pub const fn default_log_format() -> LogFormat {
    LogFormat::Text
}
