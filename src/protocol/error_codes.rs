use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes for structured error handling on the channel and the
/// bootstrap surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Structural errors (request boundary)
    RoomNotFound,
    PlayerNotFound,
    RoomFull,
    GameStarted,
    SeatTaken,
    TemplateNotFound,
    ProfileNotFound,
    AvatarTooLarge,
    InvalidAvatar,

    // State errors (in-game channel)
    NotHost,
    WrongStage,
    BadCount,
    NotEligible,
    IllegalTarget,
    PotionExhausted,
    OnePotionPerNight,
    GuardRepeat,

    // Protocol errors
    InvalidFrame,

    // Server errors
    InternalError,
}

impl ErrorCode {
    /// Returns a human-readable description of this error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::RoomNotFound => "The requested room does not exist.",
            Self::PlayerNotFound => "The player is not part of this room.",
            Self::RoomFull => "The room has no free seats left.",
            Self::GameStarted => "The game has already started; the room cannot be joined.",
            Self::SeatTaken => "Another player already occupies that seat.",
            Self::TemplateNotFound => "No game template with that name exists.",
            Self::ProfileNotFound => "The requested profile does not exist.",
            Self::AvatarTooLarge => "The uploaded avatar exceeds the size limit.",
            Self::InvalidAvatar => "The uploaded avatar is not a recognized image.",
            Self::NotHost => "Only the room host may perform this operation.",
            Self::WrongStage => "The operation is not valid in the current stage.",
            Self::BadCount => "The player count does not match the selected template.",
            Self::NotEligible => "The player is not eligible to perform this action.",
            Self::IllegalTarget => "The chosen target is not a legal target for this action.",
            Self::PotionExhausted => "The potion has already been consumed.",
            Self::OnePotionPerNight => "The witch may use at most one potion per night.",
            Self::GuardRepeat => "The guard may not protect the same player two nights in a row.",
            Self::InvalidFrame => "The message frame could not be parsed.",
            Self::InternalError => "An internal server error occurred.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
