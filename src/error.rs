//! Game error types.
//!
//! State errors (wrong stage, ineligible actor, illegal target) are returned
//! to the offending player as a `GAME_EVENT` frame; structural errors (room
//! not found, room full) surface as HTTP 400/404 on the bootstrap surface.

use thiserror::Error;

use crate::protocol::ErrorCode;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("room not found")]
    RoomNotFound,
    #[error("player not found in this room")]
    PlayerNotFound,
    #[error("the room is full")]
    RoomFull,
    #[error("the game has already started")]
    GameStarted,
    #[error("only the host can start the game")]
    NotHost,
    #[error("that is not possible in the current stage")]
    WrongStage,
    #[error("player count does not match the selected template")]
    BadCount,
    #[error("that seat is already taken")]
    SeatTaken,
    #[error("you are not eligible for that action")]
    NotEligible,
    #[error("illegal target")]
    IllegalTarget,
    #[error("that potion has already been used")]
    PotionExhausted,
    #[error("the witch may use only one potion per night")]
    OnePotionPerNight,
    #[error("the guard cannot protect the same player two nights in a row")]
    GuardRepeat,
    #[error("game template `{0}` not found")]
    TemplateNotFound(String),
    #[error("profile not found")]
    ProfileNotFound,
}

impl GameError {
    /// Wire code for the structured error frame.
    pub fn code(&self) -> ErrorCode {
        match self {
            GameError::RoomNotFound => ErrorCode::RoomNotFound,
            GameError::PlayerNotFound => ErrorCode::PlayerNotFound,
            GameError::RoomFull => ErrorCode::RoomFull,
            GameError::GameStarted => ErrorCode::GameStarted,
            GameError::NotHost => ErrorCode::NotHost,
            GameError::WrongStage => ErrorCode::WrongStage,
            GameError::BadCount => ErrorCode::BadCount,
            GameError::SeatTaken => ErrorCode::SeatTaken,
            GameError::NotEligible => ErrorCode::NotEligible,
            GameError::IllegalTarget => ErrorCode::IllegalTarget,
            GameError::PotionExhausted => ErrorCode::PotionExhausted,
            GameError::OnePotionPerNight => ErrorCode::OnePotionPerNight,
            GameError::GuardRepeat => ErrorCode::GuardRepeat,
            GameError::TemplateNotFound(_) => ErrorCode::TemplateNotFound,
            GameError::ProfileNotFound => ErrorCode::ProfileNotFound,
        }
    }

    /// Whether this error belongs to the request boundary (HTTP 4xx) rather
    /// than the in-game channel.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            GameError::RoomNotFound
                | GameError::PlayerNotFound
                | GameError::RoomFull
                | GameError::GameStarted
                | GameError::SeatTaken
                | GameError::TemplateNotFound(_)
                | GameError::ProfileNotFound
        )
    }
}
