// Protocol module: wire frames, error codes, and redacted views.

pub mod error_codes;
pub mod frames;
pub mod views;

pub use error_codes::ErrorCode;
pub use frames::{ClientFrame, ServerEvent, WitchActionKind};
pub use views::{public_view, PublicGameState, PublicPlayer, TeammateInfo};

use crate::game::state::PlayerId;

/// An outbound delivery produced under the room lock and flushed after the
/// lock is released. Keeps channel I/O out of mutation critical sections.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// Redacted event for every open channel in the room.
    Broadcast(ServerEvent),
    /// Private event for one recipient (panels, role cards, errors).
    To(PlayerId, ServerEvent),
}

/// Ordered collection of deliveries produced by one locked mutation.
pub type Outbox = Vec<Outbound>;
