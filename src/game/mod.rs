// Game engine: state model, resolution rules, phase machine, coordinator.

pub mod coordinator;
pub mod phases;
pub mod rules;
pub mod state;

pub use coordinator::{LobbySummary, RoomCoordinator};
pub use state::{GameState, Player, PlayerId, ProfileId, RoomId, Stage, Winner};
