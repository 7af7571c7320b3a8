//! Message dispatcher.
//!
//! Inbound: parses client frames and routes them to the room coordinator.
//! A malformed or unknown frame is dropped with a log line and the
//! connection stays open. A state error coming back from the coordinator is
//! answered with a per-recipient GAME_EVENT carrying the reason; nothing is
//! broadcast.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::game::coordinator::RoomCoordinator;
use crate::game::state::PlayerId;
use crate::protocol::{ClientFrame, ServerEvent};
use crate::registry::ConnectionRegistry;

pub struct MessageDispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl MessageDispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Parses and routes one inbound text frame from `player_id`.
    pub async fn handle_text(
        &self,
        coordinator: &Arc<RoomCoordinator>,
        player_id: PlayerId,
        text: &str,
    ) {
        let frame: ClientFrame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(err) => {
                debug!(
                    room_id = %coordinator.room_id,
                    %player_id,
                    error = %err,
                    "Dropping unparseable frame"
                );
                return;
            }
        };
        self.route(coordinator, player_id, frame).await;
    }

    async fn route(
        &self,
        coordinator: &Arc<RoomCoordinator>,
        player_id: PlayerId,
        frame: ClientFrame,
    ) {
        let result = match frame {
            ClientFrame::Ready { ready } => coordinator.set_ready(player_id, ready).await,
            ClientFrame::TakeSeat { seat } => coordinator.take_seat(player_id, seat).await,
            ClientFrame::StartGame => coordinator.start(player_id).await,
            ClientFrame::WerewolfVote { target_id } => {
                coordinator.record_vote(player_id, target_id).await
            }
            ClientFrame::WitchAction { action, target_id } => {
                coordinator.witch_action(player_id, action, target_id).await
            }
            ClientFrame::SeerCheck { target_id } => {
                coordinator.seer_check(player_id, target_id).await
            }
            ClientFrame::GuardAction { target_id } => {
                coordinator.guard_action(player_id, target_id).await
            }
            ClientFrame::VotePlayer { target_id } => {
                coordinator.record_vote(player_id, target_id).await
            }
            ClientFrame::RunForSheriff => coordinator.run_for_sheriff(player_id).await,
            ClientFrame::SheriffVote { target_id } => {
                coordinator.record_vote(player_id, target_id).await
            }
            ClientFrame::PassTurn => coordinator.pass_speaker_turn(player_id).await,
            ClientFrame::ConfirmAction => coordinator.confirm_action(player_id).await,
        };

        if let Err(err) = result {
            warn!(
                room_id = %coordinator.room_id,
                %player_id,
                error = %err,
                "Rejected client action"
            );
            self.registry
                .send_to(
                    coordinator.room_id,
                    player_id,
                    Arc::new(ServerEvent::error_event(err.to_string(), err.code())),
                )
                .await;
        }
    }
}
