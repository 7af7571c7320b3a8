//! Per-room serialized mutation authority.
//!
//! All game-state mutation happens while holding the room's mutex. Handlers
//! mutate and collect outbound frames under the lock, then flush them after
//! releasing it; nothing awaits channel I/O inside the critical section.
//!
//! Each timed stage registers a single timer task bound to
//! `(expected_stage, epoch)`. Advancing cancels the task first and bumps the
//! epoch, so a timer expiry that lost the race observes a stale epoch (or a
//! different stage) and no-ops.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::catalog::{template_by_name, GameTemplate};
use crate::config::Config;
use crate::error::GameError;
use crate::game::phases;
use crate::game::state::{
    GameState, NightAction, NightActionKind, Player, PlayerId, RoomId, Stage, Winner,
};
use crate::profiles::{Profile, ProfileStore};
use crate::protocol::{views, Outbound, Outbox, ServerEvent, WitchActionKind};
use crate::registry::ConnectionRegistry;

struct TimerGuard {
    cancel: CancellationToken,
    deadline: Instant,
}

/// Owns one room's state, lock and timer task.
pub struct RoomCoordinator {
    pub room_id: RoomId,
    config: Arc<Config>,
    state: Mutex<GameState>,
    registry: Arc<ConnectionRegistry>,
    profiles: Arc<dyn ProfileStore>,
    timer: StdMutex<Option<TimerGuard>>,
    /// Bumped on every timer schedule/cancel; stale expiries compare against
    /// it and no-op.
    epoch: AtomicU64,
    /// Self-reference handed to spawned timer tasks.
    weak: std::sync::Weak<RoomCoordinator>,
}

impl RoomCoordinator {
    pub fn new(
        room_id: RoomId,
        host: Player,
        room_config: crate::game::state::RoomConfig,
        config: Arc<Config>,
        registry: Arc<ConnectionRegistry>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            room_id,
            config,
            state: Mutex::new(GameState::new(room_id, host, room_config)),
            registry,
            profiles,
            timer: StdMutex::new(None),
            epoch: AtomicU64::new(0),
            weak: weak.clone(),
        })
    }

    // ------------------------------------------------------------------
    // Lobby operations
    // ------------------------------------------------------------------

    /// Adds a player to a waiting room, seating them at the lowest free
    /// seat.
    pub async fn join(&self, profile: &Profile) -> Result<Player, GameError> {
        let (player, outbox) = {
            let mut st = self.state.lock().await;
            if st.stage != Stage::Waiting {
                return Err(GameError::GameStarted);
            }
            let template = room_template(&st)?;
            let max = max_players(template);
            if st.players.len() >= max {
                return Err(GameError::RoomFull);
            }
            let mut player = Player::new(
                profile.id,
                profile.name.clone(),
                profile.avatar_url.clone(),
                false,
            );
            player.seat = st.first_free_seat(max);
            st.players.push(player.clone());
            info!(room_id = %self.room_id, player_id = %player.id, "Player joined room");
            (player, vec![broadcast_state(&st)])
        };
        self.flush(outbox).await;
        Ok(player)
    }

    pub async fn set_ready(&self, player_id: PlayerId, ready: bool) -> Result<(), GameError> {
        let outbox = {
            let mut st = self.state.lock().await;
            if st.stage != Stage::Waiting {
                return Err(GameError::WrongStage);
            }
            let player = st.player_mut(player_id).ok_or(GameError::PlayerNotFound)?;
            player.is_ready = ready;
            let mut outbox = vec![broadcast_state(&st)];
            if lobby_complete(&st) {
                outbox.extend(self.advance_locked(&mut st));
            }
            outbox
        };
        self.flush(outbox).await;
        Ok(())
    }

    pub async fn take_seat(&self, player_id: PlayerId, seat: usize) -> Result<(), GameError> {
        let outbox = {
            let mut st = self.state.lock().await;
            if st.stage != Stage::Waiting {
                return Err(GameError::WrongStage);
            }
            let template = room_template(&st)?;
            if seat >= max_players(template) {
                return Err(GameError::IllegalTarget);
            }
            let taken = st
                .players
                .iter()
                .any(|p| p.id != player_id && p.seat == Some(seat));
            if taken {
                return Err(GameError::SeatTaken);
            }
            let player = st.player_mut(player_id).ok_or(GameError::PlayerNotFound)?;
            player.seat = Some(seat);
            vec![broadcast_state(&st)]
        };
        self.flush(outbox).await;
        Ok(())
    }

    /// Host-only game start; seats any still-unseated players first.
    pub async fn start(&self, requester_id: PlayerId) -> Result<(), GameError> {
        let outbox = {
            let mut st = self.state.lock().await;
            if st.stage != Stage::Waiting {
                return Err(GameError::WrongStage);
            }
            if requester_id != st.host_id {
                return Err(GameError::NotHost);
            }
            let template = room_template(&st)?;
            if !template.player_counts.contains(&st.players.len()) {
                return Err(GameError::BadCount);
            }
            let max = max_players(template);
            let unseated: Vec<PlayerId> = st
                .players
                .iter()
                .filter(|p| p.seat.is_none())
                .map(|p| p.id)
                .collect();
            for id in unseated {
                let seat = st.first_free_seat(max);
                if let Some(player) = st.player_mut(id) {
                    player.seat = seat;
                }
            }
            info!(room_id = %self.room_id, "Game starting");
            self.advance_locked(&mut st)
        };
        self.flush(outbox).await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Night actions
    // ------------------------------------------------------------------

    /// Generic action entry point matching the coordinator surface; the
    /// dispatcher mostly calls the specific handlers below.
    pub async fn record_action(
        &self,
        actor_id: PlayerId,
        action: NightActionKind,
        target_id: Option<PlayerId>,
    ) -> Result<(), GameError> {
        match action {
            NightActionKind::Kill => {
                self.record_vote(actor_id, target_id.ok_or(GameError::IllegalTarget)?)
                    .await
            }
            NightActionKind::Save => self.witch_action(actor_id, WitchActionKind::Save, target_id).await,
            NightActionKind::Poison => {
                self.witch_action(actor_id, WitchActionKind::Poison, target_id)
                    .await
            }
            NightActionKind::Check => {
                self.seer_check(actor_id, target_id.ok_or(GameError::IllegalTarget)?)
                    .await
            }
            NightActionKind::Guard => {
                self.guard_action(actor_id, target_id.ok_or(GameError::IllegalTarget)?)
                    .await
            }
            NightActionKind::Skip => self.confirm_action(actor_id).await,
        }
    }

    pub async fn witch_action(
        &self,
        actor_id: PlayerId,
        action: WitchActionKind,
        target_id: Option<PlayerId>,
    ) -> Result<(), GameError> {
        let outbox = {
            let mut st = self.state.lock().await;
            if st.stage != Stage::WitchTurn {
                return Err(GameError::WrongStage);
            }
            let actor = st.player(actor_id).ok_or(GameError::PlayerNotFound)?;
            let caps = actor.role.map(|r| r.capabilities());
            if !actor.is_alive || !caps.is_some_and(|c| c.can_save || c.can_poison) {
                return Err(GameError::NotEligible);
            }
            if st.night_actions.contains_key(&actor_id) {
                return Err(GameError::OnePotionPerNight);
            }

            match action {
                WitchActionKind::Save => {
                    if !st.witch_has_save {
                        return Err(GameError::PotionExhausted);
                    }
                    let victim = st.werewolf_kill_target.ok_or(GameError::IllegalTarget)?;
                    st.witch_has_save = false;
                    st.witch_save_target = Some(victim);
                    st.night_actions.insert(
                        actor_id,
                        NightAction {
                            action: NightActionKind::Save,
                            target: Some(victim),
                        },
                    );
                }
                WitchActionKind::Poison => {
                    if !st.witch_has_poison {
                        return Err(GameError::PotionExhausted);
                    }
                    let target = target_id.ok_or(GameError::IllegalTarget)?;
                    if !st.player(target).is_some_and(|p| p.is_alive) {
                        return Err(GameError::IllegalTarget);
                    }
                    st.witch_has_poison = false;
                    st.witch_poison_target = Some(target);
                    st.night_actions.insert(
                        actor_id,
                        NightAction {
                            action: NightActionKind::Poison,
                            target: Some(target),
                        },
                    );
                }
            }
            // the witch is the only actor of this stage; acting completes it
            self.advance_locked(&mut st)
        };
        self.flush(outbox).await;
        Ok(())
    }

    pub async fn seer_check(
        &self,
        actor_id: PlayerId,
        target_id: PlayerId,
    ) -> Result<(), GameError> {
        let outbox = {
            let mut st = self.state.lock().await;
            if st.stage != Stage::SeerTurn {
                return Err(GameError::WrongStage);
            }
            let actor = st.player(actor_id).ok_or(GameError::PlayerNotFound)?;
            if !actor.is_alive || !actor.role.is_some_and(|r| r.capabilities().can_check) {
                return Err(GameError::NotEligible);
            }
            if target_id == actor_id || !st.player(target_id).is_some_and(|p| p.is_alive) {
                return Err(GameError::IllegalTarget);
            }
            st.night_actions.insert(
                actor_id,
                NightAction {
                    action: NightActionKind::Check,
                    target: Some(target_id),
                },
            );
            // result is computed and delivered at NIGHT_RESOLVE
            self.advance_locked(&mut st)
        };
        self.flush(outbox).await;
        Ok(())
    }

    pub async fn guard_action(
        &self,
        actor_id: PlayerId,
        target_id: PlayerId,
    ) -> Result<(), GameError> {
        let outbox = {
            let mut st = self.state.lock().await;
            if st.stage != Stage::GuardTurn {
                return Err(GameError::WrongStage);
            }
            let actor = st.player(actor_id).ok_or(GameError::PlayerNotFound)?;
            if !actor.is_alive || !actor.role.is_some_and(|r| r.capabilities().can_guard) {
                return Err(GameError::NotEligible);
            }
            if !st.player(target_id).is_some_and(|p| p.is_alive) {
                return Err(GameError::IllegalTarget);
            }
            if st.last_guarded_id == Some(target_id) {
                return Err(GameError::GuardRepeat);
            }
            st.guard_target = Some(target_id);
            st.night_actions.insert(
                actor_id,
                NightAction {
                    action: NightActionKind::Guard,
                    target: Some(target_id),
                },
            );
            self.advance_locked(&mut st)
        };
        self.flush(outbox).await;
        Ok(())
    }

    /// CONFIRM_ACTION: the current night actor finishes without acting (a
    /// wolf abstains, the witch keeps her potions, the seer or guard skips).
    pub async fn confirm_action(&self, actor_id: PlayerId) -> Result<(), GameError> {
        let outbox = {
            let mut st = self.state.lock().await;
            let actor = st.player(actor_id).ok_or(GameError::PlayerNotFound)?;
            if !actor.is_alive {
                return Err(GameError::NotEligible);
            }
            let caps = actor.role.map(|r| r.capabilities());
            let eligible = match st.stage {
                Stage::WerewolfTurn => actor.is_wolf(),
                Stage::WitchTurn => caps.is_some_and(|c| c.can_save || c.can_poison),
                Stage::SeerTurn => caps.is_some_and(|c| c.can_check),
                Stage::GuardTurn => caps.is_some_and(|c| c.can_guard),
                _ => return Err(GameError::WrongStage),
            };
            if !eligible {
                return Err(GameError::NotEligible);
            }
            st.night_actions.insert(
                actor_id,
                NightAction {
                    action: NightActionKind::Skip,
                    target: None,
                },
            );
            let complete = match st.stage {
                Stage::WerewolfTurn => wolf_turn_complete(&st),
                // single-actor stages complete as soon as the actor is done
                _ => true,
            };
            if complete {
                self.advance_locked(&mut st)
            } else {
                Vec::new()
            }
        };
        self.flush(outbox).await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Votes
    // ------------------------------------------------------------------

    /// Routes a vote to the wolf kill ballot, the exile ballot or the
    /// sheriff ballot depending on the current stage.
    pub async fn record_vote(
        &self,
        voter_id: PlayerId,
        target_id: PlayerId,
    ) -> Result<(), GameError> {
        let outbox = {
            let mut st = self.state.lock().await;
            match st.stage {
                Stage::WerewolfTurn => self.werewolf_vote_locked(&mut st, voter_id, target_id)?,
                Stage::Vote => self.day_vote_locked(&mut st, voter_id, target_id)?,
                Stage::SheriffVote => self.sheriff_vote_locked(&mut st, voter_id, target_id)?,
                _ => return Err(GameError::WrongStage),
            }
        };
        self.flush(outbox).await;
        Ok(())
    }

    fn werewolf_vote_locked(
        &self,
        st: &mut GameState,
        voter_id: PlayerId,
        target_id: PlayerId,
    ) -> Result<Outbox, GameError> {
        let voter = st.player(voter_id).ok_or(GameError::PlayerNotFound)?;
        if !voter.is_alive || !voter.is_wolf() {
            return Err(GameError::NotEligible);
        }
        if !st.player(target_id).is_some_and(|p| p.is_alive) {
            return Err(GameError::IllegalTarget);
        }
        st.werewolf_votes.insert(voter_id, target_id);

        // the running tally is wolf-only knowledge
        let update = ServerEvent::WerewolfVoteUpdate {
            votes: st.werewolf_votes.clone(),
        };
        let mut outbox: Outbox = st
            .living_wolves()
            .map(|wolf| Outbound::To(wolf.id, update.clone()))
            .collect();

        if wolf_turn_complete(st) {
            outbox.extend(self.advance_locked(st));
        }
        Ok(outbox)
    }

    fn day_vote_locked(
        &self,
        st: &mut GameState,
        voter_id: PlayerId,
        target_id: PlayerId,
    ) -> Result<Outbox, GameError> {
        let voter = st.player(voter_id).ok_or(GameError::PlayerNotFound)?;
        if !voter.is_alive {
            return Err(GameError::NotEligible);
        }
        if voter.has_voted_out {
            // revealed Idiot: the ballot is acknowledged but never counted
            return Ok(vec![Outbound::To(
                voter_id,
                ServerEvent::notice("你已失去投票权，本次投票不计入。"),
            )]);
        }
        if !st.player(target_id).is_some_and(|p| p.is_alive) {
            return Err(GameError::IllegalTarget);
        }
        st.day_votes.insert(voter_id, target_id);

        let mut outbox = vec![Outbound::Broadcast(ServerEvent::VoteUpdate {
            votes: st.day_votes.clone(),
        })];
        if day_vote_complete(st) {
            outbox.extend(self.advance_locked(st));
        }
        Ok(outbox)
    }

    fn sheriff_vote_locked(
        &self,
        st: &mut GameState,
        voter_id: PlayerId,
        target_id: PlayerId,
    ) -> Result<Outbox, GameError> {
        let voter = st.player(voter_id).ok_or(GameError::PlayerNotFound)?;
        if !voter.is_alive {
            return Err(GameError::NotEligible);
        }
        // candidates abstain by policy
        if st.sheriff_candidates.contains(&voter_id) {
            return Err(GameError::NotEligible);
        }
        if !st.sheriff_candidates.contains(&target_id) {
            return Err(GameError::IllegalTarget);
        }
        st.sheriff_votes.insert(voter_id, target_id);

        let mut outbox = vec![broadcast_state(st)];
        if sheriff_vote_complete(st) {
            outbox.extend(self.advance_locked(st));
        }
        Ok(outbox)
    }

    // ------------------------------------------------------------------
    // Sheriff election & speech
    // ------------------------------------------------------------------

    pub async fn run_for_sheriff(&self, player_id: PlayerId) -> Result<(), GameError> {
        let outbox = {
            let mut st = self.state.lock().await;
            if st.stage != Stage::SheriffElection {
                return Err(GameError::WrongStage);
            }
            let player = st.player(player_id).ok_or(GameError::PlayerNotFound)?;
            if !player.is_alive {
                return Err(GameError::NotEligible);
            }
            if !st.sheriff_candidates.contains(&player_id) {
                st.sheriff_candidates.push(player_id);
            }
            vec![broadcast_state(&st)]
        };
        self.flush(outbox).await;
        Ok(())
    }

    /// PASS_TURN from the current speaker ends their slot early.
    pub async fn pass_speaker_turn(&self, player_id: PlayerId) -> Result<(), GameError> {
        let outbox = {
            let mut st = self.state.lock().await;
            if !matches!(st.stage, Stage::DayDiscussion | Stage::SheriffSpeech) {
                return Err(GameError::WrongStage);
            }
            if st.current_speaker_id != Some(player_id) {
                return Err(GameError::NotEligible);
            }
            self.next_speaker_locked(&mut st)
        };
        self.flush(outbox).await;
        Ok(())
    }

    /// Moves to the next living speaker, restarting the per-speaker
    /// countdown, or advances the stage when the roster is exhausted.
    fn next_speaker_locked(&self, st: &mut GameState) -> Outbox {
        if phases::advance_speaker(st) {
            let secs = self.config.stages.duration_secs(st.stage);
            st.timer = secs;
            self.cancel_timer();
            self.schedule_timer(st.stage, secs);
            vec![broadcast_state(st)]
        } else {
            self.advance_locked(st)
        }
    }

    // ------------------------------------------------------------------
    // Channel lifecycle
    // ------------------------------------------------------------------

    /// Marks the channel open and snapshots the room for the new
    /// connection: a full state update plus, mid-stage, a STAGE_CHANGE
    /// carrying the residual countdown.
    pub async fn on_connect(&self, player_id: PlayerId) -> Result<(), GameError> {
        let outbox = {
            let mut st = self.state.lock().await;
            let player = st.player_mut(player_id).ok_or(GameError::PlayerNotFound)?;
            player.connected = true;
            let mut outbox = vec![Outbound::To(
                player_id,
                ServerEvent::GameStateUpdate(Box::new(views::public_view(&st))),
            )];
            if let Some(residual) = self.residual_secs() {
                let mut change = phases::stage_change(&st);
                if let ServerEvent::StageChange { timer, .. } = &mut change {
                    *timer = residual;
                }
                outbox.push(Outbound::To(player_id, change));
            }
            outbox
        };
        self.flush(outbox).await;
        Ok(())
    }

    /// Disconnects never mutate game state; the player keeps their role and
    /// aliveness and delivery is suspended until reconnect.
    pub async fn on_disconnect(&self, player_id: PlayerId) {
        let outbox = {
            let mut st = self.state.lock().await;
            match st.player_mut(player_id) {
                Some(player) => {
                    player.connected = false;
                    vec![Outbound::Broadcast(ServerEvent::PlayerDisconnected {
                        player_id,
                    })]
                }
                None => Vec::new(),
            }
        };
        self.flush(outbox).await;
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    pub async fn public_snapshot(&self) -> views::PublicGameState {
        let st = self.state.lock().await;
        views::public_view(&st)
    }

    pub async fn lobby_summary(&self) -> LobbySummary {
        let st = self.state.lock().await;
        let max_players = room_template(&st).map(max_players).unwrap_or(0);
        let host_name = st
            .player(st.host_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        LobbySummary {
            room_id: st.room_id,
            host_name,
            player_count: st.players.len(),
            max_players,
            template_name: st.config.template_name.clone(),
            stage: st.stage,
            is_private: st.config.is_private,
        }
    }

    pub async fn stage(&self) -> Stage {
        self.state.lock().await.stage
    }

    /// Runs a closure against the locked state. The integration suite uses
    /// this to fix role assignments for deterministic scenarios.
    pub async fn with_state<T>(&self, f: impl FnOnce(&mut GameState) -> T) -> T {
        let mut st = self.state.lock().await;
        f(&mut st)
    }

    // ------------------------------------------------------------------
    // Advancing & timers
    // ------------------------------------------------------------------

    /// Cancels the timer, advances the phase machine, schedules the next
    /// countdown and triggers game-over bookkeeping. Caller holds the lock.
    fn advance_locked(&self, st: &mut GameState) -> Outbox {
        self.cancel_timer();
        let entry = phases::advance(st, &self.config.stages, &mut rand::thread_rng());
        if entry.duration_secs > 0 {
            self.schedule_timer(st.stage, entry.duration_secs);
        }
        if st.stage == Stage::GameOver {
            self.record_results(st);
        }
        entry.outbox
    }

    /// Timer expiry. Validates `(stage, epoch)` against the current values;
    /// anything stale is ignored.
    async fn on_timer(&self, expected_stage: Stage, epoch: u64) {
        let outbox = {
            let mut st = self.state.lock().await;
            if self.epoch.load(Ordering::SeqCst) != epoch || st.stage != expected_stage {
                debug!(
                    room_id = %self.room_id,
                    ?expected_stage,
                    current_stage = ?st.stage,
                    "Stale timer ignored"
                );
                return;
            }
            if matches!(st.stage, Stage::DayDiscussion | Stage::SheriffSpeech) {
                // the countdown belongs to the current speaker, not the stage
                self.next_speaker_locked(&mut st)
            } else {
                self.advance_locked(&mut st)
            }
        };
        self.flush(outbox).await;
    }

    fn schedule_timer(&self, stage: Stage, secs: u64) {
        let token = CancellationToken::new();
        let deadline = Instant::now() + Duration::from_secs(secs);
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut guard = self.timer.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(previous) = guard.replace(TimerGuard {
                cancel: token.clone(),
                deadline,
            }) {
                previous.cancel.cancel();
            }
        }
        let Some(coordinator) = self.weak.upgrade() else {
            return;
        };
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = tokio::time::sleep_until(deadline) => {
                    coordinator.on_timer(stage, epoch).await;
                }
            }
        });
    }

    fn cancel_timer(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let mut guard = self.timer.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = guard.take() {
            previous.cancel.cancel();
        }
    }

    fn residual_secs(&self) -> Option<u64> {
        let guard = self.timer.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .as_ref()
            .map(|t| t.deadline.saturating_duration_since(Instant::now()).as_secs())
    }

    /// Win/loss counters move at game over, outside the room lock.
    fn record_results(&self, st: &GameState) {
        let Some(winner) = st.winner else { return };
        let results: Vec<_> = st
            .players
            .iter()
            .filter_map(|p| {
                p.role.map(|role| {
                    let won = match winner {
                        Winner::Good => !role.is_wolf(),
                        Winner::Wolf => role.is_wolf(),
                    };
                    (p.profile_id, won)
                })
            })
            .collect();
        let profiles = Arc::clone(&self.profiles);
        let room_id = self.room_id;
        tokio::spawn(async move {
            for (profile_id, won) in results {
                if let Err(err) = profiles.record_result(profile_id, won).await {
                    warn!(%room_id, %profile_id, error = %err, "Failed to record game result");
                }
            }
        });
    }

    async fn flush(&self, outbox: Outbox) {
        for item in outbox {
            match item {
                Outbound::Broadcast(event) => {
                    self.registry.broadcast(self.room_id, Arc::new(event)).await;
                }
                Outbound::To(player_id, event) => {
                    self.registry
                        .send_to(self.room_id, player_id, Arc::new(event))
                        .await;
                }
            }
        }
    }
}

/// A room as shown in the lobby list.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LobbySummary {
    pub room_id: RoomId,
    pub host_name: String,
    pub player_count: usize,
    pub max_players: usize,
    pub template_name: String,
    pub stage: Stage,
    pub is_private: bool,
}

fn room_template(st: &GameState) -> Result<&'static GameTemplate, GameError> {
    template_by_name(&st.config.template_name)
        .ok_or_else(|| GameError::TemplateNotFound(st.config.template_name.clone()))
}

fn max_players(template: &GameTemplate) -> usize {
    template.player_counts.iter().copied().max().unwrap_or(0)
}

fn broadcast_state(st: &GameState) -> Outbound {
    Outbound::Broadcast(ServerEvent::GameStateUpdate(Box::new(views::public_view(
        st,
    ))))
}

fn lobby_complete(st: &GameState) -> bool {
    let Ok(template) = room_template(st) else {
        return false;
    };
    !st.players.is_empty()
        && template.player_counts.contains(&st.players.len())
        && st.players.iter().all(|p| p.is_ready)
}

fn wolf_turn_complete(st: &GameState) -> bool {
    let mut wolves = st.living_wolves().peekable();
    if wolves.peek().is_none() {
        return true;
    }
    wolves.all(|wolf| {
        st.werewolf_votes.contains_key(&wolf.id)
            || st
                .night_actions
                .get(&wolf.id)
                .is_some_and(|a| a.action == NightActionKind::Skip)
    })
}

fn day_vote_complete(st: &GameState) -> bool {
    let mut eligible = st.living_players().filter(|p| !p.has_voted_out).peekable();
    if eligible.peek().is_none() {
        return false;
    }
    eligible.all(|p| st.day_votes.contains_key(&p.id))
}

fn sheriff_vote_complete(st: &GameState) -> bool {
    let mut eligible = st
        .living_players()
        .filter(|p| !st.sheriff_candidates.contains(&p.id))
        .peekable();
    if eligible.peek().is_none() {
        return true;
    }
    eligible.all(|p| st.sheriff_votes.contains_key(&p.id))
}
