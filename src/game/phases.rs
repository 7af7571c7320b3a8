//! The per-room phase machine.
//!
//! `advance` moves a room from its current stage to the next one, applying
//! exit effects (werewolf vote resolution), the skip rule for night stages
//! with no living actor, and the per-stage entry handlers. Handlers never
//! touch channels; everything outbound is collected into an [`Outbox`] the
//! coordinator flushes after releasing the room lock.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::{template_by_name, Role};
use crate::config::StageConfig;
use crate::game::rules::{self, WolfVoteOutcome};
use crate::game::state::{GameState, Stage, Winner};
use crate::protocol::{views, Outbound, Outbox, ServerEvent};

/// What entering a stage produced: the countdown to schedule (zero for
/// untimed stages) and the frames to deliver.
#[derive(Debug)]
pub struct StageEntry {
    pub duration_secs: u64,
    pub outbox: Outbox,
}

impl StageEntry {
    fn untimed(outbox: Outbox) -> Self {
        Self {
            duration_secs: 0,
            outbox,
        }
    }
}

/// Advances the room one stage (possibly skipping stages with no eligible
/// actor) and runs the new stage's entry handler.
pub fn advance<R: Rng + ?Sized>(
    state: &mut GameState,
    cfg: &StageConfig,
    rng: &mut R,
) -> StageEntry {
    if state.stage == Stage::GameOver {
        return StageEntry::untimed(Vec::new());
    }

    // Exit effects of the stage being left.
    if state.stage == Stage::WerewolfTurn {
        match rules::resolve_werewolf_votes(state) {
            WolfVoteOutcome::Target(target) => state.werewolf_kill_target = Some(target),
            WolfVoteOutcome::NoVotes => state.werewolf_kill_target = None,
            WolfVoteOutcome::Tie => {
                if !state.werewolf_revote {
                    return restart_werewolf_vote(state, cfg);
                }
                state.werewolf_kill_target = None;
            }
        }
    }

    let mut next = successor(state);
    while skipped(state, next) {
        next = successor_of(state, next);
    }
    enter(state, next, cfg, rng)
}

/// One tied wolf vote: clear the ballots, tell the wolves, restart the
/// WEREWOLF_TURN countdown. A second tie falls through to no kill.
fn restart_werewolf_vote(state: &mut GameState, cfg: &StageConfig) -> StageEntry {
    state.werewolf_revote = true;
    state.werewolf_votes.clear();

    let mut outbox: Outbox = state
        .living_wolves()
        .map(|wolf| {
            Outbound::To(
                wolf.id,
                ServerEvent::notice("狼人投票平票，请重新投票。"),
            )
        })
        .collect();
    let duration_secs = cfg.duration_secs(Stage::WerewolfTurn);
    state.timer = duration_secs;
    outbox.push(Outbound::Broadcast(stage_change(state)));
    StageEntry {
        duration_secs,
        outbox,
    }
}

/// The next stage in the ordered machine, before the skip rule.
fn successor(state: &GameState) -> Stage {
    successor_of(state, state.stage)
}

fn successor_of(state: &GameState, stage: Stage) -> Stage {
    match stage {
        Stage::Waiting => Stage::RoleAssign,
        Stage::RoleAssign => Stage::NightStart,
        Stage::NightStart => Stage::WerewolfTurn,
        Stage::WerewolfTurn => Stage::WitchTurn,
        Stage::WitchTurn => Stage::SeerTurn,
        Stage::SeerTurn => Stage::GuardTurn,
        Stage::GuardTurn => Stage::NightResolve,
        Stage::NightResolve => {
            if rules::check_game_over(state).is_some() {
                Stage::GameOver
            } else {
                Stage::Dawn
            }
        }
        Stage::Dawn => {
            if state.day == 1 {
                Stage::SheriffElection
            } else {
                Stage::SpeechOrder
            }
        }
        Stage::SheriffElection => Stage::SheriffSpeech,
        Stage::SheriffSpeech => Stage::SheriffVote,
        Stage::SheriffVote => Stage::SheriffResult,
        Stage::SheriffResult => Stage::SpeechOrder,
        Stage::SpeechOrder => Stage::DayDiscussion,
        Stage::DayDiscussion => Stage::Vote,
        Stage::Vote => Stage::VoteResolve,
        Stage::VoteResolve => {
            if rules::check_game_over(state).is_some() {
                Stage::GameOver
            } else {
                Stage::NightStart
            }
        }
        Stage::GameOver => Stage::GameOver,
    }
}

/// The skip rule: a role-specific stage with no living actor is passed over
/// without any broadcast. Sheriff speech/vote/result are skipped when nobody
/// ran for sheriff.
fn skipped(state: &GameState, stage: Stage) -> bool {
    match stage {
        Stage::WerewolfTurn => state.living_wolves().next().is_none(),
        Stage::WitchTurn => state.living_role_holder(Role::Witch).is_none(),
        Stage::SeerTurn => state.living_role_holder(Role::Seer).is_none(),
        Stage::GuardTurn => state.living_role_holder(Role::Guard).is_none(),
        Stage::SheriffSpeech | Stage::SheriffVote | Stage::SheriffResult => {
            state.sheriff_candidates.is_empty()
        }
        _ => false,
    }
}

/// Sets the stage and runs its entry handler.
fn enter<R: Rng + ?Sized>(
    state: &mut GameState,
    stage: Stage,
    cfg: &StageConfig,
    rng: &mut R,
) -> StageEntry {
    state.stage = stage;
    let duration_secs = cfg.duration_secs(stage);
    state.timer = duration_secs;

    let mut outbox = Outbox::new();
    match stage {
        Stage::Waiting | Stage::GameOver => {}
        Stage::RoleAssign => {
            if let Err(entry) = assign_roles(state, rng, &mut outbox) {
                return entry;
            }
        }
        Stage::NightStart => {
            state.day += 1;
            state.reset_night_state();
        }
        Stage::WerewolfTurn => {
            for wolf in state.living_wolves() {
                outbox.push(Outbound::To(wolf.id, views::werewolf_panel(state, wolf.id)));
            }
        }
        Stage::WitchTurn => {
            if let Some(witch) = state.living_role_holder(Role::Witch) {
                outbox.push(Outbound::To(witch.id, views::witch_panel(state, witch.id)));
            }
        }
        Stage::SeerTurn => {
            if let Some(seer) = state.living_role_holder(Role::Seer) {
                outbox.push(Outbound::To(seer.id, views::seer_panel(state, seer.id)));
            }
        }
        Stage::GuardTurn => {
            if let Some(guard) = state.living_role_holder(Role::Guard) {
                outbox.push(Outbound::To(guard.id, views::guard_panel(state)));
            }
        }
        Stage::NightResolve => resolve_night(state, &mut outbox),
        Stage::Dawn => {
            outbox.push(Outbound::Broadcast(ServerEvent::NightDeaths {
                deaths: state.nightly_deaths.clone(),
            }));
        }
        Stage::SheriffElection => {
            state.sheriff_candidates.clear();
        }
        Stage::SheriffSpeech => {
            state.speech_cursor = 0;
            state.current_speaker_id = state.sheriff_candidates.first().copied();
        }
        Stage::SheriffVote => {
            state.sheriff_votes.clear();
            state.current_speaker_id = None;
        }
        Stage::SheriffResult => resolve_sheriff(state, &mut outbox),
        Stage::SpeechOrder => {
            state.speech_order = rules::determine_speech_order(state, rng);
            state.current_speaker_id = None;
        }
        Stage::DayDiscussion => {
            state.speech_cursor = 0;
            state.current_speaker_id = state.speech_order.first().copied();
        }
        Stage::Vote => {
            state.reset_day_votes();
            state.current_speaker_id = None;
        }
        Stage::VoteResolve => resolve_vote(state, &mut outbox),
    }

    if stage == Stage::GameOver {
        return finish_game(state, rules::check_game_over(state), outbox);
    }

    outbox.push(Outbound::Broadcast(stage_change(state)));
    StageEntry {
        duration_secs,
        outbox,
    }
}

/// Shuffles the template deck onto the seated players and deals each player
/// their role privately. A broken template is fatal: the room aborts with no
/// winner.
fn assign_roles<R: Rng + ?Sized>(
    state: &mut GameState,
    rng: &mut R,
    outbox: &mut Outbox,
) -> Result<(), StageEntry> {
    let Some(template) = template_by_name(&state.config.template_name) else {
        return Err(abort(state, "配置的板子不存在，游戏终止。"));
    };
    let mut deck = template.deck();
    if deck.len() != state.players.len() {
        return Err(abort(state, "玩家人数与板子不符，游戏终止。"));
    }
    deck.shuffle(rng);

    // deal in seat order without disturbing the list's insertion order
    let mut seat_order: Vec<usize> = (0..state.players.len()).collect();
    seat_order.sort_by_key(|&i| state.players[i].seat);
    for (idx, role) in seat_order.into_iter().zip(deck) {
        state.players[idx].role = Some(role);
    }
    for player in &state.players {
        if let Some(role) = player.role {
            outbox.push(Outbound::To(player.id, ServerEvent::RoleAssignment { role }));
        }
    }
    Ok(())
}

/// Fatal path: template invariants broken. The room ends with no winner.
pub fn abort(state: &mut GameState, reason: &str) -> StageEntry {
    tracing::error!(room_id = %state.room_id, reason, "Aborting room");
    let mut outbox = vec![Outbound::Broadcast(ServerEvent::notice(reason))];
    let entry = finish_game(state, None, Vec::new());
    outbox.extend(entry.outbox);
    StageEntry::untimed(outbox)
}

fn finish_game(state: &mut GameState, winner: Option<Winner>, mut outbox: Outbox) -> StageEntry {
    state.stage = Stage::GameOver;
    state.timer = 0;
    state.winner = winner;
    let roles = state
        .players
        .iter()
        .filter_map(|p| p.role.map(|role| (p.id, role)))
        .collect();
    outbox.push(Outbound::Broadcast(ServerEvent::GameStateUpdate(Box::new(
        views::public_view(state),
    ))));
    outbox.push(Outbound::Broadcast(ServerEvent::GameOver {
        winner: state.winner,
        roles,
    }));
    StageEntry::untimed(outbox)
}

/// NIGHT_RESOLVE entry: apply the resolved deaths, deliver the seer's
/// result, roll the guard history forward.
fn resolve_night(state: &mut GameState, outbox: &mut Outbox) {
    let result = rules::resolve_night(state);

    state.nightly_deaths = result.dead.clone();
    for id in &result.dead {
        if let Some(player) = state.player_mut(*id) {
            player.is_alive = false;
        }
    }
    state.last_guarded_id = state.guard_target;

    if let Some(check) = result.checked {
        let seer_id = state
            .night_actions
            .iter()
            .find(|(_, action)| action.action == crate::game::state::NightActionKind::Check)
            .map(|(actor, _)| *actor);
        if let (Some(seer_id), Some(target)) = (seer_id, state.player(check.target_id)) {
            let verdict = if check.is_wolf { "狼人" } else { "好人" };
            outbox.push(Outbound::To(
                seer_id,
                ServerEvent::notice(format!("查验结果: {} 的身份是 {verdict}。", target.name)),
            ));
        }
    }
}

/// SHERIFF_RESULT entry: a unique top candidate takes the badge.
fn resolve_sheriff(state: &mut GameState, outbox: &mut Outbox) {
    match rules::resolve_sheriff_votes(state) {
        Some(sheriff_id) => {
            if let Some(player) = state.player_mut(sheriff_id) {
                player.is_sheriff = true;
                let name = player.name.clone();
                outbox.push(Outbound::Broadcast(ServerEvent::notice(format!(
                    "{name} 当选警长！"
                ))));
            }
        }
        None => {
            outbox.push(Outbound::Broadcast(ServerEvent::notice(
                "警长投票平票，无人当选。",
            )));
        }
    }
}

/// VOTE_RESOLVE entry: apply the exile, with the Idiot reveal exception.
fn resolve_vote(state: &mut GameState, outbox: &mut Outbox) {
    let result = rules::resolve_day_votes(state);

    if let Some(exiled_id) = result.eliminated {
        let exiled = state.player_mut(exiled_id);
        if let Some(player) = exiled {
            if player.role == Some(Role::Idiot) {
                // Revealed, stays alive, loses its vote for the rest of the game.
                player.has_voted_out = true;
                let name = player.name.clone();
                outbox.push(Outbound::Broadcast(ServerEvent::notice(format!(
                    "{name} 亮出了白痴牌，免于放逐，但失去投票权。"
                ))));
            } else {
                player.is_alive = false;
            }
        }
    }

    outbox.push(Outbound::Broadcast(ServerEvent::VoteResult {
        eliminated: result.eliminated,
        tally: result.tally,
    }));
}

/// The broadcast emitted on every stage transition.
pub fn stage_change(state: &GameState) -> ServerEvent {
    ServerEvent::StageChange {
        stage: state.stage,
        timer: state.timer,
        day: state.day,
        players: state.players.iter().map(Into::into).collect(),
    }
}

/// Moves DAY_DISCUSSION or SHERIFF_SPEECH to its next living speaker.
/// Returns `false` when the roster is exhausted and the stage should
/// advance.
pub fn advance_speaker(state: &mut GameState) -> bool {
    let roster: Vec<_> = match state.stage {
        Stage::DayDiscussion => state.speech_order.clone(),
        Stage::SheriffSpeech => state.sheriff_candidates.clone(),
        _ => return false,
    };
    loop {
        state.speech_cursor += 1;
        match roster.get(state.speech_cursor) {
            Some(&next) => {
                if state.player(next).is_some_and(|p| p.is_alive) {
                    state.current_speaker_id = Some(next);
                    return true;
                }
            }
            None => {
                state.current_speaker_id = None;
                return false;
            }
        }
    }
}
