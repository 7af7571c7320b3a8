//! Pure resolution rules.
//!
//! Night resolution, exile votes, speech order and victory checks. No I/O,
//! no locking; randomness is injected so tests can seed it.

use std::collections::HashMap;

use rand::Rng;

use crate::catalog::Role;
use crate::game::state::{GameState, NightActionKind, PlayerId, Winner};

/// Outcome of tallying the wolves' kill vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WolfVoteOutcome {
    /// A unique plurality target.
    Target(PlayerId),
    /// Two or more targets tied at the top.
    Tie,
    /// No valid votes were cast.
    NoVotes,
}

/// Tallies `werewolf_votes`, counting only living wolf-faction voters.
pub fn resolve_werewolf_votes(state: &GameState) -> WolfVoteOutcome {
    let mut counts: HashMap<PlayerId, usize> = HashMap::new();
    for (voter, target) in &state.werewolf_votes {
        let eligible = state
            .player(*voter)
            .is_some_and(|p| p.is_alive && p.is_wolf());
        if eligible {
            *counts.entry(*target).or_insert(0) += 1;
        }
    }
    let Some(&max) = counts.values().max() else {
        return WolfVoteOutcome::NoVotes;
    };
    let mut top = counts.iter().filter(|(_, &c)| c == max);
    let Some((&target, _)) = top.next() else {
        return WolfVoteOutcome::NoVotes;
    };
    if top.next().is_some() {
        WolfVoteOutcome::Tie
    } else {
        WolfVoteOutcome::Target(target)
    }
}

/// A seer investigation outcome, delivered privately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeerCheck {
    pub target_id: PlayerId,
    pub is_wolf: bool,
}

/// Result of resolving one night's recorded actions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NightResult {
    pub dead: Vec<PlayerId>,
    pub saved: Option<PlayerId>,
    pub poisoned: Option<PlayerId>,
    pub checked: Option<SeerCheck>,
}

/// Resolves the night with fixed precedence: wolf kill, guard protection,
/// witch save, witch poison. A poisoned player dies regardless of the guard;
/// guard and save on the same victim both apply. The seer's check is
/// computed here even if the seer died this night.
pub fn resolve_night(state: &GameState) -> NightResult {
    let kill = state.werewolf_kill_target;
    let guarded = kill.is_some() && kill == state.guard_target;
    let saved = kill.is_some() && kill == state.witch_save_target;

    let mut dead = Vec::new();
    if let Some(victim) = kill {
        if !guarded && !saved {
            dead.push(victim);
        }
    }
    if let Some(poisoned) = state.witch_poison_target {
        if !dead.contains(&poisoned) {
            dead.push(poisoned);
        }
    }

    let checked = state.night_actions.iter().find_map(|(actor, action)| {
        if action.action != NightActionKind::Check {
            return None;
        }
        let can_check = state
            .player(*actor)
            .and_then(|p| p.role)
            .is_some_and(|r| r.capabilities().can_check);
        if !can_check {
            return None;
        }
        let target_id = action.target?;
        let target_role = state.player(target_id).and_then(|p| p.role)?;
        Some(SeerCheck {
            target_id,
            is_wolf: target_role.is_wolf(),
        })
    });

    NightResult {
        dead,
        saved: state.witch_save_target.filter(|_| saved),
        poisoned: state.witch_poison_target,
        checked,
    }
}

/// Result of resolving an exile vote.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteResult {
    pub eliminated: Option<PlayerId>,
    pub votes: HashMap<PlayerId, PlayerId>,
    /// Weighted totals per target, for the public result frame.
    pub tally: HashMap<PlayerId, f64>,
}

/// Tallies `day_votes` with per-voter weights (living sheriff 1.5, revealed
/// Idiot 0, everyone else 1). A unique maximum exiles that target; any tie
/// exiles nobody.
pub fn resolve_day_votes(state: &GameState) -> VoteResult {
    let mut tally: HashMap<PlayerId, f64> = HashMap::new();
    for (voter, target) in &state.day_votes {
        let weight = state.player(*voter).map_or(0.0, |p| p.vote_weight());
        if weight > 0.0 {
            *tally.entry(*target).or_insert(0.0) += weight;
        }
    }

    let eliminated = unique_max(&tally);
    VoteResult {
        eliminated,
        votes: state.day_votes.clone(),
        tally,
    }
}

/// Tallies sheriff-election votes (weight 1 each; candidates do not vote,
/// which the coordinator enforces at record time). A tie elects nobody.
pub fn resolve_sheriff_votes(state: &GameState) -> Option<PlayerId> {
    let mut tally: HashMap<PlayerId, f64> = HashMap::new();
    for target in state.sheriff_votes.values() {
        *tally.entry(*target).or_insert(0.0) += 1.0;
    }
    unique_max(&tally)
}

fn unique_max(tally: &HashMap<PlayerId, f64>) -> Option<PlayerId> {
    let max = tally.values().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return None;
    }
    let mut top = tally.iter().filter(|(_, &w)| w == max);
    let (&target, _) = top.next()?;
    if top.next().is_some() {
        None
    } else {
        Some(target)
    }
}

/// Computes the circular day-discussion order. Living players sorted by
/// seat; on day 1 or after a peaceful night the start is random, otherwise
/// it is the first living seat after the lowest-seat victim of the night.
pub fn determine_speech_order<R: Rng + ?Sized>(state: &GameState, rng: &mut R) -> Vec<PlayerId> {
    let mut living: Vec<_> = state
        .living_players()
        .filter_map(|p| p.seat.map(|seat| (seat, p.id)))
        .collect();
    living.sort_unstable_by_key(|&(seat, _)| seat);
    if living.is_empty() {
        return Vec::new();
    }

    let anchor_seat = if state.day == 1 {
        None
    } else {
        state
            .nightly_deaths
            .iter()
            .filter_map(|id| state.player(*id).and_then(|p| p.seat))
            .min()
    };

    let start = match anchor_seat {
        Some(anchor) => living
            .iter()
            .position(|&(seat, _)| seat > anchor)
            .unwrap_or(0),
        None => rng.gen_range(0..living.len()),
    };

    living.rotate_left(start);
    living.into_iter().map(|(_, id)| id).collect()
}

/// Victory check. Wolves eliminated wins for the good faction and takes
/// precedence over a simultaneous god or villager wipe; otherwise a god
/// wipe ("屠神") or villager wipe ("屠民") wins for the wolves.
pub fn check_game_over(state: &GameState) -> Option<Winner> {
    let wolves_alive = state.living_players().any(|p| p.is_wolf());
    if !wolves_alive {
        return Some(Winner::Good);
    }
    let gods_alive = state.living_players().any(|p| p.is_god());
    let villagers_alive = state
        .living_players()
        .any(|p| p.role == Some(Role::Villager));
    if !gods_alive || !villagers_alive {
        return Some(Winner::Wolf);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{NightAction, Player, RoomConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use uuid::Uuid;

    fn fixture(roles: &[Role]) -> (GameState, Vec<PlayerId>) {
        let mut host = Player::new(Uuid::new_v4(), "P0".to_string(), None, true);
        host.seat = Some(0);
        host.role = Some(roles[0]);
        let mut state = GameState::new(
            Uuid::new_v4(),
            host,
            RoomConfig {
                template_name: "暗牌局6人".to_string(),
                is_private: false,
                allow_spectators: false,
            },
        );
        for (i, &role) in roles.iter().enumerate().skip(1) {
            let mut p = Player::new(Uuid::new_v4(), format!("P{i}"), None, false);
            p.seat = Some(i);
            p.role = Some(role);
            state.players.push(p);
        }
        let ids = state.players.iter().map(|p| p.id).collect();
        (state, ids)
    }

    fn dark_deck() -> (GameState, Vec<PlayerId>) {
        // P0=W, P1=W, P2=V, P3=V, P4=Seer, P5=Guard
        fixture(&[
            Role::Werewolf,
            Role::Werewolf,
            Role::Villager,
            Role::Villager,
            Role::Seer,
            Role::Guard,
        ])
    }

    #[test]
    fn wolf_vote_majority() {
        let (mut state, ids) = dark_deck();
        state.werewolf_votes.insert(ids[0], ids[4]);
        state.werewolf_votes.insert(ids[1], ids[4]);
        assert_eq!(resolve_werewolf_votes(&state), WolfVoteOutcome::Target(ids[4]));
    }

    #[test]
    fn wolf_vote_tie_and_empty() {
        let (mut state, ids) = dark_deck();
        assert_eq!(resolve_werewolf_votes(&state), WolfVoteOutcome::NoVotes);
        state.werewolf_votes.insert(ids[0], ids[4]);
        state.werewolf_votes.insert(ids[1], ids[5]);
        assert_eq!(resolve_werewolf_votes(&state), WolfVoteOutcome::Tie);
    }

    #[test]
    fn wolf_vote_ignores_non_wolf_and_dead_voters() {
        let (mut state, ids) = dark_deck();
        state.werewolf_votes.insert(ids[2], ids[4]); // villager
        state.werewolf_votes.insert(ids[1], ids[5]);
        state.player_mut(ids[1]).unwrap().is_alive = false;
        assert_eq!(resolve_werewolf_votes(&state), WolfVoteOutcome::NoVotes);
    }

    // Scenario: simple kill with a guard elsewhere; seer checks a wolf.
    #[test]
    fn night_simple_kill_with_check() {
        let (mut state, ids) = dark_deck();
        state.day = 1;
        state.werewolf_kill_target = Some(ids[4]);
        state.guard_target = Some(ids[5]);
        state.night_actions.insert(
            ids[4],
            NightAction {
                action: NightActionKind::Check,
                target: Some(ids[0]),
            },
        );

        let result = resolve_night(&state);
        assert_eq!(result.dead, vec![ids[4]]);
        assert_eq!(result.saved, None);
        assert_eq!(result.poisoned, None);
        // the seer dies tonight; the check still resolves
        assert_eq!(
            result.checked,
            Some(SeerCheck {
                target_id: ids[0],
                is_wolf: true,
            })
        );
    }

    // Scenario: witch saves the wolf target.
    #[test]
    fn night_witch_save() {
        let (mut state, ids) = fixture(&[
            Role::Werewolf,
            Role::Werewolf,
            Role::Villager,
            Role::Villager,
            Role::Witch,
            Role::Guard,
        ]);
        state.werewolf_kill_target = Some(ids[2]);
        state.witch_save_target = Some(ids[2]);

        let result = resolve_night(&state);
        assert!(result.dead.is_empty());
        assert_eq!(result.saved, Some(ids[2]));
        assert_eq!(result.poisoned, None);
    }

    // Scenario: guard and witch save the same target; both survive.
    #[test]
    fn night_guard_and_save_same_target() {
        let (mut state, ids) = dark_deck();
        state.werewolf_kill_target = Some(ids[3]);
        state.guard_target = Some(ids[3]);
        state.witch_save_target = Some(ids[3]);

        let result = resolve_night(&state);
        assert!(result.dead.is_empty());
        assert_eq!(result.saved, Some(ids[3]));
    }

    #[test]
    fn night_guard_blocks_kill() {
        let (mut state, ids) = dark_deck();
        state.werewolf_kill_target = Some(ids[3]);
        state.guard_target = Some(ids[3]);

        let result = resolve_night(&state);
        assert!(result.dead.is_empty());
        assert_eq!(result.saved, None);
    }

    #[test]
    fn night_poison_kills_through_guard() {
        let (mut state, ids) = dark_deck();
        state.witch_poison_target = Some(ids[3]);
        state.guard_target = Some(ids[3]);

        let result = resolve_night(&state);
        assert_eq!(result.dead, vec![ids[3]]);
        assert_eq!(result.poisoned, Some(ids[3]));
    }

    #[test]
    fn night_poisoned_kill_target_listed_once() {
        let (mut state, ids) = dark_deck();
        state.werewolf_kill_target = Some(ids[2]);
        state.witch_poison_target = Some(ids[2]);

        let result = resolve_night(&state);
        assert_eq!(result.dead, vec![ids[2]]);
    }

    // Scenario: four living voters, two targets tied at 2.
    #[test]
    fn day_vote_tie_exiles_nobody() {
        let (mut state, ids) = dark_deck();
        let (a, b, c, d) = (ids[0], ids[1], ids[2], ids[3]);
        state.day_votes.insert(a, c);
        state.day_votes.insert(b, c);
        state.day_votes.insert(c, a);
        state.day_votes.insert(d, a);

        let result = resolve_day_votes(&state);
        assert_eq!(result.eliminated, None);
        assert_eq!(result.tally[&a], 2.0);
        assert_eq!(result.tally[&c], 2.0);
    }

    // Scenario: sheriff weight breaks what would otherwise be 2 v 3.
    #[test]
    fn day_vote_sheriff_weight() {
        let (mut state, ids) = fixture(&[
            Role::Villager,
            Role::Villager,
            Role::Villager,
            Role::Villager,
            Role::Villager,
            Role::Werewolf,
            Role::Werewolf,
        ]);
        let (p1, p2, p3, p4, p5) = (ids[0], ids[1], ids[2], ids[3], ids[4]);
        let (t1, t2) = (ids[5], ids[6]);
        state.player_mut(p1).unwrap().is_sheriff = true;
        state.day_votes.insert(p1, t1);
        state.day_votes.insert(p2, t1);
        state.day_votes.insert(p3, t2);
        state.day_votes.insert(p4, t2);
        state.day_votes.insert(p5, t2);

        let result = resolve_day_votes(&state);
        assert_eq!(result.tally[&t1], 2.5);
        assert_eq!(result.tally[&t2], 3.0);
        assert_eq!(result.eliminated, Some(t2));
    }

    #[test]
    fn day_vote_unique_max_wins() {
        let (mut state, ids) = dark_deck();
        state.day_votes.insert(ids[1], ids[0]);
        state.day_votes.insert(ids[2], ids[0]);
        state.day_votes.insert(ids[3], ids[1]);

        let result = resolve_day_votes(&state);
        assert_eq!(result.eliminated, Some(ids[0]));
    }

    #[test]
    fn day_vote_revealed_idiot_weighs_nothing() {
        let (mut state, ids) = dark_deck();
        state.player_mut(ids[2]).unwrap().has_voted_out = true;
        state.day_votes.insert(ids[2], ids[0]);
        state.day_votes.insert(ids[3], ids[1]);

        let result = resolve_day_votes(&state);
        // the idiot's ballot contributes nothing, so ids[1] has the only weight
        assert_eq!(result.eliminated, Some(ids[1]));
        assert!(!result.tally.contains_key(&ids[0]));
    }

    #[test]
    fn sheriff_vote_unique_and_tie() {
        let (mut state, ids) = dark_deck();
        state.sheriff_votes.insert(ids[2], ids[0]);
        state.sheriff_votes.insert(ids[3], ids[0]);
        state.sheriff_votes.insert(ids[4], ids[1]);
        assert_eq!(resolve_sheriff_votes(&state), Some(ids[0]));
        state.sheriff_votes.insert(ids[5], ids[1]);
        assert_eq!(resolve_sheriff_votes(&state), None);
    }

    #[test]
    fn speech_order_anchors_after_lowest_victim() {
        let (mut state, ids) = dark_deck();
        state.day = 2;
        state.player_mut(ids[1]).unwrap().is_alive = false;
        state.nightly_deaths = vec![ids[1]];

        let mut rng = StdRng::seed_from_u64(7);
        let order = determine_speech_order(&state, &mut rng);
        // seat 1 died; order starts at seat 2 and wraps, skipping the dead
        assert_eq!(order, vec![ids[2], ids[3], ids[4], ids[5], ids[0]]);
    }

    #[test]
    fn speech_order_wraps_when_highest_seat_dies() {
        let (mut state, ids) = dark_deck();
        state.day = 2;
        state.player_mut(ids[5]).unwrap().is_alive = false;
        state.nightly_deaths = vec![ids[5]];

        let mut rng = StdRng::seed_from_u64(7);
        let order = determine_speech_order(&state, &mut rng);
        assert_eq!(order, vec![ids[0], ids[1], ids[2], ids[3], ids[4]]);
    }

    #[test]
    fn speech_order_peaceful_night_is_circular() {
        let (mut state, ids) = dark_deck();
        state.day = 2;
        let mut rng = StdRng::seed_from_u64(42);
        let order = determine_speech_order(&state, &mut rng);
        assert_eq!(order.len(), 6);
        // circular rotation of the seat order
        let start = ids.iter().position(|id| *id == order[0]).unwrap();
        let expected: Vec<_> = (0..6).map(|i| ids[(start + i) % 6]).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn game_over_wolves_eliminated() {
        let (mut state, ids) = dark_deck();
        state.player_mut(ids[0]).unwrap().is_alive = false;
        state.player_mut(ids[1]).unwrap().is_alive = false;
        assert_eq!(check_game_over(&state), Some(Winner::Good));
    }

    #[test]
    fn game_over_gods_wiped() {
        let (mut state, ids) = dark_deck();
        state.player_mut(ids[4]).unwrap().is_alive = false;
        state.player_mut(ids[5]).unwrap().is_alive = false;
        assert_eq!(check_game_over(&state), Some(Winner::Wolf));
    }

    #[test]
    fn game_over_villagers_wiped() {
        let (mut state, ids) = dark_deck();
        state.player_mut(ids[2]).unwrap().is_alive = false;
        state.player_mut(ids[3]).unwrap().is_alive = false;
        assert_eq!(check_game_over(&state), Some(Winner::Wolf));
    }

    #[test]
    fn game_over_wolf_wipe_beats_simultaneous_god_wipe() {
        let (mut state, ids) = dark_deck();
        for id in [ids[0], ids[1], ids[4], ids[5]] {
            state.player_mut(id).unwrap().is_alive = false;
        }
        assert_eq!(check_game_over(&state), Some(Winner::Good));
    }

    #[test]
    fn game_ongoing() {
        let (mut state, ids) = dark_deck();
        state.player_mut(ids[0]).unwrap().is_alive = false;
        assert_eq!(check_game_over(&state), None);
    }
}
