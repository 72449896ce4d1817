//! Heuristic player.
//!
//! Plays the current player's turn from whatever stage it is in: drafts the
//! whole pool onto one frontier territory facing the best-rated continent,
//! attacks while the estimated odds clear a threshold, moves every spare
//! troop into each conquest, and finally pulls the largest interior stack
//! up to the most threatened frontier.
//!
//! All moves go through the same validated actions a human player uses.

pub mod continent;
pub mod path;

pub use continent::{continent_rating, rank_continents};
pub use path::{path_to_rival, RivalPath};

use rand::Rng;
use tracing::debug;

use crate::board::{ContinentId, GameState, PlayerId, TerritoryGraph, TerritoryId};
use crate::combat::OddsTable;
use crate::error::EngineError;
use crate::resolve::{
    apply_battle_outcome, attack, end_attack_stage, end_fortify_stage, fortify, place_troop,
    AttackReport, Conquest, Rules, Stage,
};

/// Default minimum win probability before the bot attacks.
pub const DEFAULT_ATTACK_THRESHOLD: f64 = 0.6;

/// Tunables for the heuristic player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotConfig {
    pub attack_threshold: f64,
}

impl Default for BotConfig {
    fn default() -> Self {
        BotConfig {
            attack_threshold: DEFAULT_ATTACK_THRESHOLD,
        }
    }
}

/// One step the bot took, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotAction {
    Place { territory: TerritoryId, troops: u32 },
    Attack(AttackReport),
    Conquer(Conquest),
    EndAttack,
    Fortify { from: TerritoryId, to: TerritoryId, troops: u32 },
    EndTurn,
}

/// Plays out the current player's turn and returns what was done.
///
/// Stops early if the game is won mid-turn.
pub fn play_turn<R: Rng + ?Sized>(
    state: &mut GameState,
    graph: &TerritoryGraph,
    rules: &Rules,
    config: &BotConfig,
    odds: &mut OddsTable,
    rng: &mut R,
) -> Result<Vec<BotAction>, EngineError> {
    let mut actions = Vec::new();
    let player = state.current;

    if let Some(pending) = state.pending {
        let troops = state.troops_at(pending.from) - 1;
        actions.push(BotAction::Conquer(apply_battle_outcome(state, graph, troops)?));
    }
    if state.winner.is_some() {
        return Ok(actions);
    }

    if state.stage == Stage::Draft {
        draft(state, graph, rules, player, &mut actions)?;
    }
    if state.stage == Stage::Attack {
        attack_while_favorable(state, graph, config, odds, rng, player, &mut actions)?;
        if state.winner.is_some() {
            return Ok(actions);
        }
        end_attack_stage(state, graph, rules)?;
        actions.push(BotAction::EndAttack);
    }
    if state.stage == Stage::Fortify {
        match fortify_move(state, graph, player) {
            Some((from, to, troops)) => {
                fortify(state, graph, from, to, troops, rules)?;
                actions.push(BotAction::Fortify { from, to, troops });
            }
            None => end_fortify_stage(state, graph, rules)?,
        }
        actions.push(BotAction::EndTurn);
    }
    Ok(actions)
}

/// Continent the bot is currently trying to take.
fn target_continent(
    state: &GameState,
    graph: &TerritoryGraph,
    player: PlayerId,
) -> Option<ContinentId> {
    rank_continents(state, graph, player).first().map(|&(id, _)| id)
}

fn is_frontier(
    state: &GameState,
    graph: &TerritoryGraph,
    t: TerritoryId,
    player: PlayerId,
) -> bool {
    graph.neighbors_of(t).iter().any(|&n| !state.is_owned_by(n, player))
}

/// Owned territory to reinforce: the one with the cheapest conquest route
/// into the target continent after counting its own troops.
fn draft_target(
    state: &GameState,
    graph: &TerritoryGraph,
    player: PlayerId,
) -> Option<TerritoryId> {
    let frontier: Vec<TerritoryId> = state
        .territories_of(player)
        .into_iter()
        .map(|(t, _)| t)
        .filter(|&t| is_frontier(state, graph, t, player))
        .collect();

    let targets: Vec<TerritoryId> = target_continent(state, graph, player)
        .map(|c| {
            graph
                .continent(c)
                .members
                .iter()
                .copied()
                .filter(|&t| !state.is_owned_by(t, player))
                .collect()
        })
        .unwrap_or_default();

    let routed = frontier
        .iter()
        .flat_map(|&f| targets.iter().map(move |&t| (f, t)))
        .filter_map(|(f, t)| {
            path_to_rival(state, graph, f, t)
                .map(|p| (f, p.troops_to_defeat as i64 - state.troops_at(f) as i64))
        })
        .min_by_key(|&(f, score)| (score, f))
        .map(|(f, _)| f);

    routed
        .or_else(|| frontier.iter().copied().max_by_key(|&t| (state.troops_at(t), t)))
        .or_else(|| state.territories_of(player).first().map(|&(t, _)| t))
}

fn draft(
    state: &mut GameState,
    graph: &TerritoryGraph,
    rules: &Rules,
    player: PlayerId,
    actions: &mut Vec<BotAction>,
) -> Result<(), EngineError> {
    let Some(territory) = draft_target(state, graph, player) else {
        return Ok(());
    };
    let troops = state.new_troops;
    for _ in 0..troops {
        place_troop(state, graph, territory, rules)?;
    }
    debug!(territory = graph.name(territory), troops, "bot drafted");
    actions.push(BotAction::Place { territory, troops });
    Ok(())
}

/// Best attack on the board, preferring targets in the target continent.
fn choose_attack(
    state: &GameState,
    graph: &TerritoryGraph,
    config: &BotConfig,
    odds: &mut OddsTable,
    player: PlayerId,
) -> Option<(TerritoryId, TerritoryId)> {
    let focus = target_continent(state, graph, player);
    let mut best: Option<((bool, f64), TerritoryId, TerritoryId)> = None;

    for (from, troops) in state.territories_of(player) {
        if troops < 2 {
            continue;
        }
        for to in state.rival_neighbors(from, player, graph) {
            let p = odds.win_probability(troops, state.troops_at(to));
            if p < config.attack_threshold {
                continue;
            }
            let key = (Some(graph.continent_of(to)) == focus, p);
            let better = match &best {
                None => true,
                Some((k, _, _)) => key.0 > k.0 || (key.0 == k.0 && key.1 > k.1),
            };
            if better {
                best = Some((key, from, to));
            }
        }
    }
    best.map(|(_, from, to)| (from, to))
}

fn attack_while_favorable<R: Rng + ?Sized>(
    state: &mut GameState,
    graph: &TerritoryGraph,
    config: &BotConfig,
    odds: &mut OddsTable,
    rng: &mut R,
    player: PlayerId,
    actions: &mut Vec<BotAction>,
) -> Result<(), EngineError> {
    while let Some((from, to)) = choose_attack(state, graph, config, odds, player) {
        let report = attack(state, graph, from, to, rng)?;
        actions.push(BotAction::Attack(report));
        if report.awaits_conquest() {
            let troops = state.troops_at(from) - 1;
            let conquest = apply_battle_outcome(state, graph, troops)?;
            actions.push(BotAction::Conquer(conquest));
            if conquest.winner.is_some() {
                break;
            }
        }
    }
    Ok(())
}

/// Largest interior stack moved to the connected frontier territory facing
/// the most rival troops.
fn fortify_move(
    state: &GameState,
    graph: &TerritoryGraph,
    player: PlayerId,
) -> Option<(TerritoryId, TerritoryId, u32)> {
    let (from, troops) = state
        .territories_of(player)
        .into_iter()
        .filter(|&(t, troops)| troops > 1 && !is_frontier(state, graph, t, player))
        .max_by_key(|&(t, troops)| (troops, std::cmp::Reverse(t)))?;

    let threat = |t: TerritoryId| -> u32 {
        state
            .rival_neighbors(t, player, graph)
            .iter()
            .map(|&n| state.troops_at(n))
            .sum()
    };
    let to = state
        .connected_owned_territories(from, player, graph)
        .into_iter()
        .filter(|&t| is_frontier(state, graph, t, player))
        .max_by_key(|&t| (threat(t), std::cmp::Reverse(t)))?;
    Some((from, to, troops - 1))
}
