//! Player actions for the current turn.
//!
//! These are the only entry points that mutate a `GameState` during play.
//! Each one checks the stage, the territories involved, and the troop
//! amount before touching anything, so a rejected action leaves the state
//! exactly as it was.

use tracing::debug;

use super::conquest::{apply_battle, conquer, Conquest};
use super::stage::{apply_event, Rules, Stage, StageEvent};
use crate::board::{GameState, PendingConquest, PlayerId, TerritoryGraph, TerritoryId};
use crate::combat::{resolve_battle, BattleOutcome, DiceRoller};
use crate::error::{EngineError, InvalidMove};

/// What an attack did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackReport {
    pub from: TerritoryId,
    pub to: TerritoryId,
    pub outcome: BattleOutcome,
}

impl AttackReport {
    /// True if the defenders were wiped out and troops must be moved in.
    pub const fn awaits_conquest(&self) -> bool {
        self.outcome.is_conquest()
    }
}

/// Rejects actions by anyone other than the current player.
pub fn ensure_turn(state: &GameState, actor: &str) -> Result<PlayerId, EngineError> {
    match state.player_id(actor) {
        Some(id) if id == state.current => Ok(id),
        _ => Err(InvalidMove::NotYourTurn(actor.to_string()).into()),
    }
}

/// Common preconditions: game running, no conquest waiting, right stage.
fn ensure_stage(
    state: &GameState,
    graph: &TerritoryGraph,
    expected: Stage,
) -> Result<(), EngineError> {
    if state.winner.is_some() {
        return Err(InvalidMove::GameOver.into());
    }
    if let Some(p) = state.pending {
        return Err(InvalidMove::ConquestPending(graph.name(p.to).to_string()).into());
    }
    if state.stage != expected {
        return Err(InvalidMove::WrongStage {
            expected,
            actual: state.stage,
        }
        .into());
    }
    Ok(())
}

fn ensure_owned(
    state: &GameState,
    graph: &TerritoryGraph,
    territory: TerritoryId,
) -> Result<(), EngineError> {
    if state.is_owned_by(territory, state.current) {
        Ok(())
    } else {
        Err(InvalidMove::NotYourTerritory(graph.name(territory).to_string()).into())
    }
}

/// Places one reinforcement troop. The last troop moves the turn to Attack.
pub fn place_troop(
    state: &mut GameState,
    graph: &TerritoryGraph,
    territory: TerritoryId,
    rules: &Rules,
) -> Result<(), EngineError> {
    ensure_stage(state, graph, Stage::Draft)?;
    ensure_owned(state, graph, territory)?;
    if state.new_troops == 0 {
        return Err(InvalidMove::NoTroopsLeft.into());
    }

    state.add_troops(territory, state.current, 1);
    state.new_troops -= 1;
    debug!(territory = graph.name(territory), left = state.new_troops, "troop placed");
    if state.new_troops == 0 {
        apply_event(state, graph, StageEvent::PoolExhausted, rules);
    }
    Ok(())
}

/// Attacks a rival neighbor and applies the battle result.
///
/// If the defenders are wiped out the conquest is left pending until
/// `apply_battle_outcome` says how many troops move in.
pub fn attack<D: DiceRoller + ?Sized>(
    state: &mut GameState,
    graph: &TerritoryGraph,
    from: TerritoryId,
    to: TerritoryId,
    dice: &mut D,
) -> Result<AttackReport, EngineError> {
    ensure_stage(state, graph, Stage::Attack)?;
    ensure_owned(state, graph, from)?;
    if !state.rival_neighbors(from, state.current, graph).contains(&to) {
        return Err(InvalidMove::NotRivalNeighbor {
            from: graph.name(from).to_string(),
            to: graph.name(to).to_string(),
        }
        .into());
    }
    if state.troops_at(from) < 2 {
        return Err(InvalidMove::TooFewTroops(graph.name(from).to_string()).into());
    }

    let outcome = resolve_battle(state.troops_at(from), state.troops_at(to), dice);
    debug!(
        from = graph.name(from),
        to = graph.name(to),
        attacker = outcome.attacker_remaining,
        defender = outcome.defender_remaining,
        "battle resolved"
    );
    apply_battle(state, from, to, outcome);
    if outcome.is_conquest() {
        state.pending = Some(PendingConquest { from, to });
    }
    Ok(AttackReport { from, to, outcome })
}

/// Completes a pending conquest by moving `troops_to_move` troops in.
pub fn apply_battle_outcome(
    state: &mut GameState,
    graph: &TerritoryGraph,
    troops_to_move: u32,
) -> Result<Conquest, EngineError> {
    if state.winner.is_some() {
        return Err(InvalidMove::GameOver.into());
    }
    let pending = state.pending.ok_or(InvalidMove::NoPendingConquest)?;
    let report = conquer(state, graph, pending.from, pending.to, troops_to_move)?;
    state.pending = None;
    Ok(report)
}

/// Ends the attack stage and moves on to Fortify.
pub fn end_attack_stage(
    state: &mut GameState,
    graph: &TerritoryGraph,
    rules: &Rules,
) -> Result<(), EngineError> {
    ensure_stage(state, graph, Stage::Attack)?;
    apply_event(state, graph, StageEvent::AttackEnded, rules);
    Ok(())
}

/// Makes the turn's single fortify transfer, then ends the turn.
pub fn fortify(
    state: &mut GameState,
    graph: &TerritoryGraph,
    from: TerritoryId,
    to: TerritoryId,
    amount: u32,
    rules: &Rules,
) -> Result<(), EngineError> {
    ensure_stage(state, graph, Stage::Fortify)?;
    state.transfer_troops(from, to, amount, state.current, graph)?;
    debug!(from = graph.name(from), to = graph.name(to), amount, "fortified");
    apply_event(state, graph, StageEvent::Fortified, rules);
    Ok(())
}

/// Ends the turn without a fortify transfer.
pub fn end_fortify_stage(
    state: &mut GameState,
    graph: &TerritoryGraph,
    rules: &Rules,
) -> Result<(), EngineError> {
    ensure_stage(state, graph, Stage::Fortify)?;
    apply_event(state, graph, StageEvent::FortifySkipped, rules);
    Ok(())
}
