//! Turn stage sequencing.
//!
//! A turn runs Draft -> Attack -> Fortify, then control passes to the next
//! player still holding territory, who starts at Draft with a fresh pool.

use std::fmt;

use tracing::info;

use crate::board::{GameState, PlayerId, TerritoryGraph};

/// Default floor on the reinforcement pool.
pub const DEFAULT_MIN_REINFORCEMENT: u32 = 3;

/// Territories per reinforcement troop.
const TERRITORIES_PER_TROOP: usize = 3;

/// The stage within a player's turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Draft,
    Attack,
    Fortify,
}

/// Something that happened during a stage and may move the turn along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    /// The last reinforcement troop was placed.
    PoolExhausted,
    /// The player chose to stop attacking.
    AttackEnded,
    /// The single fortify transfer was made.
    Fortified,
    /// The player ended the fortify stage without moving troops.
    FortifySkipped,
}

/// Result of applying a `StageEvent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The event does not move this stage along.
    Stay(Stage),
    /// The turn continues in a later stage.
    Enter(Stage),
    /// The turn is over; the next player starts drafting.
    EndTurn,
}

impl Stage {
    /// Stage flow:
    /// - Draft   + PoolExhausted             -> Attack
    /// - Attack  + AttackEnded               -> Fortify
    /// - Fortify + Fortified/FortifySkipped  -> end of turn
    pub const fn next(self, event: StageEvent) -> Transition {
        match (self, event) {
            (Stage::Draft, StageEvent::PoolExhausted) => Transition::Enter(Stage::Attack),
            (Stage::Attack, StageEvent::AttackEnded) => Transition::Enter(Stage::Fortify),
            (Stage::Fortify, StageEvent::Fortified | StageEvent::FortifySkipped) => {
                Transition::EndTurn
            }
            (stage, _) => Transition::Stay(stage),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Stage::Draft => "Draft",
            Stage::Attack => "Attack",
            Stage::Fortify => "Fortify",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rule knobs that shape the turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub min_reinforcement: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            min_reinforcement: DEFAULT_MIN_REINFORCEMENT,
        }
    }
}

/// Reinforcement pool for the start of `player`'s turn: one troop per three
/// territories (at least `min_reinforcement`) plus the bonus of every
/// continent held whole.
pub fn reinforcements(
    state: &GameState,
    graph: &TerritoryGraph,
    player: PlayerId,
    rules: &Rules,
) -> u32 {
    let base = (state.owned_count(player) / TERRITORIES_PER_TROOP) as u32;
    let bonus: u32 = graph
        .continents()
        .filter(|(id, _)| state.owns_continent(player, *id, graph))
        .map(|(_, c)| c.bonus)
        .sum();
    base.max(rules.min_reinforcement) + bonus
}

/// The next player in rotation after the current one that still holds
/// territory. Returns None if nobody else does.
pub fn next_player(state: &GameState) -> Option<PlayerId> {
    let n = state.players.len();
    (1..=n)
        .map(|step| PlayerId(((state.current.index() + step) % n) as u8))
        .find(|&p| p != state.current && !state.is_eliminated(p))
}

/// Applies a stage event to the state, ending the turn when the event
/// closes the Fortify stage.
pub fn apply_event(
    state: &mut GameState,
    graph: &TerritoryGraph,
    event: StageEvent,
    rules: &Rules,
) {
    match state.stage.next(event) {
        Transition::Stay(_) => {}
        Transition::Enter(stage) => state.stage = stage,
        Transition::EndTurn => advance_turn(state, graph, rules),
    }
}

/// Passes the turn to the next player and starts their draft.
pub fn advance_turn(state: &mut GameState, graph: &TerritoryGraph, rules: &Rules) {
    if let Some(next) = next_player(state) {
        state.current = next;
    }
    state.stage = Stage::Draft;
    state.pending = None;
    state.turn += 1;
    state.new_troops = reinforcements(state, graph, state.current, rules);
    info!(
        turn = state.turn,
        player = %state.current_player().name,
        new_troops = state.new_troops,
        "turn started"
    );
}
