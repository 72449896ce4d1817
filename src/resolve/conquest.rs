//! Applying battle outcomes to the board.
//!
//! A battle that leaves defenders standing only updates troop counts. A
//! battle that empties the defending territory leaves a pending conquest;
//! `conquer` then moves the chosen number of troops in, transfers
//! ownership, and checks for a winner.

use tracing::info;

use crate::board::{GameState, PlayerId, TerritoryGraph, TerritoryId};
use crate::combat::BattleOutcome;
use crate::error::{EngineError, InvalidMove};

/// Report of a completed conquest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conquest {
    pub territory: TerritoryId,
    pub attacker: PlayerId,
    pub defender: Option<PlayerId>,
    pub troops_moved: u32,
    /// The defender lost their last territory.
    pub defender_eliminated: bool,
    /// Set when the attacker now holds the whole map.
    pub winner: Option<PlayerId>,
}

/// Writes a battle's surviving troops back onto both territories.
///
/// The attacking territory always keeps `attacker_remaining`. The defending
/// territory keeps `defender_remaining` if any survived; an emptied
/// territory stays with the defender at zero troops until `conquer`
/// reassigns it.
pub fn apply_battle(
    state: &mut GameState,
    from: TerritoryId,
    to: TerritoryId,
    outcome: BattleOutcome,
) {
    state.set_troops(from, outcome.attacker_remaining);
    if outcome.is_conquest() {
        state.wipe_out(to);
    } else {
        state.set_troops(to, outcome.defender_remaining);
    }
}

/// Moves `troops_to_move` troops from `from` into the conquered `to`.
///
/// `1 <= troops_to_move <= troops(from) - 1` must hold; otherwise nothing
/// changes. On success the defender loses `to`, the attacker holds it with
/// exactly `troops_to_move`, and a winner is recorded if the attacker now
/// holds every territory.
pub fn conquer(
    state: &mut GameState,
    graph: &TerritoryGraph,
    from: TerritoryId,
    to: TerritoryId,
    troops_to_move: u32,
) -> Result<Conquest, EngineError> {
    let attacker = state
        .owner_of(from)
        .ok_or_else(|| InvalidMove::NotYourTerritory(graph.name(from).to_string()))?;
    let available = state.troops_at(from);
    if troops_to_move == 0 || troops_to_move >= available {
        return Err(InvalidMove::TroopAmount {
            territory: graph.name(from).to_string(),
            amount: troops_to_move,
            available,
        }
        .into());
    }

    let defender = state.remove_holding(to).map(|h| h.owner);
    state.set_troops(from, available - troops_to_move);
    state.add_troops(to, attacker, troops_to_move);

    let defender_eliminated = defender.is_some_and(|d| d != attacker && state.is_eliminated(d));
    info!(
        territory = graph.name(to),
        attacker = %state.player(attacker).name,
        troops = troops_to_move,
        "territory conquered"
    );
    if let Some(d) = defender.filter(|_| defender_eliminated) {
        info!(player = %state.player(d).name, "player eliminated");
    }

    let winner = (state.owned_count(attacker) == graph.len()).then_some(attacker);
    if let Some(w) = winner {
        state.winner = Some(w);
        info!(player = %state.player(w).name, "game won");
    }

    Ok(Conquest {
        territory: to,
        attacker,
        defender,
        troops_moved: troops_to_move,
        defender_eliminated,
        winner,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::state::tests::{players, RING_JSON};
    use crate::board::TerritoryGraph;

    fn duel() -> (TerritoryGraph, GameState) {
        let graph = TerritoryGraph::from_json(RING_JSON).unwrap();
        let mut state = GameState::new(players(2), graph.len(), 0);
        let id = |n: &str| graph.id_of(n).unwrap();
        state.add_troops(id("A"), PlayerId(0), 6);
        state.add_troops(id("B"), PlayerId(0), 1);
        state.add_troops(id("C"), PlayerId(0), 1);
        state.add_troops(id("D"), PlayerId(1), 2);
        state.add_troops(id("E"), PlayerId(1), 1);
        (graph, state)
    }

    #[test]
    fn unconquered_battle_updates_counts_in_place() {
        let (graph, mut state) = duel();
        let id = |n: &str| graph.id_of(n).unwrap();
        let outcome = BattleOutcome { attacker_remaining: 1, defender_remaining: 1 };
        apply_battle(&mut state, id("A"), id("D"), outcome);
        assert_eq!(state.troops_at(id("A")), 1);
        assert_eq!(state.holding(id("D")).map(|h| (h.owner, h.troops)), Some((PlayerId(1), 1)));
    }

    #[test]
    fn conquest_moves_troops_and_ownership() {
        let (graph, mut state) = duel();
        let id = |n: &str| graph.id_of(n).unwrap();
        apply_battle(
            &mut state,
            id("A"),
            id("D"),
            BattleOutcome { attacker_remaining: 5, defender_remaining: 0 },
        );
        assert_eq!(state.holding(id("D")).map(|h| (h.owner, h.troops)), Some((PlayerId(1), 0)));
        let report = conquer(&mut state, &graph, id("A"), id("D"), 3).unwrap();
        assert_eq!(report.defender, Some(PlayerId(1)));
        assert!(!report.defender_eliminated);
        assert_eq!(report.winner, None);
        assert_eq!(state.troops_at(id("A")), 2);
        assert_eq!(state.owner_of(id("D")), Some(PlayerId(0)));
        assert_eq!(state.troops_at(id("D")), 3);
        assert!(!state.territories_of(PlayerId(1)).iter().any(|(t, _)| *t == id("D")));
    }

    #[test]
    fn troops_to_move_must_leave_one_behind() {
        let (graph, mut state) = duel();
        let id = |n: &str| graph.id_of(n).unwrap();
        let before = state.clone();
        for amount in [0, 6, 7] {
            let err = conquer(&mut state, &graph, id("A"), id("D"), amount).unwrap_err();
            assert!(matches!(
                err,
                EngineError::InvalidMove(InvalidMove::TroopAmount { .. })
            ));
        }
        assert_eq!(state, before);
    }

    #[test]
    fn taking_the_last_territory_wins() {
        let (graph, mut state) = duel();
        let id = |n: &str| graph.id_of(n).unwrap();
        conquer(&mut state, &graph, id("A"), id("D"), 2).unwrap();
        let report = conquer(&mut state, &graph, id("D"), id("E"), 1).unwrap();
        assert!(report.defender_eliminated);
        assert_eq!(report.winner, Some(PlayerId(0)));
        assert_eq!(state.winner, Some(PlayerId(0)));
        assert!(state.is_eliminated(PlayerId(1)));
    }
}
