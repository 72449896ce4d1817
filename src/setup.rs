//! Initial territory distribution for a new game.
//!
//! Territories are shuffled and split into near-equal contiguous slices, one
//! per player. Every territory starts with one troop; the rest of each
//! player's starting troops are dropped one at a time on random holdings.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::board::{GameState, Player, PlayerId, TerritoryGraph, TerritoryId};
use crate::resolve::{reinforcements, Rules};

/// Default starting troops per player.
pub const DEFAULT_INITIAL_TROOPS: u32 = 35;

/// Player colors, handed out in shuffled order.
pub const PLAYER_COLORS: [&str; 6] = [
    "rgb(58,118,207)",
    "rgb(100,61,166)",
    "rgb(42,175,157)",
    "rgb(108,126,83)",
    "rgb(55,101,206)",
    "rgb(34,135,174)",
];

/// Errors that can occur while dealing a new game.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("need at least 2 players, got {0}")]
    TooFewPlayers(usize),

    #[error("at most {max} players are supported, got {got}")]
    TooManyPlayers { got: usize, max: usize },

    #[error("duplicate player name: '{0}'")]
    DuplicatePlayer(String),

    #[error("{players} players cannot share {territories} territories")]
    MapTooSmall { players: usize, territories: usize },
}

/// Deals a new game and starts the first player's draft.
pub fn deal<R: Rng + ?Sized>(
    names: &[String],
    graph: &TerritoryGraph,
    initial_troops: u32,
    rules: &Rules,
    rng: &mut R,
) -> Result<GameState, SetupError> {
    if names.len() < 2 {
        return Err(SetupError::TooFewPlayers(names.len()));
    }
    if names.len() > PLAYER_COLORS.len() {
        return Err(SetupError::TooManyPlayers {
            got: names.len(),
            max: PLAYER_COLORS.len(),
        });
    }
    if let Some(dup) = names
        .iter()
        .enumerate()
        .find(|(i, n)| names[..*i].contains(*n))
        .map(|(_, n)| n)
    {
        return Err(SetupError::DuplicatePlayer(dup.clone()));
    }
    if graph.len() < names.len() {
        return Err(SetupError::MapTooSmall {
            players: names.len(),
            territories: graph.len(),
        });
    }

    let mut colors = PLAYER_COLORS.to_vec();
    colors.shuffle(rng);
    let players = names
        .iter()
        .zip(colors)
        .map(|(name, color)| Player {
            name: name.clone(),
            color: color.to_string(),
        })
        .collect();
    let mut state = GameState::new(players, graph.len(), 0);

    let mut territories: Vec<TerritoryId> = graph.ids().collect();
    territories.shuffle(rng);
    let n = names.len();
    for slot in 0..n {
        let player = PlayerId(slot as u8);
        let share = &territories[slot * territories.len() / n..(slot + 1) * territories.len() / n];
        for &t in share {
            state.add_troops(t, player, 1);
        }
        let extra = initial_troops.saturating_sub(share.len() as u32);
        for _ in 0..extra {
            if let Some(&t) = share.choose(rng) {
                state.add_troops(t, player, 1);
            }
        }
    }

    state.new_troops = reinforcements(&state, graph, state.current, rules);
    info!(players = n, territories = graph.len(), "new game dealt");
    Ok(state)
}
