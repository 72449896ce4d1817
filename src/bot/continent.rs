//! Continent ratings used to pick where the bot expands.
//!
//! A continent rates high when the player already controls much of it and
//! it is cheap to hold: a large bonus, few border territories to guard, and
//! few members overall.

use crate::board::{ContinentId, GameState, PlayerId, TerritoryGraph};

/// Base value of a continent before bonus and border adjustments.
const BASE_VALUE: f64 = 15.0;

/// Value lost per border territory that must be guarded.
const BORDER_PENALTY: f64 = 4.0;

/// How attractive `continent` is for `player`.
///
/// The player's share of troops and of territories inside the continent is
/// averaged, then scaled by `(15 + bonus - 4 * borders) / size`.
pub fn continent_rating(
    state: &GameState,
    graph: &TerritoryGraph,
    player: PlayerId,
    continent: ContinentId,
) -> f64 {
    let members = &graph.continent(continent).members;
    if members.is_empty() {
        return 0.0;
    }

    let (mut troops, mut own_troops, mut own_territories) = (0u32, 0u32, 0u32);
    for &t in members {
        troops += state.troops_at(t);
        if state.is_owned_by(t, player) {
            own_troops += state.troops_at(t);
            own_territories += 1;
        }
    }
    if troops == 0 {
        return 0.0;
    }

    let size = members.len() as f64;
    let control = (own_troops as f64 / troops as f64 + own_territories as f64 / size) / 2.0;
    let borders = graph.continent_borders(continent).len() as f64;
    let value = BASE_VALUE + graph.continent(continent).bonus as f64 - BORDER_PENALTY * borders;
    control * value / size
}

/// Continents the player does not yet hold whole, best rated first.
pub fn rank_continents(
    state: &GameState,
    graph: &TerritoryGraph,
    player: PlayerId,
) -> Vec<(ContinentId, f64)> {
    let mut ranked: Vec<(ContinentId, f64)> = graph
        .continents()
        .map(|(id, _)| id)
        .filter(|&id| !state.owns_continent(player, id, graph))
        .map(|id| (id, continent_rating(state, graph, player, id)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
}
