//! Cheapest conquest route to a rival territory.
//!
//! Dijkstra over the territories not held by the mover, where entering a
//! territory costs the troops standing on it. The mover's own territories
//! are never crossed: a route must be conquered step by step.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::board::{GameState, TerritoryGraph, TerritoryId};

/// A conquest route out of an owned territory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RivalPath {
    /// Territories to conquer in order; the last one is the target.
    pub steps: Vec<TerritoryId>,
    /// Sum of the defending troops along the route.
    pub troops_to_defeat: u32,
}

/// Finds the cheapest route from the owned territory `from` to `target`.
///
/// Returns None if `from` is unowned, if `target` belongs to the same
/// player, or if no route through rival territory exists.
pub fn path_to_rival(
    state: &GameState,
    graph: &TerritoryGraph,
    from: TerritoryId,
    target: TerritoryId,
) -> Option<RivalPath> {
    let mover = state.owner_of(from)?;
    if from == target || state.is_owned_by(target, mover) {
        return None;
    }

    let mut distance = vec![u32::MAX; graph.len()];
    let mut previous: Vec<Option<TerritoryId>> = vec![None; graph.len()];
    let mut heap = BinaryHeap::new();
    distance[from.index()] = 0;
    heap.push(Reverse((0u32, from)));

    while let Some(Reverse((cost, current))) = heap.pop() {
        if cost > distance[current.index()] {
            continue;
        }
        if current == target {
            break;
        }
        for &next in graph.neighbors_of(current) {
            if state.is_owned_by(next, mover) {
                continue;
            }
            let next_cost = cost + state.troops_at(next);
            if next_cost < distance[next.index()] {
                distance[next.index()] = next_cost;
                previous[next.index()] = Some(current);
                heap.push(Reverse((next_cost, next)));
            }
        }
    }

    if distance[target.index()] == u32::MAX {
        return None;
    }

    let mut steps = vec![target];
    let mut cursor = target;
    while let Some(prev) = previous[cursor.index()] {
        if prev == from {
            break;
        }
        steps.push(prev);
        cursor = prev;
    }
    steps.reverse();

    Some(RivalPath {
        steps,
        troops_to_defeat: distance[target.index()],
    })
}
