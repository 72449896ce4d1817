//! Game state representation.
//!
//! Holds the complete in-memory snapshot of a session: players in rotation
//! order, the holding on every territory, the current turn and stage.
//!
//! Ownership is stored per territory rather than per player, so a territory
//! can never appear in two players' mappings. A player's "countries" map is
//! the derived view returned by `territories_of`.

use std::collections::VecDeque;

use super::territory::{ContinentId, TerritoryGraph, TerritoryId};
use crate::error::{EngineError, InvalidMove};
use crate::resolve::stage::Stage;

/// Slot of a player in the turn rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Returns the id as a vector index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A player taking part in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub color: String,
}

/// Owner and troop count of one territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holding {
    pub owner: PlayerId,
    pub troops: u32,
}

/// A won battle whose troop movement has not been chosen yet.
///
/// Until it is resolved, `to` stays with the defender at zero troops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingConquest {
    pub from: TerritoryId,
    pub to: TerritoryId,
}

/// Complete game state at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub game_id: Option<u32>,
    /// Players in rotation order.
    pub players: Vec<Player>,
    /// Holding on each territory, indexed by `TerritoryId`.
    pub holdings: Vec<Option<Holding>>,
    pub current: PlayerId,
    pub stage: Stage,
    /// Reinforcement troops the current player still has to place.
    pub new_troops: u32,
    pub pending: Option<PendingConquest>,
    pub winner: Option<PlayerId>,
    /// Number of turns started so far, counting from 1.
    pub turn: u32,
}

impl GameState {
    /// Creates a state with no holdings, starting the first player's draft.
    pub fn new(players: Vec<Player>, territory_count: usize, new_troops: u32) -> Self {
        GameState {
            game_id: None,
            players,
            holdings: vec![None; territory_count],
            current: PlayerId(0),
            stage: Stage::Draft,
            new_troops,
            pending: None,
            winner: None,
            turn: 1,
        }
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.index()]
    }

    /// Looks up a player slot by name.
    pub fn player_id(&self, name: &str) -> Option<PlayerId> {
        self.players
            .iter()
            .position(|p| p.name == name)
            .map(|i| PlayerId(i as u8))
    }

    /// All player ids in rotation order.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        (0..self.players.len()).map(|i| PlayerId(i as u8))
    }

    pub fn current_player(&self) -> &Player {
        self.player(self.current)
    }

    pub fn holding(&self, territory: TerritoryId) -> Option<Holding> {
        self.holdings[territory.index()]
    }

    /// Returns the owner of a territory, or None if nobody holds it.
    pub fn owner_of(&self, territory: TerritoryId) -> Option<PlayerId> {
        self.holdings[territory.index()].map(|h| h.owner)
    }

    /// Troops on a territory (0 if unowned).
    pub fn troops_at(&self, territory: TerritoryId) -> u32 {
        self.holdings[territory.index()].map_or(0, |h| h.troops)
    }

    pub fn is_owned_by(&self, territory: TerritoryId, player: PlayerId) -> bool {
        self.owner_of(territory) == Some(player)
    }

    /// The player's territory → troops mapping, in territory id order.
    pub fn territories_of(&self, player: PlayerId) -> Vec<(TerritoryId, u32)> {
        self.holdings
            .iter()
            .enumerate()
            .filter_map(|(i, h)| match h {
                Some(h) if h.owner == player => Some((TerritoryId(i as u16), h.troops)),
                _ => None,
            })
            .collect()
    }

    pub fn owned_count(&self, player: PlayerId) -> usize {
        self.holdings
            .iter()
            .filter(|h| matches!(h, Some(h) if h.owner == player))
            .count()
    }

    pub fn total_troops(&self, player: PlayerId) -> u32 {
        self.holdings
            .iter()
            .filter_map(|h| h.filter(|h| h.owner == player).map(|h| h.troops))
            .sum()
    }

    /// A player with no territories is out of the game.
    pub fn is_eliminated(&self, player: PlayerId) -> bool {
        self.owned_count(player) == 0
    }

    /// Returns true if the player holds every member of the continent.
    pub fn owns_continent(
        &self,
        player: PlayerId,
        continent: ContinentId,
        graph: &TerritoryGraph,
    ) -> bool {
        graph
            .continent(continent)
            .members
            .iter()
            .all(|&t| self.is_owned_by(t, player))
    }

    /// Neighbors of `territory` not owned by `player`.
    pub fn rival_neighbors(
        &self,
        territory: TerritoryId,
        player: PlayerId,
        graph: &TerritoryGraph,
    ) -> Vec<TerritoryId> {
        graph
            .neighbors_of(territory)
            .iter()
            .copied()
            .filter(|&n| !self.is_owned_by(n, player))
            .collect()
    }

    /// Territories owned by `player` reachable from `territory` without
    /// leaving the player's holdings. The origin itself is excluded.
    ///
    /// Breadth-first over the subgraph induced by the player's holdings;
    /// the result is sorted by id.
    pub fn connected_owned_territories(
        &self,
        territory: TerritoryId,
        player: PlayerId,
        graph: &TerritoryGraph,
    ) -> Vec<TerritoryId> {
        if !self.is_owned_by(territory, player) {
            return Vec::new();
        }

        let mut visited = vec![false; graph.len()];
        visited[territory.index()] = true;
        let mut queue = VecDeque::from([territory]);
        let mut connected = Vec::new();

        while let Some(current) = queue.pop_front() {
            for &next in graph.neighbors_of(current) {
                if visited[next.index()] || !self.is_owned_by(next, player) {
                    continue;
                }
                visited[next.index()] = true;
                connected.push(next);
                queue.push_back(next);
            }
        }

        connected.sort_unstable();
        connected
    }

    /// Adds troops to a territory for `player`.
    ///
    /// If the territory is held by someone else (or nobody) it changes hands:
    /// the previous holding is replaced and `player` holds it with `amount`.
    pub fn add_troops(&mut self, territory: TerritoryId, player: PlayerId, amount: u32) {
        let slot = &mut self.holdings[territory.index()];
        match slot {
            Some(h) if h.owner == player => h.troops += amount,
            _ => {
                debug_assert!(amount > 0, "a held territory needs at least one troop");
                *slot = Some(Holding {
                    owner: player,
                    troops: amount,
                });
            }
        }
    }

    /// Overwrites the troop count of a held territory, keeping its owner.
    pub fn set_troops(&mut self, territory: TerritoryId, troops: u32) {
        debug_assert!(troops > 0, "a held territory needs at least one troop");
        if let Some(h) = &mut self.holdings[territory.index()] {
            h.troops = troops;
        }
    }

    /// Drops a territory's troops to zero, keeping its owner.
    ///
    /// Only the target of a pending conquest is held with no troops.
    pub fn wipe_out(&mut self, territory: TerritoryId) {
        if let Some(h) = &mut self.holdings[territory.index()] {
            h.troops = 0;
        }
    }

    /// Clears a territory's holding, returning what was there.
    pub fn remove_holding(&mut self, territory: TerritoryId) -> Option<Holding> {
        self.holdings[territory.index()].take()
    }

    /// Moves `amount` troops between two territories of `player`.
    ///
    /// Fails without changing anything unless both ends belong to `player`,
    /// `0 < amount < troops(from)`, and `to` is connected to `from` through
    /// the player's holdings.
    pub fn transfer_troops(
        &mut self,
        from: TerritoryId,
        to: TerritoryId,
        amount: u32,
        player: PlayerId,
        graph: &TerritoryGraph,
    ) -> Result<(), EngineError> {
        if !self.is_owned_by(from, player) {
            return Err(InvalidMove::NotYourTerritory(graph.name(from).to_string()).into());
        }
        if !self.is_owned_by(to, player) {
            return Err(InvalidMove::NotYourTerritory(graph.name(to).to_string()).into());
        }
        let available = self.troops_at(from);
        if amount == 0 || amount >= available {
            return Err(InvalidMove::TroopAmount {
                territory: graph.name(from).to_string(),
                amount,
                available,
            }
            .into());
        }
        if !self.connected_owned_territories(from, player, graph).contains(&to) {
            return Err(InvalidMove::NotConnected {
                from: graph.name(from).to_string(),
                to: graph.name(to).to_string(),
            }
            .into());
        }

        self.set_troops(from, available - amount);
        self.add_troops(to, player, amount);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::board::territory::TerritoryGraph;

    /// A ring A-B-C-D-A plus a spur D-E, all in one continent.
    pub(crate) const RING_JSON: &str = r#"{
        "continents": {"Ring": 2},
        "territories": {
            "A": {"continent": "Ring", "neighbors": ["B", "D"]},
            "B": {"continent": "Ring", "neighbors": ["C"]},
            "C": {"continent": "Ring", "neighbors": ["D"]},
            "D": {"continent": "Ring", "neighbors": ["E"]},
            "E": {"continent": "Ring"}
        }
    }"#;

    pub(crate) fn players(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| Player {
                name: format!("P{}", i + 1),
                color: format!("rgb({},0,0)", i),
            })
            .collect()
    }

    fn ring() -> (TerritoryGraph, GameState) {
        let graph = TerritoryGraph::from_json(RING_JSON).unwrap();
        let mut state = GameState::new(players(2), graph.len(), 0);
        let id = |n: &str| graph.id_of(n).unwrap();
        state.add_troops(id("A"), PlayerId(0), 5);
        state.add_troops(id("B"), PlayerId(0), 1);
        state.add_troops(id("C"), PlayerId(1), 3);
        state.add_troops(id("D"), PlayerId(0), 2);
        state.add_troops(id("E"), PlayerId(0), 4);
        (graph, state)
    }

    #[test]
    fn owner_and_troops() {
        let (graph, state) = ring();
        let c = graph.id_of("C").unwrap();
        assert_eq!(state.owner_of(c), Some(PlayerId(1)));
        assert_eq!(state.troops_at(c), 3);
        assert_eq!(state.owned_count(PlayerId(0)), 4);
        assert_eq!(state.total_troops(PlayerId(0)), 12);
        assert!(!state.is_eliminated(PlayerId(1)));
    }

    #[test]
    fn rival_neighbors_exclude_own_territories() {
        let (graph, state) = ring();
        let id = |n: &str| graph.id_of(n).unwrap();
        assert_eq!(state.rival_neighbors(id("B"), PlayerId(0), &graph), vec![id("C")]);
        assert!(state.rival_neighbors(id("A"), PlayerId(0), &graph).is_empty());
        assert_eq!(
            state.rival_neighbors(id("C"), PlayerId(1), &graph),
            vec![id("B"), id("D")]
        );
    }

    #[test]
    fn connected_owned_goes_around_rivals() {
        let (graph, state) = ring();
        let id = |n: &str| graph.id_of(n).unwrap();
        // B reaches D and E only through A; C belongs to P2.
        assert_eq!(
            state.connected_owned_territories(id("B"), PlayerId(0), &graph),
            vec![id("A"), id("D"), id("E")]
        );
    }

    #[test]
    fn connected_owned_excludes_origin_and_rivals() {
        let (graph, state) = ring();
        let id = |n: &str| graph.id_of(n).unwrap();
        let connected = state.connected_owned_territories(id("A"), PlayerId(0), &graph);
        assert!(!connected.contains(&id("A")));
        assert!(!connected.contains(&id("C")));
        assert!(state
            .connected_owned_territories(id("C"), PlayerId(1), &graph)
            .is_empty());
    }

    #[test]
    fn connected_owned_is_split_by_a_rival() {
        let (graph, mut state) = ring();
        let id = |n: &str| graph.id_of(n).unwrap();
        state.add_troops(id("A"), PlayerId(1), 1);
        assert!(state
            .connected_owned_territories(id("B"), PlayerId(0), &graph)
            .is_empty());
        assert_eq!(
            state.connected_owned_territories(id("E"), PlayerId(0), &graph),
            vec![id("D")]
        );
    }

    #[test]
    fn add_troops_transfers_ownership() {
        let (graph, mut state) = ring();
        let c = graph.id_of("C").unwrap();
        state.add_troops(c, PlayerId(0), 2);
        assert_eq!(state.holding(c), Some(Holding { owner: PlayerId(0), troops: 2 }));
        assert!(state.is_eliminated(PlayerId(1)));
    }

    #[test]
    fn transfer_moves_troops() {
        let (graph, mut state) = ring();
        let id = |n: &str| graph.id_of(n).unwrap();
        state.transfer_troops(id("A"), id("E"), 4, PlayerId(0), &graph).unwrap();
        assert_eq!(state.troops_at(id("A")), 1);
        assert_eq!(state.troops_at(id("E")), 8);
    }

    #[test]
    fn transfer_cannot_empty_the_source() {
        let (graph, mut state) = ring();
        let id = |n: &str| graph.id_of(n).unwrap();
        let before = state.clone();
        for amount in [0, 5, 6] {
            let err = state
                .transfer_troops(id("A"), id("B"), amount, PlayerId(0), &graph)
                .unwrap_err();
            assert!(matches!(
                err,
                EngineError::InvalidMove(InvalidMove::TroopAmount { .. })
            ));
        }
        assert_eq!(state, before);
    }

    #[test]
    fn transfer_requires_connection() {
        let (graph, mut state) = ring();
        let id = |n: &str| graph.id_of(n).unwrap();
        state.add_troops(id("A"), PlayerId(1), 1);
        let before = state.clone();
        let err = state
            .transfer_troops(id("E"), id("B"), 1, PlayerId(0), &graph)
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidMove(InvalidMove::NotConnected { .. })
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn transfer_rejects_foreign_territories() {
        let (graph, mut state) = ring();
        let id = |n: &str| graph.id_of(n).unwrap();
        let err = state
            .transfer_troops(id("C"), id("B"), 1, PlayerId(0), &graph)
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidMove(InvalidMove::NotYourTerritory(_))
        ));
    }

    #[test]
    fn owns_continent_requires_every_member() {
        let (graph, mut state) = ring();
        let ring = graph.continent_of(graph.id_of("A").unwrap());
        assert!(!state.owns_continent(PlayerId(0), ring, &graph));
        state.add_troops(graph.id_of("C").unwrap(), PlayerId(0), 1);
        assert!(state.owns_continent(PlayerId(0), ring, &graph));
    }
}
