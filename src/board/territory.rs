//! Territory graph: names, continents, and undirected adjacency.
//!
//! Territories are addressed by a dense `TerritoryId` assigned at load time,
//! so per-territory data elsewhere in the engine lives in plain vectors
//! indexed by `TerritoryId::index()`. The graph is immutable once built.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Deserialize;

use crate::error::EngineError;

/// Dense index of a territory within a `TerritoryGraph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerritoryId(pub u16);

impl TerritoryId {
    /// Returns the id as a vector index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Dense index of a continent within a `TerritoryGraph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContinentId(pub u8);

impl ContinentId {
    /// Returns the id as a vector index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single territory on the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Territory {
    pub name: String,
    pub continent: ContinentId,
    /// Sorted, deduplicated neighbor ids.
    pub neighbors: Vec<TerritoryId>,
}

/// A continent and the reinforcement bonus for holding all of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continent {
    pub name: String,
    pub bonus: u32,
    pub members: Vec<TerritoryId>,
}

/// Reference data as it appears in a map file.
///
/// `territories` maps a territory name to its continent and neighbor names.
/// `continents` optionally lists continent bonuses; when it is empty the
/// continents are taken from the territories with a bonus of zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapData {
    #[serde(default)]
    pub continents: BTreeMap<String, u32>,
    pub territories: BTreeMap<String, TerritoryData>,
}

/// One territory entry of a map file.
#[derive(Debug, Clone, Deserialize)]
pub struct TerritoryData {
    pub continent: String,
    #[serde(default)]
    pub neighbors: Vec<String>,
}

/// Errors that can occur while building a territory graph.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("map has no territories")]
    Empty,

    #[error("map has {0} territories, more than an id can address")]
    TooLarge(usize),

    #[error("duplicate territory name: '{0}'")]
    DuplicateTerritory(String),

    #[error("territory '{territory}' names unknown continent '{continent}'")]
    UnknownContinent { territory: String, continent: String },

    #[error("territory '{territory}' names unknown neighbor '{neighbor}'")]
    UnknownNeighbor { territory: String, neighbor: String },

    #[error("territory '{0}' lists itself as a neighbor")]
    SelfLoop(String),

    #[error("malformed map JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Immutable territory graph for one session.
#[derive(Debug, Clone)]
pub struct TerritoryGraph {
    territories: Vec<Territory>,
    continents: Vec<Continent>,
    by_name: HashMap<String, TerritoryId>,
}

impl TerritoryGraph {
    /// Builds a graph from ordered parts.
    ///
    /// Territory ids follow the order of `territories`, continent ids the
    /// order of `continents`. Every edge is stored in both directions.
    pub fn from_parts<'a, C, T, E>(
        continents: C,
        territories: T,
        borders: E,
    ) -> Result<Self, MapError>
    where
        C: IntoIterator<Item = (&'a str, u32)>,
        T: IntoIterator<Item = (&'a str, &'a str)>,
        E: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut continent_list: Vec<Continent> = continents
            .into_iter()
            .map(|(name, bonus)| Continent {
                name: name.to_string(),
                bonus,
                members: Vec::new(),
            })
            .collect();
        let derive_continents = continent_list.is_empty();

        let mut territory_list: Vec<Territory> = Vec::new();
        let mut by_name = HashMap::new();
        for (name, continent) in territories {
            if territory_list.len() > u16::MAX as usize {
                return Err(MapError::TooLarge(territory_list.len()));
            }
            let id = TerritoryId(territory_list.len() as u16);
            if by_name.insert(name.to_string(), id).is_some() {
                return Err(MapError::DuplicateTerritory(name.to_string()));
            }

            let continent_idx = match continent_list.iter().position(|c| c.name == continent) {
                Some(idx) => idx,
                None if derive_continents => {
                    continent_list.push(Continent {
                        name: continent.to_string(),
                        bonus: 0,
                        members: Vec::new(),
                    });
                    continent_list.len() - 1
                }
                None => {
                    return Err(MapError::UnknownContinent {
                        territory: name.to_string(),
                        continent: continent.to_string(),
                    })
                }
            };
            continent_list[continent_idx].members.push(id);
            territory_list.push(Territory {
                name: name.to_string(),
                continent: ContinentId(continent_idx as u8),
                neighbors: Vec::new(),
            });
        }

        if territory_list.is_empty() {
            return Err(MapError::Empty);
        }

        for (a, b) in borders {
            let from = *by_name.get(a).ok_or_else(|| MapError::UnknownNeighbor {
                territory: b.to_string(),
                neighbor: a.to_string(),
            })?;
            let to = *by_name.get(b).ok_or_else(|| MapError::UnknownNeighbor {
                territory: a.to_string(),
                neighbor: b.to_string(),
            })?;
            if from == to {
                return Err(MapError::SelfLoop(a.to_string()));
            }
            territory_list[from.index()].neighbors.push(to);
            territory_list[to.index()].neighbors.push(from);
        }

        for territory in &mut territory_list {
            territory.neighbors.sort_unstable();
            territory.neighbors.dedup();
        }

        Ok(TerritoryGraph {
            territories: territory_list,
            continents: continent_list,
            by_name,
        })
    }

    /// Builds a graph from deserialized map data. Ids follow name order.
    pub fn from_map_data(data: &MapData) -> Result<Self, MapError> {
        let borders = data.territories.iter().flat_map(|(name, entry)| {
            entry
                .neighbors
                .iter()
                .map(move |neighbor| (name.as_str(), neighbor.as_str()))
        });
        Self::from_parts(
            data.continents.iter().map(|(name, bonus)| (name.as_str(), *bonus)),
            data.territories
                .iter()
                .map(|(name, entry)| (name.as_str(), entry.continent.as_str())),
            borders,
        )
    }

    /// Parses a JSON map file and builds the graph.
    pub fn from_json(json: &str) -> Result<Self, MapError> {
        let data: MapData = serde_json::from_str(json)?;
        Self::from_map_data(&data)
    }

    /// Number of territories on the map.
    pub fn len(&self) -> usize {
        self.territories.len()
    }

    /// True if the map has no territories (never the case for a built graph).
    pub fn is_empty(&self) -> bool {
        self.territories.is_empty()
    }

    /// All territory ids in index order.
    pub fn ids(&self) -> impl Iterator<Item = TerritoryId> + '_ {
        (0..self.territories.len()).map(|i| TerritoryId(i as u16))
    }

    /// Returns the territory record for an id.
    pub fn territory(&self, id: TerritoryId) -> &Territory {
        &self.territories[id.index()]
    }

    /// Returns the display name of a territory.
    pub fn name(&self, id: TerritoryId) -> &str {
        &self.territories[id.index()].name
    }

    /// Looks up a territory by name.
    pub fn id_of(&self, name: &str) -> Result<TerritoryId, EngineError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| EngineError::UnknownTerritory(name.to_string()))
    }

    /// Neighbors of a territory.
    pub fn neighbors_of(&self, id: TerritoryId) -> &[TerritoryId] {
        &self.territories[id.index()].neighbors
    }

    /// Returns true if the two territories share a border.
    pub fn is_adjacent(&self, a: TerritoryId, b: TerritoryId) -> bool {
        self.neighbors_of(a).binary_search(&b).is_ok()
    }

    /// Continent a territory belongs to.
    pub fn continent_of(&self, id: TerritoryId) -> ContinentId {
        self.territories[id.index()].continent
    }

    pub fn continent(&self, id: ContinentId) -> &Continent {
        &self.continents[id.index()]
    }

    pub fn continents(&self) -> impl Iterator<Item = (ContinentId, &Continent)> + '_ {
        self.continents
            .iter()
            .enumerate()
            .map(|(i, c)| (ContinentId(i as u8), c))
    }

    /// Members of a continent with at least one neighbor outside it.
    pub fn continent_borders(&self, id: ContinentId) -> Vec<TerritoryId> {
        self.continents[id.index()]
            .members
            .iter()
            .copied()
            .filter(|&t| self.neighbors_of(t).iter().any(|&n| self.continent_of(n) != id))
            .collect()
    }
}

impl fmt::Display for TerritoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE_JSON: &str = r#"{
        "continents": {"North": 2, "South": 1},
        "territories": {
            "A": {"continent": "North", "neighbors": ["B"]},
            "B": {"continent": "North", "neighbors": ["C"]},
            "C": {"continent": "South", "neighbors": ["A"]}
        }
    }"#;

    #[test]
    fn json_map_is_symmetrised() {
        let graph = TerritoryGraph::from_json(TRIANGLE_JSON).unwrap();
        let a = graph.id_of("A").unwrap();
        let b = graph.id_of("B").unwrap();
        let c = graph.id_of("C").unwrap();
        assert_eq!(graph.neighbors_of(a), &[b, c]);
        assert_eq!(graph.neighbors_of(b), &[a, c]);
        assert_eq!(graph.neighbors_of(c), &[a, b]);
        assert!(graph.is_adjacent(c, a));
    }

    #[test]
    fn continents_carry_bonus_and_members() {
        let graph = TerritoryGraph::from_json(TRIANGLE_JSON).unwrap();
        let a = graph.id_of("A").unwrap();
        let c = graph.id_of("C").unwrap();
        let north = graph.continent(graph.continent_of(a));
        assert_eq!(north.name, "North");
        assert_eq!(north.bonus, 2);
        assert_eq!(north.members.len(), 2);
        assert_eq!(graph.continent(graph.continent_of(c)).bonus, 1);
    }

    #[test]
    fn continents_are_derived_when_not_listed() {
        let json = r#"{"territories": {
            "X": {"continent": "Isle", "neighbors": ["Y"]},
            "Y": {"continent": "Isle"}
        }}"#;
        let graph = TerritoryGraph::from_json(json).unwrap();
        let (_, isle) = graph.continents().next().unwrap();
        assert_eq!(isle.name, "Isle");
        assert_eq!(isle.bonus, 0);
    }

    #[test]
    fn unknown_neighbor_is_rejected() {
        let json = r#"{"territories": {"X": {"continent": "I", "neighbors": ["Nowhere"]}}}"#;
        let err = TerritoryGraph::from_json(json).unwrap_err();
        assert!(matches!(err, MapError::UnknownNeighbor { .. }));
    }

    #[test]
    fn unknown_continent_is_rejected() {
        let json = r#"{"continents": {"Known": 1},
            "territories": {"X": {"continent": "Other"}}}"#;
        let err = TerritoryGraph::from_json(json).unwrap_err();
        assert!(matches!(err, MapError::UnknownContinent { .. }));
    }

    #[test]
    fn self_loop_is_rejected() {
        let json = r#"{"territories": {"X": {"continent": "I", "neighbors": ["X"]}}}"#;
        let err = TerritoryGraph::from_json(json).unwrap_err();
        assert!(matches!(err, MapError::SelfLoop(_)));
    }

    #[test]
    fn empty_map_is_rejected() {
        let err = TerritoryGraph::from_json(r#"{"territories": {}}"#).unwrap_err();
        assert!(matches!(err, MapError::Empty));
    }

    #[test]
    fn unknown_name_lookup_fails() {
        let graph = TerritoryGraph::from_json(TRIANGLE_JSON).unwrap();
        assert_eq!(
            graph.id_of("D"),
            Err(EngineError::UnknownTerritory("D".to_string()))
        );
    }

    #[test]
    fn borders_are_members_touching_other_continents() {
        let graph = TerritoryGraph::from_json(TRIANGLE_JSON).unwrap();
        let north = graph.continent_of(graph.id_of("A").unwrap());
        // Both A and B touch C in the South.
        assert_eq!(graph.continent_borders(north).len(), 2);
    }
}
