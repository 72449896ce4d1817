//! Game-state snapshots exchanged with the authoritative peer.
//!
//! A snapshot is a JSON object of the form
//!
//! ```json
//! {"gameId": 1, "currentPlayer": "Ann",
//!  "players": {"Ann": {"color": "rgb(58,118,207)", "countries": {"Peru": 3}}},
//!  "newTroops": 3}
//! ```
//!
//! It always carries the whole state; there are no partial updates. Turn
//! rotation follows the lexical order of player names, since the JSON
//! object itself is unordered.
//!
//! Between a won battle and the troop movement into the emptied territory,
//! the snapshot lists that territory under its defender with 0 troops and
//! names it in `pendingConquest`:
//!
//! ```json
//! "pendingConquest": {"from": "Peru", "to": "Venezuela"}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::{GameState, Holding, PendingConquest, Player, PlayerId, TerritoryGraph};
use crate::resolve::Stage;

/// Errors that can occur while decoding a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("malformed snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot lists no players")]
    NoPlayers,

    #[error("snapshot lists {0} players, more than a slot can address")]
    TooManyPlayers(usize),

    #[error("current player '{0}' is not in the player list")]
    UnknownPlayer(String),

    #[error("unknown territory '{0}' in snapshot")]
    UnknownTerritory(String),

    #[error("territory '{territory}' is held by both '{first}' and '{second}'")]
    DuplicateOwnership {
        territory: String,
        first: String,
        second: String,
    },

    #[error("territory '{0}' is held with zero troops")]
    ZeroTroops(String),

    #[error("pending conquest {from} -> {to}: {reason}")]
    InvalidPendingConquest {
        from: String,
        to: String,
        reason: &'static str,
    },
}

/// Wire form of the full game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<u32>,
    pub current_player: String,
    pub players: BTreeMap<String, PlayerSnapshot>,
    #[serde(default)]
    pub new_troops: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_conquest: Option<PendingSnapshot>,
}

/// Wire form of a won battle awaiting troop movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSnapshot {
    pub from: String,
    pub to: String,
}

/// Wire form of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub color: String,
    #[serde(default)]
    pub countries: BTreeMap<String, u32>,
}

/// Rebuilds the engine state from a snapshot.
///
/// The current player starts at Draft, or at Attack when the pool is empty
/// or a conquest is pending. A player already holding every territory is
/// recorded as the winner.
pub fn decode_snapshot(
    snapshot: &Snapshot,
    graph: &TerritoryGraph,
) -> Result<GameState, SnapshotError> {
    if snapshot.players.is_empty() {
        return Err(SnapshotError::NoPlayers);
    }
    if snapshot.players.len() > u8::MAX as usize {
        return Err(SnapshotError::TooManyPlayers(snapshot.players.len()));
    }

    let players: Vec<Player> = snapshot
        .players
        .iter()
        .map(|(name, p)| Player {
            name: name.clone(),
            color: p.color.clone(),
        })
        .collect();
    let mut state = GameState::new(players, graph.len(), snapshot.new_troops);
    state.game_id = snapshot.game_id;
    state.current = state
        .player_id(&snapshot.current_player)
        .ok_or_else(|| SnapshotError::UnknownPlayer(snapshot.current_player.clone()))?;

    let pending = snapshot
        .pending_conquest
        .as_ref()
        .map(|p| -> Result<PendingConquest, SnapshotError> {
            let lookup = |name: &String| {
                graph
                    .id_of(name)
                    .map_err(|_| SnapshotError::UnknownTerritory(name.clone()))
            };
            Ok(PendingConquest {
                from: lookup(&p.from)?,
                to: lookup(&p.to)?,
            })
        })
        .transpose()?;

    for (slot, (name, player)) in snapshot.players.iter().enumerate() {
        let id = PlayerId(slot as u8);
        for (territory, &troops) in &player.countries {
            let tid = graph
                .id_of(territory)
                .map_err(|_| SnapshotError::UnknownTerritory(territory.clone()))?;
            if troops == 0 && pending.map(|p| p.to) != Some(tid) {
                return Err(SnapshotError::ZeroTroops(territory.clone()));
            }
            if let Some(prev) = state.owner_of(tid) {
                return Err(SnapshotError::DuplicateOwnership {
                    territory: territory.clone(),
                    first: state.player(prev).name.clone(),
                    second: name.clone(),
                });
            }
            state.holdings[tid.index()] = Some(Holding { owner: id, troops });
        }
    }

    if let Some(p) = pending {
        check_pending(&state, graph, p)?;
        state.pending = Some(p);
    }
    if state.new_troops == 0 || state.pending.is_some() {
        state.stage = Stage::Attack;
    }
    let winner = state
        .player_ids()
        .find(|&p| state.owned_count(p) == graph.len());
    state.winner = winner;
    Ok(state)
}

/// A pending conquest runs from a territory of the current player with
/// troops to move, into an adjacent rival territory left with none.
fn check_pending(
    state: &GameState,
    graph: &TerritoryGraph,
    pending: PendingConquest,
) -> Result<(), SnapshotError> {
    let reason = if !state.is_owned_by(pending.from, state.current) {
        Some("attacking territory is not held by the current player")
    } else if state.troops_at(pending.from) < 2 {
        Some("attacking territory has no troops to move")
    } else if !graph.is_adjacent(pending.from, pending.to) {
        Some("territories are not adjacent")
    } else if state.owner_of(pending.to).is_none() || state.is_owned_by(pending.to, state.current) {
        Some("conquered territory is not held by a rival")
    } else if state.troops_at(pending.to) != 0 {
        Some("conquered territory still has troops")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(SnapshotError::InvalidPendingConquest {
            from: graph.name(pending.from).to_string(),
            to: graph.name(pending.to).to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Projects the engine state into its wire form.
pub fn encode_snapshot(state: &GameState, graph: &TerritoryGraph) -> Snapshot {
    let players = state
        .player_ids()
        .map(|id| {
            let player = state.player(id);
            let countries = state
                .territories_of(id)
                .into_iter()
                .map(|(t, troops)| (graph.name(t).to_string(), troops))
                .collect();
            (
                player.name.clone(),
                PlayerSnapshot {
                    color: player.color.clone(),
                    countries,
                },
            )
        })
        .collect();
    Snapshot {
        game_id: state.game_id,
        current_player: state.current_player().name.clone(),
        players,
        new_troops: state.new_troops,
        pending_conquest: state.pending.map(|p| PendingSnapshot {
            from: graph.name(p.from).to_string(),
            to: graph.name(p.to).to_string(),
        }),
    }
}

impl GameState {
    /// See [`decode_snapshot`].
    pub fn from_snapshot(
        snapshot: &Snapshot,
        graph: &TerritoryGraph,
    ) -> Result<Self, SnapshotError> {
        decode_snapshot(snapshot, graph)
    }

    /// See [`encode_snapshot`].
    pub fn to_snapshot(&self, graph: &TerritoryGraph) -> Snapshot {
        encode_snapshot(self, graph)
    }
}

/// Parses snapshot JSON into an engine state.
pub fn parse_snapshot(json: &str, graph: &TerritoryGraph) -> Result<GameState, SnapshotError> {
    let snapshot: Snapshot = serde_json::from_str(json)?;
    decode_snapshot(&snapshot, graph)
}

/// Serializes an engine state to snapshot JSON.
pub fn format_snapshot(state: &GameState, graph: &TerritoryGraph) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(&encode_snapshot(state, graph))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::classic;

    const THREE_PLAYERS: &str = r#"{"players":{"Player1":{"color":"rgb(58,118,207)","countries":{"North Africa":2,"Western Europe":6}},"Player2":{"color":"rgb(108,126,83)","countries":{"Brazil":3,"Central America":7,"Venezuela":5}},"Player3":{"color":"rgb(42,175,157)","countries":{"Middle East":4,"Ukraine":2}}},"currentPlayer":"Player1","newTroops":3}"#;

    #[test]
    fn parses_three_player_snapshot() {
        let graph = classic();
        let state = parse_snapshot(THREE_PLAYERS, &graph).unwrap();
        assert_eq!(state.players.len(), 3);
        assert_eq!(state.current_player().name, "Player1");
        assert_eq!(state.new_troops, 3);
        assert_eq!(state.stage, Stage::Draft);
        let brazil = graph.id_of("Brazil").unwrap();
        assert_eq!(state.owner_of(brazil), state.player_id("Player2"));
        assert_eq!(state.troops_at(brazil), 3);
        assert_eq!(state.winner, None);
    }

    #[test]
    fn encode_restores_the_same_ownership() {
        let graph = classic();
        let state = parse_snapshot(THREE_PLAYERS, &graph).unwrap();
        let json = format_snapshot(&state, &graph).unwrap();
        let again = parse_snapshot(&json, &graph).unwrap();
        assert_eq!(again, state);
        let expected: Snapshot = serde_json::from_str(THREE_PLAYERS).unwrap();
        assert_eq!(state.to_snapshot(&graph), expected);
        assert_eq!(GameState::from_snapshot(&expected, &graph).unwrap(), state);
    }

    #[test]
    fn sole_holder_loads_as_winner() {
        let graph = TerritoryGraph::from_json(
            r#"{"territories": {"A": {"continent": "X", "neighbors": ["B"]}, "B": {"continent": "X"}}}"#,
        )
        .unwrap();
        let json = r#"{"currentPlayer":"Bob","players":{
            "Ann":{"color":"r","countries":{"A":2,"B":1}},
            "Bob":{"color":"b"}}}"#;
        let state = parse_snapshot(json, &graph).unwrap();
        assert_eq!(state.winner, state.player_id("Ann"));
    }

    #[test]
    fn game_id_is_optional() {
        let graph = classic();
        let state = parse_snapshot(THREE_PLAYERS, &graph).unwrap();
        assert!(!format_snapshot(&state, &graph).unwrap().contains("gameId"));

        let json = r#"{"gameId":7,"currentPlayer":"A","players":{"A":{"color":"red","countries":{"Peru":1}}},"newTroops":0}"#;
        let state = parse_snapshot(json, &graph).unwrap();
        assert_eq!(state.game_id, Some(7));
        assert_eq!(state.stage, Stage::Attack);
    }

    #[test]
    fn pending_conquest_survives_a_round_trip() {
        use crate::combat::LoadedDice;
        use crate::resolve::{apply_battle_outcome, attack};

        let graph = classic();
        let json = r#"{"currentPlayer":"Ann","newTroops":0,"players":{
            "Ann":{"color":"red","countries":{"Peru":6}},
            "Bob":{"color":"blue","countries":{"Venezuela":2,"Brazil":1}}}}"#;
        let mut state = parse_snapshot(json, &graph).unwrap();
        let id = |n: &str| graph.id_of(n).unwrap();
        let mut dice = LoadedDice::new([6, 6, 6, 1, 1]);
        let report = attack(&mut state, &graph, id("Peru"), id("Venezuela"), &mut dice).unwrap();
        assert!(report.awaits_conquest());

        let snapshot = state.to_snapshot(&graph);
        assert_eq!(snapshot.players["Bob"].countries.get("Venezuela"), Some(&0));
        assert_eq!(
            snapshot.pending_conquest,
            Some(PendingSnapshot { from: "Peru".into(), to: "Venezuela".into() })
        );

        let text = format_snapshot(&state, &graph).unwrap();
        assert!(text.contains(r#""pendingConquest":{"from":"Peru","to":"Venezuela"}"#));
        let mut again = parse_snapshot(&text, &graph).unwrap();
        assert_eq!(again, state);

        let conquest = apply_battle_outcome(&mut again, &graph, 5).unwrap();
        assert_eq!(conquest.territory, id("Venezuela"));
        assert_eq!(again.owner_of(id("Venezuela")), again.player_id("Ann"));
        assert_eq!(again.troops_at(id("Venezuela")), 5);
        assert!(!format_snapshot(&again, &graph).unwrap().contains("pendingConquest"));
    }

    #[test]
    fn inconsistent_pending_conquest_is_rejected() {
        let graph = classic();
        let with_pending = |countries: &str, pending: &str| {
            format!(
                r#"{{"currentPlayer":"Ann","players":{{"Ann":{{"color":"r","countries":{{"Peru":6}}}},"Bob":{{"color":"b","countries":{}}}}},"pendingConquest":{}}}"#,
                countries, pending
            )
        };
        let troops_left = with_pending(r#"{"Venezuela":1}"#, r#"{"from":"Peru","to":"Venezuela"}"#);
        assert!(matches!(
            parse_snapshot(&troops_left, &graph).unwrap_err(),
            SnapshotError::InvalidPendingConquest { .. }
        ));
        let not_adjacent = with_pending(r#"{"Egypt":0}"#, r#"{"from":"Peru","to":"Egypt"}"#);
        assert!(matches!(
            parse_snapshot(&not_adjacent, &graph).unwrap_err(),
            SnapshotError::InvalidPendingConquest { .. }
        ));
        let stray_zero = with_pending(r#"{"Venezuela":0,"Brazil":0}"#, r#"{"from":"Peru","to":"Venezuela"}"#);
        assert!(matches!(
            parse_snapshot(&stray_zero, &graph).unwrap_err(),
            SnapshotError::ZeroTroops(t) if t == "Brazil"
        ));
        let ok = with_pending(r#"{"Venezuela":0}"#, r#"{"from":"Peru","to":"Venezuela"}"#);
        let state = parse_snapshot(&ok, &graph).unwrap();
        assert_eq!(state.stage, Stage::Attack);
        assert!(state.pending.is_some());
    }

    #[test]
    fn duplicate_ownership_is_rejected() {
        let graph = classic();
        let json = r#"{"currentPlayer":"A","players":{
            "A":{"color":"red","countries":{"Peru":1}},
            "B":{"color":"blue","countries":{"Peru":2}}},"newTroops":3}"#;
        let err = parse_snapshot(json, &graph).unwrap_err();
        assert!(matches!(err, SnapshotError::DuplicateOwnership { .. }));
    }

    #[test]
    fn bad_snapshots_are_rejected() {
        let graph = classic();
        let unknown_territory = r#"{"currentPlayer":"A","players":{"A":{"color":"r","countries":{"Atlantis":1}}}}"#;
        assert!(matches!(
            parse_snapshot(unknown_territory, &graph).unwrap_err(),
            SnapshotError::UnknownTerritory(_)
        ));
        let unknown_player = r#"{"currentPlayer":"Z","players":{"A":{"color":"r"}}}"#;
        assert!(matches!(
            parse_snapshot(unknown_player, &graph).unwrap_err(),
            SnapshotError::UnknownPlayer(_)
        ));
        let zero = r#"{"currentPlayer":"A","players":{"A":{"color":"r","countries":{"Peru":0}}}}"#;
        assert!(matches!(
            parse_snapshot(zero, &graph).unwrap_err(),
            SnapshotError::ZeroTroops(_)
        ));
        let empty = r#"{"currentPlayer":"A","players":{}}"#;
        assert!(matches!(
            parse_snapshot(empty, &graph).unwrap_err(),
            SnapshotError::NoPlayers
        ));
        assert!(matches!(
            parse_snapshot("garbage", &graph).unwrap_err(),
            SnapshotError::Json(_)
        ));
    }
}
