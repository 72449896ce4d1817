//! Line protocol handling.
//!
//! Command parsing for the engine main loop, and the JSON snapshot that
//! carries the full game state across the transport boundary.

pub mod parser;
pub mod snapshot;

pub use parser::{parse_command, territory_name, territory_token, Command};
pub use snapshot::{
    decode_snapshot, encode_snapshot, format_snapshot, parse_snapshot, PendingSnapshot,
    PlayerSnapshot, Snapshot, SnapshotError,
};
