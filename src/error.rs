//! Engine error types.
//!
//! `InvalidMove` covers every rejected player action; such failures are
//! recoverable and never leave the game state partially mutated.
//! `UnknownTerritory` is a reference-data miss and indicates a caller bug.

use crate::resolve::stage::Stage;

/// Why an action was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidMove {
    #[error("action requires the {expected} stage, current stage is {actual}")]
    WrongStage { expected: Stage, actual: Stage },

    #[error("it is not {0}'s turn")]
    NotYourTurn(String),

    #[error("'{0}' is not held by the current player")]
    NotYourTerritory(String),

    #[error("'{to}' is not a rival neighbor of '{from}'")]
    NotRivalNeighbor { from: String, to: String },

    #[error("'{to}' is not connected to '{from}' through owned territories")]
    NotConnected { from: String, to: String },

    #[error("cannot move {amount} troops from '{territory}' holding {available}")]
    TroopAmount {
        territory: String,
        amount: u32,
        available: u32,
    },

    #[error("'{0}' needs at least 2 troops to attack")]
    TooFewTroops(String),

    #[error("no reinforcement troops left to place")]
    NoTroopsLeft,

    #[error("a conquest of '{0}' is waiting for troops to be moved in")]
    ConquestPending(String),

    #[error("no conquered territory is waiting for troops")]
    NoPendingConquest,

    #[error("the game is over")]
    GameOver,
}

/// Errors returned by engine operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid move: {0}")]
    InvalidMove(#[from] InvalidMove),

    #[error("unknown territory: '{0}'")]
    UnknownTerritory(String),
}

impl EngineError {
    /// Returns true for recoverable gameplay rejections.
    pub fn is_invalid_move(&self) -> bool {
        matches!(self, EngineError::InvalidMove(_))
    }
}
