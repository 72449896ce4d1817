//! Board representation and game-state types.
//!
//! Contains the territory graph, the built-in classic map, and the
//! ownership model held in `GameState`.

pub mod classic;
pub mod state;
pub mod territory;

pub use classic::{classic, CLASSIC_BORDER_COUNT, CLASSIC_TERRITORY_COUNT};
pub use state::{GameState, Holding, PendingConquest, Player, PlayerId};
pub use territory::{
    Continent, ContinentId, MapData, MapError, Territory, TerritoryData, TerritoryGraph,
    TerritoryId,
};
