//! Combat resolution.
//!
//! Dice sources, the round-by-round battle simulation, and Monte-Carlo
//! win-probability estimates built on top of it.

pub mod battle;
pub mod dice;
pub mod odds;

pub use battle::{resolve_battle, resolve_round, BattleOutcome, MAX_ATTACK_DICE, MAX_DEFEND_DICE};
pub use dice::{DiceRoller, LoadedDice, DIE_FACES};
pub use odds::{estimate, OddsTable, DEFAULT_SIMULATIONS};
