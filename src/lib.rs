//! Conquest engine library.
//!
//! Exposes the territory graph and game state, combat, turn resolution,
//! the heuristic bot, and the protocol modules for use by integration
//! tests and the binary entry points.

pub mod board;
pub mod bot;
pub mod combat;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod resolve;
pub mod selfplay;
pub mod setup;
