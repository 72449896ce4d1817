//! Turn resolution.
//!
//! Sequences the Draft / Attack / Fortify stages, validates player actions,
//! and applies battle outcomes and conquests to the game state.

pub mod conquest;
pub mod stage;
pub mod turn;

pub use conquest::{apply_battle, conquer, Conquest};
pub use stage::{
    advance_turn, apply_event, next_player, reinforcements, Rules, Stage, StageEvent, Transition,
    DEFAULT_MIN_REINFORCEMENT,
};
pub use turn::{
    apply_battle_outcome, attack, end_attack_stage, end_fortify_stage, ensure_turn, fortify,
    place_troop, AttackReport,
};
