//! Dice sources for battle resolution.
//!
//! Every `rand::Rng` rolls dice; tests substitute a seeded `SmallRng` or a
//! `LoadedDice` script to pin down exact outcomes.

use std::collections::VecDeque;

use rand::Rng;

/// Number of faces on a die.
pub const DIE_FACES: u8 = 6;

/// A source of six-sided die rolls.
pub trait DiceRoller {
    /// Rolls one die, returning a value in `1..=6`.
    fn roll(&mut self) -> u8;

    /// Rolls `count` dice and returns them sorted highest first.
    fn roll_sorted(&mut self, count: usize) -> Vec<u8> {
        let mut dice: Vec<u8> = (0..count).map(|_| self.roll()).collect();
        dice.sort_unstable_by(|a, b| b.cmp(a));
        dice
    }
}

impl<R: Rng + ?Sized> DiceRoller for R {
    fn roll(&mut self) -> u8 {
        self.gen_range(1..=DIE_FACES)
    }
}

/// Replays a fixed sequence of rolls, then falls back to 1s.
#[derive(Debug, Clone, Default)]
pub struct LoadedDice {
    rolls: VecDeque<u8>,
}

impl LoadedDice {
    pub fn new(rolls: impl IntoIterator<Item = u8>) -> Self {
        LoadedDice {
            rolls: rolls.into_iter().collect(),
        }
    }

    /// Rolls left in the script.
    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl DiceRoller for LoadedDice {
    fn roll(&mut self) -> u8 {
        self.rolls.pop_front().unwrap_or(1).clamp(1, DIE_FACES)
    }
}
