//! Monte-Carlo estimate of an attacker's chance to take a territory.
//!
//! Simulations are split into fixed-size chunks played in parallel with
//! rayon. Each chunk draws from its own `SmallRng` seeded from the table
//! seed and the chunk index, so a given seed always yields the same estimate.

use std::collections::HashMap;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;

use super::battle::resolve_battle;

/// Default number of simulated battles per estimate.
pub const DEFAULT_SIMULATIONS: u32 = 10_000;

/// Simulated battles per parallel chunk.
const CHUNK_SIZE: u32 = 1_000;

/// Memoised win probabilities keyed by `(attacker, defender)`.
#[derive(Debug, Clone)]
pub struct OddsTable {
    simulations: u32,
    seed: u64,
    cache: HashMap<(u32, u32), f64>,
}

impl OddsTable {
    /// Creates an empty table. A zero seed draws chunk seeds from entropy.
    pub fn new(simulations: u32, seed: u64) -> Self {
        OddsTable {
            simulations: simulations.max(1),
            seed,
            cache: HashMap::new(),
        }
    }

    pub fn simulations(&self) -> u32 {
        self.simulations
    }

    /// Probability that `attacker` troops wipe out `defender` troops.
    pub fn win_probability(&mut self, attacker: u32, defender: u32) -> f64 {
        if attacker <= 1 {
            return 0.0;
        }
        if defender == 0 {
            return 1.0;
        }
        if let Some(&p) = self.cache.get(&(attacker, defender)) {
            return p;
        }
        let p = estimate(attacker, defender, self.simulations, self.seed);
        self.cache.insert((attacker, defender), p);
        p
    }

    /// Number of cached estimates.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for OddsTable {
    fn default() -> Self {
        OddsTable::new(DEFAULT_SIMULATIONS, 0)
    }
}

/// Runs `simulations` battles and returns the fraction the attacker won.
pub fn estimate(attacker: u32, defender: u32, simulations: u32, seed: u64) -> f64 {
    let chunks = simulations.div_ceil(CHUNK_SIZE);
    let wins: u32 = (0..chunks)
        .into_par_iter()
        .map(|chunk| {
            let runs = CHUNK_SIZE.min(simulations - chunk * CHUNK_SIZE);
            let mut rng = if seed != 0 {
                SmallRng::seed_from_u64(seed.wrapping_add(chunk as u64))
            } else {
                SmallRng::from_entropy()
            };
            (0..runs)
                .filter(|_| resolve_battle(attacker, defender, &mut rng).is_conquest())
                .count() as u32
        })
        .sum();
    wins as f64 / simulations as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivial_matchups_skip_simulation() {
        let mut table = OddsTable::new(100, 1);
        assert_eq!(table.win_probability(1, 3), 0.0);
        assert_eq!(table.win_probability(4, 0), 1.0);
        assert!(table.is_empty());
    }

    #[test]
    fn estimates_are_cached() {
        let mut table = OddsTable::new(2_000, 9);
        let first = table.win_probability(5, 3);
        assert_eq!(table.len(), 1);
        assert_eq!(table.win_probability(5, 3), first);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn seeded_estimates_are_reproducible() {
        assert_eq!(estimate(6, 4, 3_500, 17), estimate(6, 4, 3_500, 17));
    }

    #[test]
    fn larger_armies_win_more_often() {
        let weak = estimate(3, 5, 5_000, 3);
        let strong = estimate(12, 5, 5_000, 3);
        assert!(strong > weak, "{} should beat {}", strong, weak);
        assert!(strong > 0.8);
        assert!(weak < 0.2);
    }

    #[test]
    fn two_versus_one_is_about_forty_two_percent() {
        // One attacker die against one defender die wins 15/36 of the time.
        let p = estimate(2, 1, 20_000, 5);
        assert!((p - 15.0 / 36.0).abs() < 0.02, "got {}", p);
    }
}
