//! Seeded randomness for combat rolls.
//!
//! The simulation never touches system entropy on its own: every battle owns
//! a [`CombatRng`] created from a seed, so the same seed and the same inputs
//! always replay the same fight.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded random number generator used for crit rolls.
#[derive(Debug, Clone)]
pub struct CombatRng {
    rng: StdRng,
    seed: u64,
}

impl CombatRng {
    /// Create a generator from a seed.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this generator was created from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform roll in `[0, 100)`.
    pub fn roll_percent(&mut self) -> f32 {
        self.rng.gen_range(0.0..100.0)
    }

    /// Roll for a critical strike.
    ///
    /// A roll at or below `crit_chance` crits. A chance of zero (or less)
    /// never crits, even on a roll of exactly zero.
    pub fn roll_crit(&mut self, crit_chance: f32) -> bool {
        let roll = self.roll_percent();
        crit_chance > 0.0 && roll <= crit_chance
    }
}

impl Default for CombatRng {
    fn default() -> Self {
        Self::from_seed(0)
    }
}
