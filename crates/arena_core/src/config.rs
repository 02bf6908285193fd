//! Tunable battle constants.
//!
//! Every field has a default, so a RON file only needs to name what it
//! changes:
//!
//! ```ron
//! BattleConfig(
//!     seed: 7,
//!     bounds: Some((min: (x: 180.0, y: 140.0), max: (x: 880.0, y: 640.0))),
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ArenaError, Result};
use crate::grid::BoardGrid;
use crate::math::{Bounds, Vec2};
use crate::steering::SteeringParams;

/// Constants that shape one battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// World units per grid cell. Attack range is measured in cells.
    pub cell_size: f32,
    /// Attack cycle length at attack speed 1, in milliseconds.
    pub base_attack_cycle_ms: f64,
    /// Fraction of the cycle at which the damage event fires.
    pub impact_fraction: f64,
    /// Peer avoidance tuning.
    pub steering: SteeringParams,
    /// Projectile speed in world units per second.
    pub projectile_speed: f32,
    /// Projectile collision radius.
    pub projectile_hit_radius: f32,
    /// Placement grid.
    pub grid: BoardGrid,
    /// First enemy spawn slot; later slots step right by one cell.
    pub spawn_origin: Vec2,
    /// Walls that clamp movement, if any.
    pub bounds: Option<Bounds>,
    /// Seed for crit rolls.
    pub seed: u64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            cell_size: 64.0,
            base_attack_cycle_ms: 1000.0,
            impact_fraction: 0.7,
            steering: SteeringParams::default(),
            projectile_speed: 500.0,
            projectile_hit_radius: 2.0,
            grid: BoardGrid::default(),
            spawn_origin: Vec2::new(625.0, 166.0),
            bounds: None,
            seed: 0,
        }
    }
}

impl BattleConfig {
    /// Parse a config from RON.
    ///
    /// `label` names the source in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::DataParseError`] on malformed RON.
    pub fn from_ron_str(label: &str, ron: &str) -> Result<Self> {
        ron::from_str(ron).map_err(|e| ArenaError::DataParseError {
            path: label.to_string(),
            message: e.to_string(),
        })
    }

    /// Builder method to set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// World position of the `index`-th enemy spawn slot.
    #[must_use]
    pub fn spawn_slot(&self, index: usize) -> Vec2 {
        Vec2::new(
            self.spawn_origin.x + index as f32 * self.cell_size,
            self.spawn_origin.y,
        )
    }
}
