//! Stat blocks, vitals, and progression.
//!
//! A [`StatBlock`] holds the numeric attributes a class table or blueprint
//! assigns to a character. [`Vitals`] track the mutable pools (health and
//! mana) and keep them clamped. [`Progression`] covers experience and levels.

use serde::{Deserialize, Serialize};

/// Static combat attributes of a character.
///
/// Defaults are the base values every class starts from before its own
/// overrides are applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatBlock {
    /// Maximum health points.
    pub max_health: f32,
    /// Maximum mana points.
    pub max_mana: f32,
    /// Passive mana regeneration per second of battle time.
    pub mana_per_second: f32,
    /// Mana granted whenever one of this character's strikes lands.
    pub mana_per_attack: f32,
    /// Damage of a single strike before crit and mitigation.
    pub attack_damage: f32,
    /// Attack rate multiplier. Higher values shorten the attack cycle.
    pub attack_speed: f32,
    /// Attack range in grid cells.
    pub attack_range: f32,
    /// Flat damage reduction applied before resistance.
    pub armor: f32,
    /// Percentage damage reduction (0-100).
    pub resistance: f32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Chance to crit, in percent (0-100).
    pub crit_chance: f32,
    /// Damage multiplier applied on a crit (never below 1).
    pub crit_damage_multiplier: f32,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            max_mana: 100.0,
            mana_per_second: 10.0,
            mana_per_attack: 10.0,
            attack_damage: 10.0,
            attack_speed: 1.0,
            attack_range: 1.0,
            armor: 0.0,
            resistance: 0.0,
            speed: 30.0,
            crit_chance: 10.0,
            crit_damage_multiplier: 2.0,
        }
    }
}

impl StatBlock {
    /// Attack range converted from grid cells to world units.
    #[must_use]
    pub fn range_in_world(&self, cell_size: f32) -> f32 {
        self.attack_range * cell_size
    }
}

/// Stat increases granted on each level-up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelUpDelta {
    /// Added to maximum health.
    pub max_health: f32,
    /// Added to attack damage.
    pub attack_damage: f32,
}

impl Default for LevelUpDelta {
    fn default() -> Self {
        Self {
            max_health: 50.0,
            attack_damage: 5.0,
        }
    }
}

impl LevelUpDelta {
    /// Apply this delta to a stat block.
    pub fn apply(&self, stats: &mut StatBlock) {
        stats.max_health += self.max_health;
        stats.attack_damage += self.attack_damage;
    }
}

/// Level and experience of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progression {
    /// Current level, starting at 1.
    pub level: u32,
    /// Experience earned toward the next level.
    pub experience: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            level: 1,
            experience: 0,
        }
    }
}

impl Progression {
    /// Experience needed to leave the current level.
    #[must_use]
    pub const fn experience_to_next(&self) -> u32 {
        self.level * 2
    }

    /// Add one experience point, leveling up when the threshold is reached.
    ///
    /// Returns `true` if the character leveled up. The caller applies the
    /// class's [`LevelUpDelta`].
    pub fn gain_experience(&mut self) -> bool {
        self.experience += 1;
        if self.experience >= self.experience_to_next() {
            self.experience = 0;
            self.level += 1;
            true
        } else {
            false
        }
    }
}

/// Mutable health and mana pools.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    /// Current health, within `[0, max_health]`.
    pub health: f32,
    /// Current mana, within `[0, max_mana]`.
    pub mana: f32,
}

impl Vitals {
    /// Full health and full mana for the given stats.
    #[must_use]
    pub fn full(stats: &StatBlock) -> Self {
        Self {
            health: stats.max_health.max(0.0),
            mana: stats.max_mana.max(0.0),
        }
    }

    /// Subtract health, clamping at zero.
    pub fn lose_health(&mut self, amount: f32) {
        self.health = (self.health - amount).max(0.0);
    }

    /// Add mana, clamped to `[0, max_mana]`.
    pub fn gain_mana(&mut self, amount: f32, max_mana: f32) {
        self.mana = (self.mana + amount).clamp(0.0, max_mana.max(0.0));
    }

    /// Check if health is exhausted.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.health <= 0.0
    }
}
