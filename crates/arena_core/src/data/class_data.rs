//! Class data structures for data-driven character definitions.

use serde::{Deserialize, Serialize};

use crate::stats::{LevelUpDelta, StatBlock};

/// How a class delivers the damage event of its attack cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AttackStyle {
    /// Damage lands directly on the current target.
    #[default]
    Melee,
    /// Damage is carried by a projectile fired at the target.
    Ranged,
}

/// Data-driven class definition.
///
/// Every field except `id` is optional in data files; missing stats fall back
/// to the base [`StatBlock`] values.
///
/// # Example RON
///
/// ```ron
/// ClassData(
///     id: "archer",
///     stats: (
///         attack_speed: 0.75,
///         speed: 40.0,
///         attack_damage: 30.0,
///         attack_range: 5.0,
///     ),
///     attack_style: Ranged,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassData {
    /// Unique class name, used in blueprints.
    pub id: String,

    /// Starting stats for characters of this class.
    #[serde(default)]
    pub stats: StatBlock,

    /// Stat increases applied on every level-up.
    #[serde(default)]
    pub level_up: LevelUpDelta,

    /// Melee or ranged damage delivery.
    #[serde(default)]
    pub attack_style: AttackStyle,

    /// Body width in world units, used by peer avoidance and projectile hits.
    #[serde(default = "default_collision_width")]
    pub collision_width: f32,
}

/// Default body width (one grid cell).
const fn default_collision_width() -> f32 {
    64.0
}

impl ClassData {
    /// Create a melee class with base stats.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            stats: StatBlock::default(),
            level_up: LevelUpDelta::default(),
            attack_style: AttackStyle::Melee,
            collision_width: default_collision_width(),
        }
    }

    /// Builder method to set the stat block.
    #[must_use]
    pub fn with_stats(mut self, stats: StatBlock) -> Self {
        self.stats = stats;
        self
    }

    /// Builder method to set the attack style.
    #[must_use]
    pub fn with_attack_style(mut self, style: AttackStyle) -> Self {
        self.attack_style = style;
        self
    }

    /// Check if this class fires projectiles.
    #[must_use]
    pub fn is_ranged(&self) -> bool {
        self.attack_style == AttackStyle::Ranged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_ron_uses_base_stats() {
        let data: ClassData = ron::from_str(
            r#"ClassData(
                id: "knight",
                stats: (armor: 10.0, resistance: 10.0),
            )"#,
        )
        .unwrap();

        assert_eq!(data.id, "knight");
        assert_eq!(data.stats.armor, 10.0);
        assert_eq!(data.stats.resistance, 10.0);
        assert_eq!(data.stats.max_health, 100.0);
        assert_eq!(data.attack_style, AttackStyle::Melee);
        assert_eq!(data.collision_width, 64.0);
    }

    #[test]
    fn test_is_ranged() {
        let archer = ClassData::new("archer").with_attack_style(AttackStyle::Ranged);
        assert!(archer.is_ranged());
        assert!(!ClassData::new("rogue").is_ranged());
    }
}
