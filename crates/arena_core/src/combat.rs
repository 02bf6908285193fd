//! Damage math and attack timing.
//!
//! This module implements the pure half of the combat gate:
//! - Flat armor followed by percentage resistance, floored at zero
//! - Crit rolls that swap in `max(1, crit_damage_multiplier)`
//! - Attack cycle length from attack speed, and the impact point inside it
//! - Range checks in grid-cell units
//!
//! Applying damage to a character lives on [`Character`](crate::character::Character);
//! sequencing strikes over time lives in the battle orchestrator.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;
use crate::rng::CombatRng;
use crate::stats::StatBlock;

/// How a landed strike reads to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitKind {
    /// Damage went through without a crit.
    Normal,
    /// A crit rolled and damage went through.
    Critical,
    /// Armor and resistance absorbed everything.
    Blocked,
}

/// An outgoing strike before the target's mitigation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strike {
    /// Raw damage after the crit multiplier.
    pub damage: f32,
    /// Whether the crit rolled.
    pub crit: bool,
}

/// Result of applying a strike to a character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    /// Health actually removed (before clamping at zero).
    pub amount: f32,
    /// Classification for floating text.
    pub kind: HitKind,
    /// Whether this hit killed the character.
    pub killed: bool,
}

/// Damage left after armor and resistance.
///
/// Formula:
/// ```text
/// after_armor = raw - armor
/// final       = max(0, after_armor × (1 - resistance / 100))
/// ```
#[must_use]
pub fn mitigate(raw: f32, armor: f32, resistance: f32) -> f32 {
    let after_armor = raw - armor;
    (after_armor * (1.0 - resistance / 100.0)).max(0.0)
}

/// Roll the attacker's strike.
///
/// The crit multiplier replaces the base multiplier of 1 rather than adding
/// to it, and it is never allowed to shrink damage below the base.
pub fn roll_strike(stats: &StatBlock, rng: &mut CombatRng) -> Strike {
    let crit = rng.roll_crit(stats.crit_chance);
    let multiplier = if crit {
        stats.crit_damage_multiplier.max(1.0)
    } else {
        1.0
    };

    Strike {
        damage: stats.attack_damage * multiplier,
        crit,
    }
}

/// Classify a mitigated hit.
#[must_use]
pub fn classify(final_damage: f32, crit: bool) -> HitKind {
    if final_damage <= 0.0 {
        HitKind::Blocked
    } else if crit {
        HitKind::Critical
    } else {
        HitKind::Normal
    }
}

/// Length of one attack cycle in milliseconds.
///
/// Higher attack speed gives a shorter cycle.
#[must_use]
pub fn attack_cycle_ms(base_cycle_ms: f64, attack_speed: f32) -> f64 {
    base_cycle_ms / f64::from(attack_speed)
}

/// Delay from cycle start to the damage event, in milliseconds.
#[must_use]
pub fn impact_delay_ms(cycle_ms: f64, impact_fraction: f64) -> f64 {
    cycle_ms * impact_fraction
}

/// Check whether `target` is within `range_cells` grid cells of `from`.
#[must_use]
pub fn in_attack_range(from: Vec2, target: Vec2, range_cells: f32, cell_size: f32) -> bool {
    let range = range_cells * cell_size;
    from.distance_squared(target) <= range * range
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mitigate_armor_then_resistance() {
        assert_eq!(mitigate(30.0, 0.0, 0.0), 30.0);
        assert_eq!(mitigate(30.0, 10.0, 0.0), 20.0);
        assert_eq!(mitigate(30.0, 10.0, 50.0), 10.0);
    }

    #[test]
    fn test_mitigate_never_negative() {
        assert_eq!(mitigate(5.0, 10.0, 0.0), 0.0);
        assert_eq!(mitigate(10.0, 10.0, 10.0), 0.0);
        assert_eq!(mitigate(50.0, 0.0, 100.0), 0.0);
    }

    #[test]
    fn test_knight_vs_base_attacker() {
        // Base 10 damage into a knight (armor 10, resistance 10) is fully blocked
        assert_eq!(mitigate(10.0, 10.0, 10.0), 0.0);
        // A crit (x2) gets through: (20 - 10) * 0.9
        assert!((mitigate(20.0, 10.0, 10.0) - 9.0).abs() < 1e-5);
    }

    #[test]
    fn test_roll_strike_always_crits_at_100() {
        let stats = StatBlock {
            crit_chance: 100.0,
            crit_damage_multiplier: 3.0,
            attack_damage: 10.0,
            ..StatBlock::default()
        };
        let mut rng = CombatRng::from_seed(1);
        for _ in 0..200 {
            let strike = roll_strike(&stats, &mut rng);
            assert!(strike.crit);
            assert_eq!(strike.damage, 30.0);
        }
    }

    #[test]
    fn test_roll_strike_never_crits_at_0() {
        let stats = StatBlock {
            crit_chance: 0.0,
            ..StatBlock::default()
        };
        let mut rng = CombatRng::from_seed(1);
        for _ in 0..200 {
            let strike = roll_strike(&stats, &mut rng);
            assert!(!strike.crit);
            assert_eq!(strike.damage, stats.attack_damage);
        }
    }

    #[test]
    fn test_weak_crit_multiplier_is_floored() {
        let stats = StatBlock {
            crit_chance: 100.0,
            crit_damage_multiplier: 0.5,
            attack_damage: 10.0,
            ..StatBlock::default()
        };
        let mut rng = CombatRng::from_seed(9);
        let strike = roll_strike(&stats, &mut rng);
        assert!(strike.crit);
        assert_eq!(strike.damage, 10.0);
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(0.0, true), HitKind::Blocked);
        assert_eq!(classify(5.0, true), HitKind::Critical);
        assert_eq!(classify(5.0, false), HitKind::Normal);
    }

    #[test]
    fn test_attack_cycle_timing() {
        assert_eq!(attack_cycle_ms(1000.0, 1.0), 1000.0);
        assert!((attack_cycle_ms(1000.0, 1.5) - 666.666_7).abs() < 1e-3);
        assert_eq!(attack_cycle_ms(1000.0, 0.5), 2000.0);
        assert!((impact_delay_ms(1000.0, 0.7) - 700.0).abs() < 1e-9);
    }

    #[test]
    fn test_in_attack_range_uses_cells() {
        let origin = Vec2::ZERO;
        assert!(in_attack_range(origin, Vec2::new(64.0, 0.0), 1.0, 64.0));
        assert!(!in_attack_range(origin, Vec2::new(64.5, 0.0), 1.0, 64.0));
        assert!(in_attack_range(origin, Vec2::new(300.0, 0.0), 5.0, 64.0));
    }
}
