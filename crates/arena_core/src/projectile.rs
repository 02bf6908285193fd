//! Projectiles fired by ranged attackers.
//!
//! A projectile flies in a straight line from where it was fired. It carries
//! no damage of its own: when it overlaps an enemy, the owner's strike is
//! rolled at that moment with the owner's current stats.

use serde::{Deserialize, Serialize};

use crate::blueprint::{CharacterId, Side};
use crate::character::Character;
use crate::math::Vec2;

/// A projectile in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Unique ID within one battle.
    pub id: u64,
    /// Character that fired it.
    pub owner: CharacterId,
    /// Side of the owner; only the opposing roster can be hit.
    pub side: Side,
    /// Current world position.
    pub position: Vec2,
    /// Velocity in world units per second.
    pub velocity: Vec2,
}

impl Projectile {
    /// Fire from `from` toward `toward` at `speed` world units per second.
    #[must_use]
    pub fn fire(
        id: u64,
        owner: CharacterId,
        side: Side,
        from: Vec2,
        toward: Vec2,
        speed: f32,
    ) -> Self {
        let direction = Vec2::from_angle(from.angle_to(toward));
        Self {
            id,
            owner,
            side,
            position: from,
            velocity: direction.scale(speed),
        }
    }

    /// Advance along the flight path by `delta_ms`.
    pub fn step(&mut self, delta_ms: f32) {
        self.position += self.velocity.scale(delta_ms / 1000.0);
    }

    /// First active character in `candidates` the projectile overlaps.
    ///
    /// Overlap means the centre distance is below the hit radius plus half
    /// the character's collision width.
    pub fn first_hit<'a, I>(&self, candidates: I, hit_radius: f32) -> Option<&'a Character>
    where
        I: IntoIterator<Item = &'a Character>,
    {
        candidates.into_iter().find(|c| {
            c.is_active()
                && self.position.distance(c.position) < hit_radius + c.collision_width() / 2.0
        })
    }
}

/// Flight time before a projectile expires, in milliseconds.
///
/// The projectile may travel `range_world` units. Zero or negative speed
/// expires immediately.
#[must_use]
pub fn lifetime_ms(range_world: f32, speed: f32) -> f64 {
    if speed <= 0.0 {
        return 0.0;
    }
    f64::from(range_world) / f64::from(speed) * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::Blueprint;
    use crate::data::ClassRegistry;

    fn knight_at(id: &str, x: f32) -> Character {
        let registry = ClassRegistry::builtin();
        let blueprint =
            Blueprint::from_class(id, registry.get("knight").unwrap()).at(Vec2::new(x, 0.0));
        Character::from_blueprint(&blueprint, &registry).unwrap()
    }

    #[test]
    fn test_flight_is_straight() {
        let mut arrow = Projectile::fire(
            1,
            CharacterId::new("archer"),
            Side::Player,
            Vec2::ZERO,
            Vec2::new(100.0, 0.0),
            500.0,
        );
        arrow.step(100.0);
        assert!((arrow.position.x - 50.0).abs() < 1e-4);
        assert!(arrow.position.y.abs() < 1e-4);
    }

    #[test]
    fn test_first_hit_in_roster_order() {
        let arrow = Projectile::fire(
            1,
            CharacterId::new("archer"),
            Side::Player,
            Vec2::new(10.0, 0.0),
            Vec2::new(100.0, 0.0),
            500.0,
        );
        let roster = vec![knight_at("a", 30.0), knight_at("b", 0.0)];
        let hit = arrow.first_hit(&roster, 2.0).unwrap();
        assert_eq!(hit.id().as_str(), "a");
    }

    #[test]
    fn test_dead_bodies_do_not_stop_arrows() {
        let arrow = Projectile::fire(
            1,
            CharacterId::new("archer"),
            Side::Player,
            Vec2::ZERO,
            Vec2::new(100.0, 0.0),
            500.0,
        );
        let mut roster = vec![knight_at("a", 5.0)];
        roster[0].die();
        assert!(arrow.first_hit(&roster, 2.0).is_none());
    }

    #[test]
    fn test_lifetime() {
        // Archer range: 5 cells of 64 units at 500 u/s
        assert!((lifetime_ms(320.0, 500.0) - 640.0).abs() < 1e-9);
        assert_eq!(lifetime_ms(320.0, 0.0), 0.0);
    }
}
