//! Movement toward a target with dynamic peer avoidance.
//!
//! Characters walk straight at their target. A probe point a short distance
//! ahead checks for a body in the way; if one is found the character sidesteps
//! perpendicular to it while still drifting toward the target. There is no
//! pathfinding around static geometry.

use std::f32::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::math::{shortest_angle_between, Vec2};

/// Deviations closer than this count as a tie.
const TIE_EPSILON: f32 = 1e-5;

/// Cardinal direction a character faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Facing {
    /// Toward -y.
    Up,
    /// Toward +y. Neutral facing for idle characters.
    #[default]
    Down,
    /// Toward -x.
    Left,
    /// Toward +x.
    Right,
}

impl Facing {
    /// Facing for a heading angle, using 90° sectors centred on each axis.
    ///
    /// Right covers `[-45°, 45°)`, down `[45°, 135°)`, left `≥ 135°` or
    /// `< -135°`, and up the remainder.
    #[must_use]
    pub fn from_angle(angle: f32) -> Self {
        let degrees = angle.to_degrees();
        if (-45.0..45.0).contains(&degrees) {
            Self::Right
        } else if (45.0..135.0).contains(&degrees) {
            Self::Down
        } else if degrees >= 135.0 || degrees < -135.0 {
            Self::Left
        } else {
            Self::Up
        }
    }

    /// Facing from one point toward another.
    #[must_use]
    pub fn toward(from: Vec2, to: Vec2) -> Self {
        Self::from_angle(from.angle_to(to))
    }

    /// Side a falling body ends up facing.
    #[must_use]
    pub const fn fallen(self) -> Self {
        match self {
            Self::Left | Self::Up => Self::Left,
            Self::Right | Self::Down => Self::Right,
        }
    }
}

/// Tuning for peer avoidance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringParams {
    /// Distance ahead of the character to probe for bodies.
    pub probe_distance: f32,
    /// Added to half a peer's collision width when testing the probe.
    pub margin: f32,
    /// Share of the final velocity taken by the sidestep (0-1).
    pub avoidance_weight: f32,
}

impl Default for SteeringParams {
    fn default() -> Self {
        Self {
            probe_distance: 30.0,
            margin: 10.0,
            avoidance_weight: 0.7,
        }
    }
}

/// A body that may stand in the way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peer {
    /// Centre of the body.
    pub position: Vec2,
    /// Body width in world units.
    pub collision_width: f32,
}

/// Output of one steering decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steering {
    /// Velocity in world units per second.
    pub velocity: Vec2,
    /// Facing derived from the direct angle to the target.
    pub facing: Facing,
    /// Whether a peer forced a sidestep.
    pub avoiding: bool,
}

/// Compute a velocity toward `target` that steers around `peers`.
///
/// `peers` must already exclude the moving character and its target, and
/// should hold only living characters. When two peers are equally close to
/// the probe, the first one in iteration order is avoided. When the left and
/// right sidesteps deviate equally from the direct heading, the character
/// goes left.
pub fn compute_velocity<I>(
    position: Vec2,
    speed: f32,
    target: Vec2,
    peers: I,
    params: &SteeringParams,
) -> Steering
where
    I: IntoIterator<Item = Peer>,
{
    let heading = position.angle_to(target);
    let forward = Vec2::from_angle(heading);
    let direct = forward.scale(speed);
    let probe = position + forward.scale(params.probe_distance);

    let mut blocker: Option<(Peer, f32)> = None;
    for peer in peers {
        let distance = probe.distance(peer.position);
        if distance >= peer.collision_width / 2.0 + params.margin {
            continue;
        }
        match blocker {
            Some((_, best)) if distance >= best => {}
            _ => blocker = Some((peer, distance)),
        }
    }

    let facing = Facing::from_angle(heading);

    let Some((obstacle, _)) = blocker else {
        return Steering {
            velocity: direct,
            facing,
            avoiding: false,
        };
    };

    let to_obstacle = position.angle_to(obstacle.position);
    let left = to_obstacle - FRAC_PI_2;
    let right = to_obstacle + FRAC_PI_2;
    let go_left = shortest_angle_between(heading, left).abs()
        <= shortest_angle_between(heading, right).abs() + TIE_EPSILON;
    let sidestep = if go_left { left } else { right };

    let weight = params.avoidance_weight;
    let velocity = Vec2::from_angle(sidestep).scale(speed * weight) + direct.scale(1.0 - weight);

    Steering {
        velocity,
        facing,
        avoiding: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_facing_sectors() {
        assert_eq!(Facing::from_angle(0.0), Facing::Right);
        assert_eq!(Facing::from_angle(44f32.to_radians()), Facing::Right);
        assert_eq!(Facing::from_angle(45f32.to_radians()), Facing::Down);
        assert_eq!(Facing::from_angle(90f32.to_radians()), Facing::Down);
        assert_eq!(Facing::from_angle(135f32.to_radians()), Facing::Left);
        assert_eq!(Facing::from_angle(180f32.to_radians()), Facing::Left);
        assert_eq!(Facing::from_angle(-136f32.to_radians()), Facing::Left);
        assert_eq!(Facing::from_angle(-90f32.to_radians()), Facing::Up);
        assert_eq!(Facing::from_angle(-45f32.to_radians()), Facing::Right);
    }

    #[test]
    fn test_facing_toward_screen_space() {
        let origin = Vec2::ZERO;
        assert_eq!(Facing::toward(origin, Vec2::new(0.0, 10.0)), Facing::Down);
        assert_eq!(Facing::toward(origin, Vec2::new(0.0, -10.0)), Facing::Up);
        assert_eq!(Facing::toward(origin, Vec2::new(-10.0, 0.0)), Facing::Left);
    }

    #[test]
    fn test_fallen_facing() {
        assert_eq!(Facing::Up.fallen(), Facing::Left);
        assert_eq!(Facing::Down.fallen(), Facing::Right);
    }

    #[test]
    fn test_direct_path_when_clear() {
        let steering = compute_velocity(
            Vec2::ZERO,
            30.0,
            Vec2::new(100.0, 0.0),
            Vec::new(),
            &SteeringParams::default(),
        );
        assert!(!steering.avoiding);
        assert!((steering.velocity.x - 30.0).abs() < EPS);
        assert!(steering.velocity.y.abs() < EPS);
        assert_eq!(steering.facing, Facing::Right);
    }

    #[test]
    fn test_peer_far_from_probe_is_ignored() {
        let peers = vec![Peer {
            position: Vec2::new(0.0, 200.0),
            collision_width: 64.0,
        }];
        let steering = compute_velocity(
            Vec2::ZERO,
            30.0,
            Vec2::new(100.0, 0.0),
            peers,
            &SteeringParams::default(),
        );
        assert!(!steering.avoiding);
    }

    #[test]
    fn test_blocker_dead_ahead_goes_left() {
        // Obstacle exactly on the path: both sidesteps deviate 90°, left wins.
        let peers = vec![Peer {
            position: Vec2::new(35.0, 0.0),
            collision_width: 64.0,
        }];
        let steering = compute_velocity(
            Vec2::ZERO,
            30.0,
            Vec2::new(200.0, 0.0),
            peers,
            &SteeringParams::default(),
        );

        assert!(steering.avoiding);
        // 0.7 * 30 toward -y (left of heading on screen) + 0.3 * 30 toward +x
        assert!((steering.velocity.x - 9.0).abs() < EPS);
        assert!((steering.velocity.y + 21.0).abs() < EPS);
        assert_eq!(steering.facing, Facing::Right);
    }

    #[test]
    fn test_blocker_left_of_path_sidesteps_right() {
        // Obstacle slightly above the path (toward -y): going around its
        // +y side deviates less from the heading.
        let peers = vec![Peer {
            position: Vec2::new(30.0, -8.0),
            collision_width: 64.0,
        }];
        let steering = compute_velocity(
            Vec2::ZERO,
            30.0,
            Vec2::new(200.0, 0.0),
            peers,
            &SteeringParams::default(),
        );

        assert!(steering.avoiding);
        assert!(steering.velocity.y > 0.0);
    }

    #[test]
    fn test_nearest_blocker_wins() {
        let near = Peer {
            position: Vec2::new(30.0, 5.0),
            collision_width: 64.0,
        };
        let far = Peer {
            position: Vec2::new(30.0, -30.0),
            collision_width: 64.0,
        };
        let with_both = compute_velocity(
            Vec2::ZERO,
            30.0,
            Vec2::new(200.0, 0.0),
            vec![far, near],
            &SteeringParams::default(),
        );
        let with_near = compute_velocity(
            Vec2::ZERO,
            30.0,
            Vec2::new(200.0, 0.0),
            vec![near],
            &SteeringParams::default(),
        );
        assert_eq!(with_both.velocity, with_near.velocity);
    }
}
