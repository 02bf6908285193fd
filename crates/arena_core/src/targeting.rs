//! Nearest-enemy target selection.

use crate::character::Character;
use crate::math::Vec2;

/// Pick the closest active candidate to `from`.
///
/// Distance is Euclidean. On a tie the candidate seen first wins, so callers
/// must pass candidates in stable roster order. Returns `None` when no
/// candidate is active.
pub fn acquire_target<'a, I>(from: Vec2, candidates: I) -> Option<&'a Character>
where
    I: IntoIterator<Item = &'a Character>,
{
    let mut best: Option<(&Character, f32)> = None;

    for candidate in candidates.into_iter().filter(|c| c.is_active()) {
        let distance = from.distance_squared(candidate.position);
        match best {
            Some((_, closest)) if distance >= closest => {}
            _ => best = Some((candidate, distance)),
        }
    }

    best.map(|(character, _)| character)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::Blueprint;
    use crate::data::ClassRegistry;

    fn enemy(id: &str, x: f32, y: f32) -> Character {
        let registry = ClassRegistry::builtin();
        let blueprint =
            Blueprint::from_class(id, registry.get("knight").unwrap()).at(Vec2::new(x, y));
        Character::from_blueprint(&blueprint, &registry).unwrap()
    }

    #[test]
    fn test_nearest_wins() {
        let roster = vec![
            enemy("far", 100.0, 0.0),
            enemy("near", 10.0, 0.0),
            enemy("mid", 50.0, 0.0),
        ];
        let target = acquire_target(Vec2::ZERO, &roster).unwrap();
        assert_eq!(target.id().as_str(), "near");
    }

    #[test]
    fn test_tie_goes_to_first() {
        let roster = vec![
            enemy("left", -20.0, 0.0),
            enemy("right", 20.0, 0.0),
            enemy("below", 0.0, 20.0),
        ];
        let target = acquire_target(Vec2::ZERO, &roster).unwrap();
        assert_eq!(target.id().as_str(), "left");
    }

    #[test]
    fn test_dead_candidates_skipped() {
        let mut roster = vec![enemy("near", 5.0, 0.0), enemy("far", 90.0, 0.0)];
        roster[0].die();
        let target = acquire_target(Vec2::ZERO, &roster).unwrap();
        assert_eq!(target.id().as_str(), "far");
    }

    #[test]
    fn test_no_active_candidates() {
        let mut roster = vec![enemy("a", 5.0, 0.0)];
        roster[0].die();
        assert!(acquire_target(Vec2::ZERO, &roster).is_none());
        assert!(acquire_target(Vec2::ZERO, &Vec::new()).is_none());
    }
}
