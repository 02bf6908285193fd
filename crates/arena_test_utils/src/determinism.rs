//! Replay checks for battles.
//!
//! Balance sweeps and the headless `verify` command both assume a battle
//! replays exactly from its seed, rosters, and frame deltas. Rosters are
//! ordered vectors and crit rolls come only from the battle's seeded
//! [`CombatRng`](arena_core::rng::CombatRng), so two battles built the same
//! way and advanced with the same frames must hash the same after every tick.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use arena_core::battle::Battle;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic battle).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// # Panics
    ///
    /// Panics with every run's hash if the runs disagreed.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "{} runs of {} ticks ended in {} different states: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Final hashes of battles run side by side on separate threads.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// One hash per battle, in spawn order.
    pub hashes: Vec<u64>,
    /// Ticks each battle advanced.
    pub ticks: u64,
}

impl ParallelSimResult {
    /// True when every battle ended in the same state.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// # Panics
    ///
    /// Panics if any two battles ended in different states.
    pub fn assert_deterministic(&self) {
        DeterminismResult {
            is_deterministic: self.is_deterministic(),
            hashes: self.hashes.clone(),
            ticks: self.ticks,
        }
        .assert_deterministic();
    }
}

/// Build a state `runs` times, step each copy `ticks` times, and compare
/// the final hashes.
///
/// # Example
///
/// ```
/// use arena_test_utils::determinism::verify_determinism;
/// use arena_test_utils::fixtures::{two_vs_two, FRAME_MS};
///
/// let result = verify_determinism(
///     3,
///     200,
///     || {
///         let mut battle = two_vs_two(7);
///         battle.start_fight();
///         battle
///     },
///     |battle| {
///         battle.advance(FRAME_MS);
///     },
///     |battle| battle.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a battle twice with identical setup and fixed frame deltas and
/// compare final state hashes.
///
/// `setup_fn` should return a battle that is already fighting if the test
/// wants combat to happen.
pub fn verify_battle_determinism<F>(setup_fn: F, num_ticks: u64, delta_ms: f32) -> bool
where
    F: Fn() -> Battle,
{
    let result = verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |battle| {
            battle.advance(delta_ms);
        },
        Battle::state_hash,
    );
    result.is_deterministic
}

/// Run N battles on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling or
/// memory layout differences.
///
/// # Panics
///
/// Panics if a battle thread panics.
pub fn run_parallel_battles_scoped<F>(
    setup_fn: F,
    num_sims: usize,
    num_ticks: u64,
    delta_ms: f32,
) -> ParallelSimResult
where
    F: Fn() -> Battle + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut battle = setup_fn();
                    for _ in 0..num_ticks {
                        battle.advance(delta_ms);
                    }
                    battle.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|_| panic!("battle thread panicked")))
            .collect()
    });

    ParallelSimResult {
        hashes,
        ticks: num_ticks,
    }
}

/// Compare two battle runs tick-by-tick, finding first divergence.
///
/// # Returns
///
/// `None` if the battles are deterministic, `Some(tick)` if they diverge
/// at that tick.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64, delta_ms: f32) -> Option<u64>
where
    F: Fn() -> Battle,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        first.advance(delta_ms);
        second.advance(delta_ms);

        if first.state_hash() != second.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for battle inputs.
pub mod strategies {
    use arena_core::prelude::*;
    use proptest::prelude::*;

    /// Raw strike damage, including zero.
    pub fn arb_damage() -> impl Strategy<Value = f32> {
        0.0f32..500.0
    }

    /// Flat armor.
    pub fn arb_armor() -> impl Strategy<Value = f32> {
        0.0f32..100.0
    }

    /// Resistance percentage.
    pub fn arb_resistance() -> impl Strategy<Value = f32> {
        0.0f32..100.0
    }

    /// Position somewhere in and around the arena.
    pub fn arb_position() -> impl Strategy<Value = Vec2> {
        (0.0f32..1000.0, 0.0f32..800.0).prop_map(|(x, y)| Vec2::new(x, y))
    }

    /// Sane stat block for fights that should finish.
    pub fn arb_stat_block() -> impl Strategy<Value = StatBlock> {
        (
            50.0f32..300.0,
            5.0f32..60.0,
            0.5f32..2.5,
            1.0f32..5.0,
            0.0f32..20.0,
            0.0f32..50.0,
            20.0f32..80.0,
            0.0f32..50.0,
        )
            .prop_map(
                |(max_health, attack_damage, attack_speed, attack_range, armor, resistance, speed, crit_chance)| {
                    StatBlock {
                        max_health,
                        attack_damage,
                        attack_speed,
                        attack_range,
                        armor,
                        resistance,
                        speed,
                        crit_chance,
                        ..StatBlock::default()
                    }
                },
            )
    }

    /// One of the built-in class names.
    pub fn arb_class() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just("knight"), Just("rogue"), Just("archer")]
    }

    /// Player blueprint of a built-in class at a random position.
    pub fn arb_player_blueprint(id: &'static str) -> impl Strategy<Value = Blueprint> {
        (arb_class(), arb_position(), 1u32..5, 0u32..4).prop_map(
            move |(class, position, level, experience)| {
                let mut blueprint = crate::fixtures::player(id, class, position.x, position.y);
                blueprint.progression = Progression { level, experience };
                blueprint
            },
        )
    }

    /// Classes for an enemy roster of up to `max_len` members.
    pub fn arb_enemy_classes(max_len: usize) -> impl Strategy<Value = Vec<&'static str>> {
        prop::collection::vec(arb_class(), 1..=max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{duel, empty_battle, skirmish, two_vs_two, FRAME_MS};
    use proptest::prelude::*;

    fn fighting(mut battle: Battle) -> Battle {
        battle.start_fight();
        battle
    }

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 10, || 0u64, |n| *n += 1, |n| *n);
        assert!(result.is_deterministic);
        assert_eq!(result.unique_hashes(), vec![10]);
    }

    #[test]
    fn test_empty_battle_determinism() {
        assert!(verify_battle_determinism(|| fighting(empty_battle(1)), 50, FRAME_MS));
    }

    #[test]
    fn test_two_vs_two_determinism() {
        assert!(verify_battle_determinism(|| fighting(two_vs_two(42)), 1500, FRAME_MS));
    }

    #[test]
    fn test_find_divergence_on_deterministic_battle() {
        assert_eq!(find_first_divergence(|| fighting(duel("rogue", "archer", 5)), 800, FRAME_MS), None);
    }

    #[test]
    fn test_same_seed_same_hash() {
        let run = |seed| {
            let mut battle = fighting(skirmish(3, seed));
            for _ in 0..600 {
                battle.advance(FRAME_MS);
            }
            battle.state_hash()
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn test_parallel_battles() {
        run_parallel_battles_scoped(|| fighting(skirmish(4, 3)), 4, 800, FRAME_MS)
            .assert_deterministic();
    }

    #[test]
    fn test_compute_hash_stable() {
        assert_eq!(compute_hash(&("a", 1)), compute_hash(&("a", 1)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Any seed and frame length replays identically.
        #[test]
        fn prop_seeded_battles_replay(seed in any::<u64>(), delta in 5.0f32..40.0) {
            prop_assert!(verify_battle_determinism(|| fighting(two_vs_two(seed)), 300, delta));
        }

        /// Random player placements replay identically.
        #[test]
        fn prop_random_rosters_replay(
            hero in strategies::arb_player_blueprint("hero"),
            enemies in strategies::arb_enemy_classes(3),
        ) {
            let setup = || {
                let mut battle = empty_battle(17);
                battle.add_character(&hero).unwrap();
                for (i, class) in enemies.iter().enumerate() {
                    battle.spawn_enemy(&crate::fixtures::enemy(&format!("e{i}"), class)).unwrap();
                }
                fighting(battle)
            };
            prop_assert!(verify_battle_determinism(setup, 300, FRAME_MS));
        }
    }
}
