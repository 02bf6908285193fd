//! End-to-end battle scenarios.
//!
//! These drive [`Battle`] only through its public commands and
//! [`Battle::advance`], the way a host would.

use arena_core::character::Character;
use arena_core::prelude::*;
use arena_core::store::{upsert_blueprint, RosterStore};
use arena_test_utils::balance::play_round;
use arena_test_utils::determinism::{find_first_divergence, run_parallel_battles_scoped};
use arena_test_utils::fixtures::{
    duel, empty_battle, enemy, player, registry, two_vs_two, MemoryStore, FRAME_MS,
};

const MAX_TICKS: u64 = 20_000;

fn fresh(class: &str) -> Character {
    Character::from_blueprint(&player("x", class, 0.0, 0.0), &registry()).unwrap()
}

// =============================================================================
// Damage scenarios
// =============================================================================

#[test]
fn scenario_a_survivable_hit() {
    let mut character = fresh("dummy");
    let outcome = character.take_damage(30.0, false).unwrap();

    assert_eq!(character.vitals.health, 70.0);
    assert_eq!(outcome.kind, HitKind::Normal);
    assert!(!outcome.killed);
    assert!(character.is_active());
}

#[test]
fn scenario_b_lethal_hit_kills_once() {
    let mut character = fresh("dummy");
    character.vitals.health = 20.0;

    let outcome = character.take_damage(30.0, false).unwrap();
    assert!(outcome.killed);
    assert_eq!(character.vitals.health, 0.0);
    assert_eq!(character.state, LifecycleState::Dead);

    assert!(character.take_damage(30.0, false).is_none());
    assert!(!character.die());
    assert_eq!(character.vitals.health, 0.0);
}

#[test]
fn knight_armor_blocks_weak_hits() {
    let mut knight = fresh("knight");
    let outcome = knight.take_damage(10.0, false).unwrap();
    assert_eq!(outcome.kind, HitKind::Blocked);
    assert_eq!(knight.vitals.health, knight.stats.max_health);
}

// =============================================================================
// Round scenarios
// =============================================================================

#[test]
fn scenario_d_two_vs_two_wipe_restores_everyone() {
    let mut battle = two_vs_two(21);
    let outcome = play_round(&mut battle, MAX_TICKS);

    assert!(!outcome.timed_out);
    assert!(outcome.deaths >= 2);
    assert_eq!(battle.fight_state(), FightState::Idle);
    assert_eq!(battle.round(), 2);

    for character in battle.players().iter().chain(battle.enemies().iter()) {
        assert!(character.is_active());
        assert_eq!(character.vitals.health, character.stats.max_health);
        assert_eq!(character.state, LifecycleState::Idle);
        assert_eq!(character.position, character.board_position);
        assert!(character.target.is_none());
    }
    for (i, enemy) in battle.enemies().iter().enumerate() {
        assert_eq!(enemy.position, battle.config().spawn_slot(i));
    }
    assert!(battle.projectiles().is_empty());
    assert_eq!(battle.pending_timers(), 0);
}

#[test]
fn round_end_event_order() {
    let mut battle = duel("rogue", "dummy", 4);
    battle.start_fight();
    battle.take_events();

    let mut finishing = None;
    for _ in 0..MAX_TICKS {
        let tick = battle.advance(FRAME_MS);
        if tick.round_result().is_some() {
            finishing = Some(tick);
            break;
        }
    }
    let events = finishing.expect("round should finish").events;

    let died = events
        .iter()
        .position(|e| matches!(e, BattleEvent::CharacterDied(_)))
        .unwrap();
    let finished = events
        .iter()
        .position(|e| matches!(e, BattleEvent::RoundFinished { .. }))
        .unwrap();
    let idle = events
        .iter()
        .position(|e| *e == BattleEvent::FightStateChanged(FightState::Idle))
        .unwrap();
    assert!(died < finished);
    assert!(finished < idle);
    assert_eq!(
        events[finished],
        BattleEvent::RoundFinished {
            winner: Some(Side::Player)
        }
    );
}

#[test]
fn scenario_e_lonely_roster_stays_calm() {
    let mut battle = empty_battle(2);
    battle
        .add_character(&player("p1", "knight", 400.0, 400.0))
        .unwrap();
    battle
        .add_character(&player("p2", "archer", 464.0, 400.0))
        .unwrap();

    for _ in 0..3 {
        battle.start_fight();
        for _ in 0..50 {
            battle.advance(FRAME_MS);
            assert!(battle.validate().is_ok());
            for character in battle.players().iter() {
                assert!(matches!(
                    character.state,
                    LifecycleState::Idle | LifecycleState::Seeking
                ));
                assert!(character.target.is_none());
                assert_eq!(character.facing, Facing::Down);
                assert_eq!(character.vitals.health, character.stats.max_health);
            }
        }
    }

    assert_eq!(battle.fight_state(), FightState::Idle);
    assert_eq!(battle.players().active_count(), 2);

    // Rounds against nobody grant no experience
    for (id, max_health) in [("p1", 100.0), ("p2", 100.0)] {
        let character = battle.character(&id.into()).unwrap();
        assert_eq!(character.progression.level, 1, "{id}");
        assert_eq!(character.progression.experience, 0, "{id}");
        assert_eq!(character.stats.max_health, max_health, "{id}");
    }
}

#[test]
fn mutual_kill_ends_in_a_draw() {
    let mut battle = empty_battle(4);
    let mut hero = player("p1", "dummy", 650.0, 166.0);
    hero.stats.attack_damage = 500.0;
    battle.add_character(&hero).unwrap();
    let mut foe = enemy("e1", "dummy");
    foe.stats.attack_damage = 500.0;
    battle.spawn_enemy(&foe).unwrap();

    battle.start_fight();
    let mut events = Vec::new();
    let mut winner = None;
    for _ in 0..MAX_TICKS {
        let tick = battle.advance(FRAME_MS);
        events.extend(tick.events.iter().cloned());
        if let Some(result) = tick.round_result() {
            winner = Some(result);
            break;
        }
    }

    assert_eq!(winner, Some(None));
    let deaths: Vec<&BattleEvent> = events
        .iter()
        .filter(|e| matches!(e, BattleEvent::CharacterDied(_)))
        .collect();
    assert_eq!(deaths.len(), 2);
    assert!(!events
        .iter()
        .any(|e| matches!(e, BattleEvent::LeveledUp { .. })));
    let hero = battle.character(&"p1".into()).unwrap();
    assert_eq!(hero.progression.experience, 0);
    assert_eq!(battle.fight_state(), FightState::Idle);
}

#[test]
fn winners_level_up_after_enough_rounds() {
    let mut battle = duel("rogue", "dummy", 6);

    // Level 1 needs two points of experience.
    for _ in 0..2 {
        let outcome = play_round(&mut battle, MAX_TICKS);
        assert_eq!(outcome.winner, Some(Side::Player));
    }

    let rogue = battle.character(&"p1".into()).unwrap();
    assert_eq!(rogue.progression.level, 2);
    assert_eq!(rogue.progression.experience, 0);
    assert_eq!(rogue.stats.max_health, 150.0);
    assert_eq!(rogue.stats.attack_damage, 25.0);
    assert_eq!(battle.round(), 3);
}

#[test]
fn ranged_attacker_kills_from_range() {
    let mut battle = empty_battle(12);
    let mut archer = player("p1", "archer", 625.0, 486.0);
    archer.stats.attack_damage = 200.0;
    battle.add_character(&archer).unwrap();
    battle.spawn_enemy(&enemy("e1", "dummy")).unwrap();

    battle.start_fight();
    let mut fired = false;
    let mut winner = None;
    for _ in 0..MAX_TICKS {
        let tick = battle.advance(FRAME_MS);
        fired |= tick
            .events
            .iter()
            .any(|e| matches!(e, BattleEvent::ProjectileFired { .. }));
        if let Some(result) = tick.round_result() {
            winner = result;
            break;
        }
    }

    assert!(fired);
    assert_eq!(winner, Some(Side::Player));
}

// =============================================================================
// Persistence and determinism
// =============================================================================

#[test]
fn roster_survives_store_round_trip() {
    let mut battle = two_vs_two(5);
    play_round(&mut battle, MAX_TICKS);

    let mut store = MemoryStore::default();
    store.save(&battle.player_blueprints()).unwrap();

    let mut restored = empty_battle(5);
    assert_eq!(restored.load_from_store(&store), 2);
    for original in battle.players().iter() {
        let copy = restored.character(original.id()).unwrap();
        assert_eq!(copy.stats, original.stats);
        assert_eq!(copy.progression, original.progression);
        assert_eq!(copy.board_position, original.board_position);
    }
}

#[test]
fn broken_store_starts_empty() {
    let store = MemoryStore {
        fail_loads: true,
        ..MemoryStore::default()
    };
    let mut battle = empty_battle(1);
    assert_eq!(battle.load_from_store(&store), 0);
    assert!(battle
        .take_events()
        .contains(&BattleEvent::NeedStartingCharacter));
}

#[test]
fn upsert_keeps_roster_order() {
    let mut store = MemoryStore::with_roster(&[
        player("a", "knight", 272.0, 332.0),
        player("b", "rogue", 336.0, 332.0),
    ]);
    upsert_blueprint(&mut store, player("a", "archer", 272.0, 332.0)).unwrap();

    let saved = store.load().unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].class, "archer");
    assert_eq!(saved[1].id, CharacterId::new("b"));
}

#[test]
fn same_seed_same_fight() {
    let setup = || {
        let mut battle = two_vs_two(77);
        battle.start_fight();
        battle
    };
    assert_eq!(find_first_divergence(setup, 1500, FRAME_MS), None);
    run_parallel_battles_scoped(setup, 4, 1500, FRAME_MS).assert_deterministic();
}
