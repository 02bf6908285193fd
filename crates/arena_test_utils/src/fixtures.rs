//! Test fixtures and helpers.
//!
//! Pre-built battles and blueprints for consistent testing.

use arena_core::prelude::*;

/// Frame length used by fixtures and harnesses, in milliseconds.
pub const FRAME_MS: f32 = 16.0;

/// Built-in classes plus `dummy`, a base-stat class that never crits.
#[must_use]
pub fn registry() -> ClassRegistry {
    let mut classes = ClassRegistry::builtin();
    classes.register(ClassData::new("dummy").with_stats(StatBlock {
        crit_chance: 0.0,
        ..StatBlock::default()
    }));
    classes
}

/// Level 1 player blueprint standing at `(x, y)`.
///
/// # Panics
///
/// Panics if `class` is not in [`registry`].
#[must_use]
pub fn player(id: &str, class: &str, x: f32, y: f32) -> Blueprint {
    let classes = registry();
    let class = classes
        .get(class)
        .unwrap_or_else(|e| panic!("fixture class: {e}"));
    Blueprint::from_class(id, class)
        .for_player()
        .at(Vec2::new(x, y))
}

/// Level 1 enemy blueprint. Its position is assigned at spawn.
///
/// # Panics
///
/// Panics if `class` is not in [`registry`].
#[must_use]
pub fn enemy(id: &str, class: &str) -> Blueprint {
    let classes = registry();
    let class = classes
        .get(class)
        .unwrap_or_else(|e| panic!("fixture class: {e}"));
    Blueprint::from_class(id, class)
}

/// Idle battle with empty rosters.
#[must_use]
pub fn empty_battle(seed: u64) -> Battle {
    Battle::new(BattleConfig::default().with_seed(seed), registry())
}

/// Player class against enemy class, one each.
///
/// The player stands on the board's front row, under the first spawn slot.
///
/// # Panics
///
/// Panics if either class is not in [`registry`].
#[must_use]
pub fn duel(player_class: &str, enemy_class: &str, seed: u64) -> Battle {
    let mut battle = empty_battle(seed);
    battle
        .add_character(&player("p1", player_class, 657.0, 332.0))
        .unwrap_or_else(|e| panic!("fixture player: {e}"));
    battle
        .spawn_enemy(&enemy("e1", enemy_class))
        .unwrap_or_else(|e| panic!("fixture enemy: {e}"));
    battle
}

/// Knight and archer against rogue and archer.
///
/// # Panics
///
/// Panics if the fixture roster cannot be built.
#[must_use]
pub fn two_vs_two(seed: u64) -> Battle {
    let mut battle = empty_battle(seed);
    let grid = battle.config().grid;
    let roster = [("p1", "knight", Cell::new(6, 0)), ("p2", "archer", Cell::new(7, 2))];
    for (id, class, cell) in roster {
        let center = grid
            .cell_to_center(cell)
            .unwrap_or_else(|e| panic!("fixture cell: {e}"));
        battle
            .add_character(&player(id, class, center.x, center.y))
            .unwrap_or_else(|e| panic!("fixture player: {e}"));
    }
    for (id, class) in [("e1", "rogue"), ("e2", "archer")] {
        battle
            .spawn_enemy(&enemy(id, class))
            .unwrap_or_else(|e| panic!("fixture enemy: {e}"));
    }
    battle
}

/// `size` players against `size` enemies, cycling through the built-in
/// classes.
///
/// # Panics
///
/// Panics if the fixture roster cannot be built.
#[must_use]
pub fn skirmish(size: usize, seed: u64) -> Battle {
    const CLASSES: [&str; 3] = ["knight", "rogue", "archer"];

    let mut battle = empty_battle(seed);
    let grid = battle.config().grid;
    for i in 0..size {
        let cell = Cell::new(
            (i as u32 % grid.cols) as i32,
            ((i as u32 / grid.cols) % grid.rows) as i32,
        );
        let center = grid
            .cell_to_center(cell)
            .unwrap_or_else(|e| panic!("fixture cell: {e}"));
        let class = CLASSES[i % CLASSES.len()];
        battle
            .add_character(&player(&format!("p{i}"), class, center.x, center.y))
            .unwrap_or_else(|e| panic!("fixture player: {e}"));
        battle
            .spawn_enemy(&enemy(&format!("e{i}"), CLASSES[(i + 1) % CLASSES.len()]))
            .unwrap_or_else(|e| panic!("fixture enemy: {e}"));
    }
    battle
}

/// Roster store that keeps the saved roster as RON text in memory.
///
/// Saving and loading go through the same serialization a file store
/// would, so tests catch blueprints that do not survive a round trip.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub saved: Option<String>,
    /// Make every load fail, as a corrupt file would.
    pub fail_loads: bool,
    /// Number of successful saves.
    pub saves: usize,
}

impl MemoryStore {
    /// Create a store that already holds `blueprints`.
    ///
    /// # Panics
    ///
    /// Panics if the blueprints cannot be serialized.
    #[must_use]
    pub fn with_roster(blueprints: &[Blueprint]) -> Self {
        let mut store = Self::default();
        store
            .save(blueprints)
            .unwrap_or_else(|e| panic!("fixture store: {e}"));
        store.saves = 0;
        store
    }

    /// Raw saved text, if anything was saved.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.saved.as_deref()
    }
}

impl RosterStore for MemoryStore {
    fn load(&self) -> Result<Vec<Blueprint>> {
        if self.fail_loads {
            return Err(ArenaError::Persistence("simulated read failure".into()));
        }
        match &self.saved {
            Some(text) => ron::from_str(text).map_err(|e| ArenaError::Persistence(e.to_string())),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, blueprints: &[Blueprint]) -> Result<()> {
        let text =
            ron::to_string(&blueprints).map_err(|e| ArenaError::Persistence(e.to_string()))?;
        self.saved = Some(text);
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_rosters() {
        let battle = two_vs_two(1);
        assert_eq!(battle.players().len(), 2);
        assert_eq!(battle.enemies().len(), 2);
        assert_eq!(battle.fight_state(), FightState::Idle);

        let battle = skirmish(4, 1);
        assert_eq!(battle.players().len(), 4);
        assert_eq!(battle.enemies().len(), 4);
    }

    #[test]
    fn test_memory_store_round_trip() {
        let roster = vec![player("a", "knight", 300.0, 500.0), player("b", "archer", 364.0, 500.0)];
        let store = MemoryStore::with_roster(&roster);
        assert_eq!(store.load().unwrap(), roster);
        assert_eq!(store.saves, 0);
    }

    #[test]
    fn test_memory_store_empty_and_failing() {
        let mut store = MemoryStore::default();
        assert!(store.load().unwrap().is_empty());

        store.fail_loads = true;
        assert!(matches!(store.load(), Err(ArenaError::Persistence(_))));
    }
}
