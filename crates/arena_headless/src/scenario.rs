//! Scenario loading and configuration.
//!
//! A scenario names the battle constants, the class table, both starting
//! rosters, and how long a headless round may run.
//!
//! ```ron
//! Scenario(
//!     name: "Duel",
//!     classes: Some("../assets/data/classes.ron"),
//!     players: [(id: "hero", class: "rogue", cell: (4, 0))],
//!     enemies: [(id: "brute", class: "knight")],
//! )
//! ```

use std::path::{Path, PathBuf};

use arena_core::prelude::*;
use std::result::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default tick limit for a headless round (10 minutes of 16 ms frames).
pub const DEFAULT_MAX_TICKS: u64 = 37_500;

/// Default frame length in milliseconds.
pub const DEFAULT_DELTA_MS: f32 = 16.0;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The scenario's rosters could not be built.
    #[error("Invalid scenario roster: {0}")]
    Roster(#[from] ArenaError),
}

/// A player character placed on a board cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSetup {
    /// Character ID.
    pub id: String,
    /// Class name.
    pub class: String,
    /// Board cell as `(col, row)`.
    pub cell: (i32, i32),
    /// Starting level. Levels above 1 apply the class's level-up deltas.
    #[serde(default = "first_level")]
    pub level: u32,
}

const fn first_level() -> u32 {
    1
}

/// An enemy, spawned into the next free slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySetup {
    /// Character ID.
    pub id: String,
    /// Class name.
    pub class: String,
}

/// A complete scenario configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Battle constants. The seed is overridden per run.
    #[serde(default)]
    pub config: BattleConfig,
    /// Class table file or directory, relative to the scenario file.
    /// `None` uses the built-in classes.
    #[serde(default)]
    pub classes: Option<PathBuf>,
    /// Player roster.
    pub players: Vec<PlayerSetup>,
    /// Enemy roster, in spawn order.
    pub enemies: Vec<EnemySetup>,
    /// Tick limit before a round counts as a timeout.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
    /// Frame length in milliseconds.
    #[serde(default = "default_delta_ms")]
    pub delta_ms: f32,
    /// Directory the scenario was loaded from.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

const fn default_max_ticks() -> u64 {
    DEFAULT_MAX_TICKS
}

const fn default_delta_ms() -> f32 {
    DEFAULT_DELTA_MS
}

impl Default for Scenario {
    fn default() -> Self {
        Self::duel()
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let mut scenario: Scenario = ron::from_str(&contents)?;
        scenario.base_dir = path.parent().map(Path::to_path_buf);
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Resolve a built-in scenario name or a path to a RON file.
    pub fn resolve(name_or_path: &str) -> Result<Self, ScenarioError> {
        match name_or_path {
            "duel" => Ok(Self::duel()),
            "skirmish_2v2" => Ok(Self::skirmish_2v2()),
            path => Self::load(path),
        }
    }

    /// A level 2 rogue against a fresh knight.
    #[must_use]
    pub fn duel() -> Self {
        Self {
            name: "duel".to_string(),
            description: "A seasoned rogue against one knight".to_string(),
            config: BattleConfig::default(),
            classes: None,
            players: vec![PlayerSetup {
                id: "hero".to_string(),
                class: "rogue".to_string(),
                cell: (6, 0),
                level: 2,
            }],
            enemies: vec![EnemySetup {
                id: "brute".to_string(),
                class: "knight".to_string(),
            }],
            max_ticks: DEFAULT_MAX_TICKS,
            delta_ms: DEFAULT_DELTA_MS,
            base_dir: None,
        }
    }

    /// Knight and archer against rogue and archer.
    #[must_use]
    pub fn skirmish_2v2() -> Self {
        Self {
            name: "skirmish_2v2".to_string(),
            description: "Mixed melee and ranged on both sides".to_string(),
            players: vec![
                PlayerSetup {
                    id: "p_knight".to_string(),
                    class: "knight".to_string(),
                    cell: (6, 0),
                    level: 1,
                },
                PlayerSetup {
                    id: "p_archer".to_string(),
                    class: "archer".to_string(),
                    cell: (7, 2),
                    level: 1,
                },
            ],
            enemies: vec![
                EnemySetup {
                    id: "e_rogue".to_string(),
                    class: "rogue".to_string(),
                },
                EnemySetup {
                    id: "e_archer".to_string(),
                    class: "archer".to_string(),
                },
            ],
            ..Self::duel()
        }
    }

    /// Class table path resolved against the scenario's directory.
    #[must_use]
    pub fn classes_path(&self) -> Option<PathBuf> {
        self.classes.as_ref().map(|path| match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.clone(),
        })
    }

    /// Player blueprints, before placement assigns board positions.
    pub fn player_blueprints(&self, classes: &ClassRegistry) -> Result<Vec<Blueprint>, ArenaError> {
        self.players
            .iter()
            .map(|setup| {
                let class = classes.get(&setup.class)?;
                let mut blueprint = Blueprint::from_class(setup.id.as_str(), class).for_player();
                for _ in 1..setup.level.max(1) {
                    class.level_up.apply(&mut blueprint.stats);
                }
                blueprint.progression.level = setup.level.max(1);
                Ok(blueprint)
            })
            .collect()
    }

    /// Build an idle battle with both rosters in place.
    pub fn build_battle(&self, classes: &ClassRegistry, seed: u64) -> Result<Battle, ScenarioError> {
        let config = self.config.clone().with_seed(seed);
        let mut battle = Battle::new(config, classes.clone());

        for (setup, blueprint) in self.players.iter().zip(self.player_blueprints(classes)?) {
            battle.place_character(&blueprint, Cell::new(setup.cell.0, setup.cell.1))?;
        }
        for setup in &self.enemies {
            let blueprint = Blueprint::from_class(setup.id.as_str(), classes.get(&setup.class)?);
            battle.spawn_enemy(&blueprint)?;
        }
        battle.take_events();

        Ok(battle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_scenarios_build() {
        let classes = ClassRegistry::builtin();
        for scenario in [Scenario::duel(), Scenario::skirmish_2v2()] {
            let battle = scenario.build_battle(&classes, 1).unwrap();
            assert_eq!(battle.players().len(), scenario.players.len());
            assert_eq!(battle.enemies().len(), scenario.enemies.len());
            assert_eq!(battle.config().seed, 1);
        }
    }

    #[test]
    fn test_from_ron_defaults() {
        let scenario = Scenario::from_ron_str(
            r#"(
                name: "tiny",
                players: [(id: "a", class: "knight", cell: (0, 0), level: 3)],
                enemies: [(id: "b", class: "rogue")],
            )"#,
        )
        .unwrap();

        assert_eq!(scenario.max_ticks, DEFAULT_MAX_TICKS);
        assert_eq!(scenario.delta_ms, DEFAULT_DELTA_MS);
        assert!(scenario.classes.is_none());

        let blueprints = scenario
            .player_blueprints(&ClassRegistry::builtin())
            .unwrap();
        assert_eq!(blueprints[0].progression.level, 3);
        assert_eq!(blueprints[0].stats.max_health, 200.0);
    }

    #[test]
    fn test_unknown_class_is_reported() {
        let mut scenario = Scenario::duel();
        scenario.enemies[0].class = "dragon".to_string();
        let err = scenario
            .build_battle(&ClassRegistry::builtin(), 0)
            .unwrap_err();
        assert!(matches!(err, ScenarioError::Roster(ArenaError::UnknownClass(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = Scenario::load("does/not/exist.ron").unwrap_err();
        assert!(matches!(err, ScenarioError::FileNotFound(_)));
    }

    #[test]
    fn test_shipped_scenarios_build() {
        for file in ["duel.ron", "skirmish_2v2.ron", "paladin_line.ron"] {
            let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file);
            let scenario = Scenario::load(&path).unwrap();
            let classes =
                crate::class_loader::load_classes(scenario.classes_path().as_deref()).unwrap();
            let battle = scenario.build_battle(&classes, 3).unwrap();
            assert_eq!(battle.enemies().len(), scenario.enemies.len(), "{file}");
        }
    }

    #[test]
    fn test_shipped_duel_matches_builtin() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/duel.ron");
        let shipped = Scenario::load(path).unwrap();
        let builtin = Scenario::duel();
        assert_eq!(shipped.players, builtin.players);
        assert_eq!(shipped.enemies, builtin.enemies);
    }

    #[test]
    fn test_classes_path_is_relative_to_scenario() {
        let mut scenario = Scenario::duel();
        scenario.classes = Some(PathBuf::from("classes.ron"));
        scenario.base_dir = Some(PathBuf::from("scenarios"));
        assert_eq!(
            scenario.classes_path(),
            Some(PathBuf::from("scenarios/classes.ron"))
        );
    }
}
