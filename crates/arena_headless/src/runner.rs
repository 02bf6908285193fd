//! Single-round headless runner.
//!
//! Builds a battle from a [`Scenario`], starts the fight, and advances it
//! with fixed frames until a side is wiped or the tick limit is reached.

use std::path::Path;

use arena_core::prelude::*;
use std::result::Result;
use arena_core::store::load_or_empty;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::class_loader::{load_classes, ClassLoadError};
use crate::metrics::{MetricsCollector, RoundEnd, RoundMetrics};
use crate::scenario::{Scenario, ScenarioError};
use crate::store::JsonFileStore;

/// Errors from a headless run.
#[derive(Error, Debug)]
pub enum RunError {
    /// Scenario could not be loaded or built.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    /// Class table could not be loaded.
    #[error(transparent)]
    Classes(#[from] ClassLoadError),
    /// The battle rejected a command.
    #[error(transparent)]
    Arena(#[from] ArenaError),
}

/// Per-run overrides of the scenario's limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunConfig {
    /// Crit RNG seed.
    pub seed: u64,
    /// Tick limit.
    pub max_ticks: u64,
    /// Frame length in milliseconds.
    pub delta_ms: f32,
}

impl RunConfig {
    /// Limits taken from the scenario, with the given seed.
    #[must_use]
    pub fn from_scenario(scenario: &Scenario, seed: u64) -> Self {
        Self {
            seed,
            max_ticks: scenario.max_ticks,
            delta_ms: scenario.delta_ms,
        }
    }
}

/// A scenario paired with its loaded class table.
#[derive(Debug, Clone)]
pub struct PreparedScenario {
    /// The scenario.
    pub scenario: Scenario,
    /// Classes the scenario's rosters refer to.
    pub classes: ClassRegistry,
}

impl PreparedScenario {
    /// Resolve a built-in name or scenario file and load its class table.
    pub fn resolve(name_or_path: &str) -> Result<Self, RunError> {
        let scenario = Scenario::resolve(name_or_path)?;
        Self::from_scenario(scenario)
    }

    /// Load the class table a scenario names.
    pub fn from_scenario(scenario: Scenario) -> Result<Self, RunError> {
        let classes = load_classes(scenario.classes_path().as_deref())?;
        info!(
            scenario = %scenario.name,
            classes = classes.len(),
            "Scenario prepared"
        );
        Ok(Self { scenario, classes })
    }

    /// Build a fresh idle battle for `seed`.
    pub fn battle(&self, seed: u64) -> Result<Battle, RunError> {
        Ok(self.scenario.build_battle(&self.classes, seed)?)
    }
}

/// Play one round of an already built battle.
pub fn play(scenario_name: &str, battle: &mut Battle, config: &RunConfig) -> RoundMetrics {
    let mut collector = MetricsCollector::new(scenario_name, battle);
    battle.start_fight();

    let start_ms = battle.clock_ms();
    let mut ticks = 0;
    while ticks < config.max_ticks {
        let events = battle.advance(config.delta_ms);
        ticks += 1;
        collector.observe(&events);
        if let Some(winner) = events.round_result() {
            debug!(seed = config.seed, ticks, winner = ?winner, "Round finished");
            return collector.finish(battle, ticks, battle.clock_ms() - start_ms, RoundEnd::Wipe);
        }
    }

    warn!(seed = config.seed, ticks, "Round hit the tick limit");
    let duration_ms = battle.clock_ms() - start_ms;
    battle.stop_fight();
    collector.finish(battle, ticks, duration_ms, RoundEnd::Timeout)
}

/// Build and play one round of a prepared scenario.
pub fn run_round(prepared: &PreparedScenario, config: &RunConfig) -> Result<RoundMetrics, RunError> {
    let mut battle = prepared.battle(config.seed)?;
    Ok(play(&prepared.scenario.name, &mut battle, config))
}

/// Play one round with the player roster kept in a JSON store.
///
/// If the store holds a roster it replaces the scenario's players. After the
/// round the player roster, including any experience gained, is saved back.
pub fn run_round_with_store(
    prepared: &PreparedScenario,
    config: &RunConfig,
    store_path: &Path,
) -> Result<RoundMetrics, RunError> {
    let mut store = JsonFileStore::new(store_path);
    let mut battle = prepared.battle(config.seed)?;

    let saved = load_or_empty(&store);
    if saved.is_empty() {
        info!(path = %store_path.display(), "No saved roster, using scenario players");
    } else {
        let loaded = battle.load_player_roster(&saved);
        info!(path = %store_path.display(), loaded, "Using saved roster");
    }
    battle.take_events();

    let metrics = play(&prepared.scenario.name, &mut battle, config);
    store.save(&battle.player_blueprints())?;
    Ok(metrics)
}
