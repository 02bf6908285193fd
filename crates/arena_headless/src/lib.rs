//! Headless round runner for balance testing and CI verification.
//!
//! This crate drives `arena_core` battles without a renderer:
//!
//! - **Scenarios**: RON files naming the class table and both rosters
//! - **Batch runs**: many seeds in parallel, summarised as win rates
//! - **Determinism checks**: the same seed must replay to the same hash
//! - **Roster persistence**: a JSON file store for the player roster
//!
//! # Example
//!
//! ```bash
//! # Play one round and print its metrics as JSON
//! cargo run -p arena_headless -- run --scenario duel --seed 7
//!
//! # Run a batch balance test
//! cargo run -p arena_headless -- batch --scenario skirmish_2v2 --count 500
//!
//! # Verify determinism
//! cargo run -p arena_headless -- verify --scenario duel --runs 5
//! ```

pub mod batch;
pub mod class_loader;
pub mod metrics;
pub mod runner;
pub mod scenario;
pub mod store;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults};
pub use class_loader::{load_classes, ClassLoadError};
pub use metrics::{BatchSummary, MetricsCollector, RoundEnd, RoundMetrics};
pub use runner::{run_round, run_round_with_store, PreparedScenario, RunConfig, RunError};
pub use scenario::{Scenario, ScenarioError};
pub use store::JsonFileStore;
