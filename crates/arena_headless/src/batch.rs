//! Batch round runner for balance testing.
//!
//! Runs many seeds of one scenario in parallel using rayon and folds the
//! results into a [`BatchSummary`].

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::metrics::{BatchSummary, RoundMetrics};
use crate::runner::{run_round, PreparedScenario, RunConfig};
use crate::scenario::Scenario;

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Built-in scenario name or scenario file
    pub scenario: String,
    /// Number of rounds to run
    pub round_count: u32,
    /// Maximum parallel rounds (0 = use rayon default)
    pub parallel: u32,
    /// First seed; round `i` uses `seed_start + i`
    pub seed_start: u64,
    /// Tick limit per round (None = the scenario's own limit)
    pub max_ticks: Option<u64>,
    /// Frame length in milliseconds (None = the scenario's own frame)
    pub delta_ms: Option<f32>,
    /// Output directory for results
    pub output_dir: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenario: "duel".to_string(),
            round_count: 100,
            parallel: 0,
            seed_start: 0,
            max_ticks: None,
            delta_ms: None,
            output_dir: PathBuf::from("results"),
        }
    }
}

impl BatchConfig {
    /// Create config for a specific scenario
    pub fn new(scenario: &str, round_count: u32) -> Self {
        Self {
            scenario: scenario.to_string(),
            round_count,
            ..Default::default()
        }
    }

    /// Set output directory
    #[must_use]
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set the tick limit
    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    /// Set the thread count
    #[must_use]
    pub fn with_parallel(mut self, parallel: u32) -> Self {
        self.parallel = parallel;
        self
    }

    fn run_config(&self, scenario: &Scenario, seed: u64) -> RunConfig {
        RunConfig {
            seed,
            max_ticks: self.max_ticks.unwrap_or(scenario.max_ticks),
            delta_ms: self.delta_ms.unwrap_or(scenario.delta_ms),
        }
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual round metrics, in seed order
    pub rounds: Vec<RoundMetrics>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Error during batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    /// Round index
    pub round_index: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Run a batch of rounds
pub fn run_batch(config: BatchConfig) -> BatchResults {
    let start = Instant::now();

    info!(
        "Starting batch run: {} rounds of '{}'",
        config.round_count, config.scenario
    );

    let prepared = match PreparedScenario::resolve(&config.scenario) {
        Ok(prepared) => prepared,
        Err(e) => {
            warn!("Failed to prepare scenario '{}': {}", config.scenario, e);
            let errors = (0..config.round_count)
                .map(|i| BatchError {
                    round_index: i,
                    seed: config.seed_start.wrapping_add(u64::from(i)),
                    message: e.to_string(),
                })
                .collect();
            return BatchResults {
                config,
                rounds: Vec::new(),
                summary: BatchSummary::default(),
                duration_seconds: start.elapsed().as_secs_f64(),
                errors,
            };
        }
    };

    // Configure thread pool if specified
    if config.parallel > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let completed = AtomicU32::new(0);
    let results: Vec<Result<RoundMetrics, BatchError>> = (0..config.round_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));
            match run_round(&prepared, &config.run_config(&prepared.scenario, seed)) {
                Ok(metrics) => {
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if done % 10 == 0 {
                        debug!("Progress: {}/{}", done, config.round_count);
                    }
                    Ok(metrics)
                }
                Err(e) => {
                    warn!("Round {} failed: {}", i, e);
                    Err(BatchError {
                        round_index: i,
                        seed,
                        message: e.to_string(),
                    })
                }
            }
        })
        .collect();

    let (rounds, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let rounds: Vec<RoundMetrics> = rounds.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_rounds(&rounds);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} rounds in {:.1}s ({:.1} rounds/sec)",
        rounds.len(),
        duration_seconds,
        rounds.len() as f64 / duration_seconds.max(f64::EPSILON)
    );

    BatchResults {
        config,
        rounds,
        summary,
        duration_seconds,
        errors,
    }
}

/// Verify determinism by running the same seed several times.
///
/// Every run must agree on winner, length, and final state hash.
pub fn verify_determinism(prepared: &PreparedScenario, seed: u64, runs: u32) -> bool {
    let config = RunConfig::from_scenario(&prepared.scenario, seed);
    let mut first: Option<RoundMetrics> = None;

    for run in 0..runs.max(1) {
        let metrics = match run_round(prepared, &config) {
            Ok(metrics) => metrics,
            Err(e) => {
                warn!(run, error = %e, "Verification run failed");
                return false;
            }
        };
        match &first {
            None => first = Some(metrics),
            Some(expected) => {
                if metrics.final_state_hash != expected.final_state_hash
                    || metrics.winner != expected.winner
                    || metrics.duration_ticks != expected.duration_ticks
                {
                    warn!(
                        run,
                        expected = expected.final_state_hash,
                        actual = metrics.final_state_hash,
                        "Determinism check failed"
                    );
                    return false;
                }
            }
        }
    }

    true
}
