//! Headless arena round runner.
//!
//! Plays auto-battler rounds without graphics. Results go to stdout as
//! JSON; logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Play one round of a built-in scenario
//! cargo run -p arena_headless -- run --scenario duel --seed 7
//!
//! # Keep the player roster (and its experience) between runs
//! cargo run -p arena_headless -- run --scenario duel --roster saves/roster.json
//!
//! # Run batch balance test
//! cargo run -p arena_headless -- batch --scenario skirmish_2v2 --count 1000 --output results/
//!
//! # Verify determinism
//! cargo run -p arena_headless -- verify --scenario duel --seed 12345 --runs 5
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arena_core::store::load_or_empty;
use arena_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    runner::{run_round, run_round_with_store, PreparedScenario, RunConfig},
    store::JsonFileStore,
};

#[derive(Parser)]
#[command(name = "arena_headless")]
#[command(about = "Headless auto-battler round runner for balance testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single round and print its metrics
    Run {
        /// Built-in scenario name or scenario file
        #[arg(short, long, default_value = "duel")]
        scenario: String,

        /// Crit RNG seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Override the scenario's tick limit
        #[arg(long)]
        max_ticks: Option<u64>,

        /// Override the scenario's frame length in milliseconds
        #[arg(long)]
        delta_ms: Option<f32>,

        /// JSON roster file to load the player roster from and save it to
        #[arg(long)]
        roster: Option<PathBuf>,
    },

    /// Run batch of rounds for balance testing
    Batch {
        /// Scenario to run
        #[arg(short, long, default_value = "duel")]
        scenario: String,

        /// Number of rounds to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel rounds (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Override the scenario's tick limit
        #[arg(long)]
        max_ticks: Option<u64>,
    },

    /// Verify determinism by running same seed multiple times
    Verify {
        /// Scenario to test
        #[arg(short, long, default_value = "duel")]
        scenario: String,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Print a saved player roster
    Roster {
        /// JSON roster file
        #[arg(long)]
        store: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries results
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            seed,
            max_ticks,
            delta_ms,
            roster,
        } => cmd_run(&scenario, seed, max_ticks, delta_ms, roster),
        Commands::Batch {
            scenario,
            count,
            parallel,
            output,
            seed,
            max_ticks,
        } => cmd_batch(&scenario, count, parallel, output, seed, max_ticks),
        Commands::Verify {
            scenario,
            seed,
            runs,
        } => cmd_verify(&scenario, seed, runs),
        Commands::Roster { store } => cmd_roster(store),
    }
}

fn prepare(scenario: &str) -> PreparedScenario {
    match PreparedScenario::resolve(scenario) {
        Ok(prepared) => prepared,
        Err(e) => {
            eprintln!("Failed to load scenario '{}': {}", scenario, e);
            std::process::exit(1);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to encode output: {}", e);
            std::process::exit(1);
        }
    }
}

/// Play a single round
fn cmd_run(
    scenario: &str,
    seed: u64,
    max_ticks: Option<u64>,
    delta_ms: Option<f32>,
    roster: Option<PathBuf>,
) {
    let prepared = prepare(scenario);
    let mut config = RunConfig::from_scenario(&prepared.scenario, seed);
    if let Some(max_ticks) = max_ticks {
        config.max_ticks = max_ticks;
    }
    if let Some(delta_ms) = delta_ms {
        config.delta_ms = delta_ms;
    }

    tracing::info!(
        scenario = %prepared.scenario.name,
        seed,
        max_ticks = config.max_ticks,
        delta_ms = config.delta_ms,
        "Starting round"
    );

    let result = match &roster {
        Some(path) => run_round_with_store(&prepared, &config, path),
        None => run_round(&prepared, &config),
    };

    match result {
        Ok(metrics) => print_json(&metrics),
        Err(e) => {
            eprintln!("Round failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run batch of rounds for balance testing
fn cmd_batch(
    scenario: &str,
    count: u32,
    parallel: u32,
    output: PathBuf,
    seed: u64,
    max_ticks: Option<u64>,
) {
    let mut config = BatchConfig::new(scenario, count)
        .with_output(output.clone())
        .with_seed(seed)
        .with_parallel(parallel);
    if let Some(max_ticks) = max_ticks {
        config = config.with_max_ticks(max_ticks);
    }

    let num_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);

    tracing::info!(
        scenario = %scenario,
        count,
        parallel,
        seed,
        output = %output.display(),
        cpus_available = num_cpus,
        max_ticks = ?config.max_ticks,
        "Batch configuration"
    );

    if let Err(e) = std::fs::create_dir_all(&output) {
        tracing::error!(error = %e, path = %output.display(), "Failed to create output directory");
        eprintln!(
            "FATAL: Cannot create output directory '{}': {}",
            output.display(),
            e
        );
        std::process::exit(1);
    }

    let results = run_batch(config);

    let results_path = output.join("batch_results.json");
    if let Err(e) = results.save(&results_path) {
        tracing::error!(error = %e, path = %results_path.display(), "Failed to save results");
        eprintln!("FATAL: Failed to save results: {}", e);
        std::process::exit(1);
    }

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Rounds played: {}", results.rounds.len());
    if !results.errors.is_empty() {
        eprintln!("Rounds FAILED: {}", results.errors.len());
    }
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!(
        "Throughput: {:.1} rounds/sec",
        results.rounds.len() as f64 / results.duration_seconds.max(0.001)
    );
    eprintln!("\nWin Rates:");
    for (side, rate) in &results.summary.win_rates {
        eprintln!("  {}: {:.1}%", side, rate * 100.0);
    }
    eprintln!(
        "Draws: {}  Timeouts: {}",
        results.summary.draws, results.summary.timeouts
    );
    eprintln!(
        "Round length: avg {:.0} ticks (min {}, max {})",
        results.summary.avg_duration_ticks,
        results.summary.min_duration_ticks,
        results.summary.max_duration_ticks
    );

    if !results.errors.is_empty() {
        eprintln!("\nROUND FAILURES:");
        for error in results.errors.iter().take(10) {
            eprintln!(
                "  Round {} (seed {}): {}",
                error.round_index, error.seed, error.message
            );
        }
        if results.errors.len() > 10 {
            eprintln!("  ... and {} more failures", results.errors.len() - 10);
        }
    }

    eprintln!("\nResults saved to: {}", results_path.display());
}

/// Verify determinism
fn cmd_verify(scenario: &str, seed: u64, runs: u32) {
    tracing::info!(scenario, seed, runs, "Verifying determinism");

    let prepared = prepare(scenario);
    if verify_determinism(&prepared, seed, runs) {
        println!("PASS: {} runs of '{}' with seed {} agree", runs, scenario, seed);
    } else {
        println!("FAIL: runs of '{}' with seed {} diverged", scenario, seed);
        std::process::exit(1);
    }
}

/// Print a saved roster. An unreadable file lists as empty.
fn cmd_roster(store: PathBuf) {
    let store = JsonFileStore::new(store);
    let blueprints = load_or_empty(&store);
    if blueprints.is_empty() {
        eprintln!("No characters saved in {}", store.path().display());
    }
    print_json(&blueprints);
}
