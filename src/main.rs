//! Encounter Sim - command line entry point
//!
//! Loads a scenario, runs it for a number of days, writes the JSON output
//! and prints a summary.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use encounter_sim::core::error::{Result, SimError};
use encounter_sim::scenario::Scenario;

/// Batch simulation of encounters between building occupants
#[derive(Parser, Debug)]
#[command(name = "encounter-sim")]
#[command(about = "Simulate how building occupants encounter, greet and converse")]
struct Args {
    /// Scenario TOML file
    #[arg(long)]
    scenario: PathBuf,

    /// Number of days to simulate
    #[arg(long, default_value_t = 7)]
    days: u32,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Where to write the JSON output
    #[arg(long, default_value = "encounter_output.json")]
    output: PathBuf,

    /// Scheduling threads (defaults to one per core)
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("encounter_sim=info")),
        )
        .init();

    let args = Args::parse();

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| SimError::InvalidConfig(format!("thread pool: {}", e)))?;
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(scenario = %args.scenario.display(), days = args.days, seed, "starting");

    let scenario = Scenario::load(&args.scenario)?;
    let mut simulation = scenario.build(seed)?;
    let output = simulation.run(args.days);

    output.write_json(&args.output)?;
    println!("{}", output.summary());
    println!("Full output written to {}", args.output.display());

    Ok(())
}
