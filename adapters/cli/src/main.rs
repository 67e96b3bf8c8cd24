#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Rail Slide round.

mod simulation;

use anyhow::Result;
use clap::Parser;

use crate::simulation::{Simulation, SimulationConfig};

/// Runs a seeded round with random slides and prints a summary.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Seed for the board shuffle, slides and spawn draws.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Maximum number of ticks to simulate.
    #[arg(long, default_value_t = 2_000)]
    ticks: u32,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,
    /// Number of random slides spread over the run.
    #[arg(long, default_value_t = 10)]
    slides: u32,
    /// Use the unshuffled title board instead of a shuffled one.
    #[arg(long)]
    title_layout: bool,
}

/// Entry point for the Rail Slide command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut simulation = Simulation::new(SimulationConfig {
        seed: cli.seed,
        ticks: cli.ticks,
        tick_ms: cli.tick_ms,
        slides: cli.slides,
        title_layout: cli.title_layout,
    })?;
    let summary = simulation.run()?;
    println!("{summary}");
    Ok(())
}
