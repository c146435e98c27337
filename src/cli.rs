use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use ems_planner::core::genetic::SearchConfig;

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    /// TOML configuration with the horizon, the assets, and the forecast.
    #[clap(long = "config", env = "EMS_CONFIG", default_value = "ems.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Search for the cheapest plan and print it.
    #[clap(name = "optimize")]
    Optimize(Box<OptimizeArgs>),

    /// Replay the configured start solution without searching.
    #[clap(name = "simulate")]
    Simulate(OutputArgs),
}

#[derive(Parser)]
pub struct OptimizeArgs {
    #[clap(flatten)]
    pub search: SearchArgs,

    #[clap(flatten)]
    pub output: OutputArgs,
}

/// Overrides of the `[search]` table.
#[derive(Parser)]
pub struct SearchArgs {
    /// Random seed for a reproducible search.
    #[clap(long = "seed", env = "EMS_SEED")]
    pub seed: Option<u64>,

    /// Number of evaluation threads.
    #[clap(long = "workers", env = "EMS_WORKERS")]
    pub workers: Option<usize>,

    /// Maximum number of generations.
    #[clap(long = "generations")]
    pub generations: Option<usize>,

    #[clap(long = "population")]
    pub population_size: Option<usize>,

    /// Stop after this many generations without an improvement.
    #[clap(long = "patience")]
    pub patience: Option<usize>,

    /// Return the best plan found so far after this time, for example `30s`.
    #[clap(long = "timeout", env = "EMS_TIMEOUT", value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,
}

impl SearchArgs {
    pub fn apply_to(&self, config: &mut SearchConfig) {
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(generations) = self.generations {
            config.generations = generations;
        }
        if let Some(population_size) = self.population_size {
            config.population_size = population_size;
        }
        if let Some(patience) = self.patience {
            config.patience = Some(patience);
        }
        if let Some(timeout) = self.timeout {
            config.timeout = Some(timeout);
        }
    }
}

#[derive(Parser)]
pub struct OutputArgs {
    /// Print JSON instead of the tables.
    #[clap(long = "json")]
    pub json: bool,
}
