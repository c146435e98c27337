mod cli;

use clap::{Parser, crate_version};
use ems_planner::{
    config::Config,
    core::optimizer::{optimize, simulate},
    prelude::*,
    tables::{build_statistics_table, build_steps_table, build_summary_table},
};

use crate::cli::{Args, Command};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();
    let mut setup =
        Config::read_from(&args.config)?.try_into_setup().context("invalid configuration")?;

    match args.command {
        Command::Optimize(args) => {
            args.search.apply_to(&mut setup.search);
            let plan = optimize(&setup.problem, &setup.search, setup.start_solution.as_ref())?;
            if args.output.json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                println!("{}", build_steps_table(&plan.trajectory));
                println!("{}", build_summary_table(&plan.costs));
                println!("{}", build_statistics_table(&plan));
            }
            for warning in &plan.warnings {
                warn!(%warning, "check the plan before applying it");
            }
        }
        Command::Simulate(args) => {
            let candidate =
                setup.start_solution.context("`start_solution` is required to simulate")?;
            let simulation = simulate(&setup.problem, &candidate)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&simulation)?);
            } else {
                println!("{}", build_steps_table(&simulation.steps));
                println!("{}", build_summary_table(&simulation.summary));
            }
        }
    }

    info!("done!");
    Ok(())
}
