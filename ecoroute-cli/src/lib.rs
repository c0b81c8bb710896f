//! Command-line interface for solving Ecoroute delivery plans.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod plan;
mod solve;

pub use error::CliError;

use solve::SolveArgs;

const ARG_SOLVE_PLAN: &str = "plan";
const ARG_SOLVE_API_KEY: &str = "api-key";
const ARG_SOLVE_DISTANCE_URL: &str = "distance-url";
const ARG_SOLVE_METRIC: &str = "metric";
const ARG_SOLVE_TIME_LIMIT: &str = "time-limit-ms";
const ARG_SOLVE_OUTPUT: &str = "output";
const ENV_SOLVE_PLAN: &str = "ECOROUTE_CMDS_SOLVE_PLAN_PATH";
const ENV_SOLVE_API_KEY: &str = "ECOROUTE_CMDS_SOLVE_API_KEY";

/// Run the Ecoroute CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Solve(args) => solve::run_solve(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "ecoroute",
    about = "Capacitated delivery routing for a single-depot fleet",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan vehicle routes for a JSON delivery plan.
    Solve(SolveArgs),
}

#[cfg(test)]
mod tests;
