//! Entry point for the `ecoroute` command.
#![forbid(unsafe_code)]

use std::process::ExitCode;

use ecoroute_cli::CliError;

/// Exit status for failures worth retrying (`EX_TEMPFAIL`).
const EXIT_RETRYABLE: u8 = 75;

fn main() -> ExitCode {
    env_logger::init();
    match ecoroute_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("ecoroute: {err}");
            if err.is_retryable() {
                ExitCode::from(EXIT_RETRYABLE)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
