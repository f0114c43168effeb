//! Entry point for the `promptstep` CLI.
//!
//! Parses arguments, initializes logging on stderr, dispatches to the
//! command handler, and maps the outcome to the process exit code.

use promptstep::cli::Cli;
use promptstep::logging::{LoggingConfig, init_logging};
use promptstep::{commands, exit_codes};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_logging(LoggingConfig::from_env(cli.verbose));

    match commands::dispatch(cli.command).await {
        Ok(code) => exit_code(code),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);
            exit_code(err.exit_code())
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(exit_codes::USER_ERROR as u8))
}
