//! Implementation of the `promptstep config` command.

use super::load_config;
use crate::cli::ConfigArgs;
use crate::error::Result;
use crate::exit_codes;

/// Print the effective, validated configuration as YAML.
pub fn cmd_config(args: ConfigArgs) -> Result<i32> {
    let config = load_config(&args)?;
    print!("{}", config.to_yaml()?);
    Ok(exit_codes::SUCCESS)
}
