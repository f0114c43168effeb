//! Command implementations for promptstep.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the argument plumbing they share. Each command
//! returns the process exit code on success; a [`StepError`] means the step
//! could not be run at all.

mod config;
mod render;
mod replay;
mod run;

use crate::cli::{Command, ConfigArgs, ContextArgs, PromptArgs};
use crate::config::{ConfigOverrides, StepConfig};
use crate::error::{Result, StepError};
use crate::prompt::{BuildContext, merge_tech_stack, tech_stack_context};
use tracing::debug;

/// Dispatch a command to its implementation.
pub async fn dispatch(command: Command) -> Result<i32> {
    match command {
        Command::Run(args) => run::cmd_run(args).await,
        Command::Render(args) => render::cmd_render(args),
        Command::Config(args) => config::cmd_config(args),
        Command::Replay(args) => replay::cmd_replay(args),
    }
}

/// Read the prompt template from `--prompt` or `--prompt-file`.
fn load_template(args: &PromptArgs) -> Result<String> {
    if let Some(text) = &args.prompt {
        return Ok(text.clone());
    }

    let Some(path) = &args.prompt_file else {
        return Err(StepError::UserError(
            "one of --prompt or --prompt-file is required".to_string(),
        ));
    };

    std::fs::read_to_string(path).map_err(|e| {
        StepError::UserError(format!(
            "failed to read prompt file '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Assemble build variables.
///
/// Precedence, lowest first: environment, `tech_stack`, `--var`.
fn build_context(args: &ContextArgs) -> Result<BuildContext> {
    let explicit = BuildContext::from_var_args(&args.vars)?;

    let from_env = if args.env || !args.env_include.is_empty() {
        BuildContext::from_env(utf8_env_vars(), &args.env_include)?
    } else {
        BuildContext::new()
    };

    let requirements = match &args.requirements_file {
        Some(path) => Some(std::fs::read_to_string(path).map_err(|e| {
            StepError::UserError(format!(
                "failed to read requirements file '{}': {}",
                path.display(),
                e
            ))
        })?),
        None => None,
    };
    let stack = merge_tech_stack(&args.tech_stack, requirements.as_deref());

    debug!(
        env_vars = from_env.len(),
        explicit_vars = explicit.len(),
        tech_stack = ?stack,
        "Built prompt context"
    );
    Ok(from_env
        .merged_with(tech_stack_context(&stack))
        .merged_with(explicit))
}

/// The process environment, minus variables whose name or value is not
/// valid UTF-8. Those cannot appear in a prompt and are skipped.
fn utf8_env_vars() -> impl Iterator<Item = (String, String)> {
    std::env::vars_os().filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
        (Ok(key), Ok(value)) => Some((key, value)),
        (key, _) => {
            debug!(
                name = %key.unwrap_or_else(|k| k.to_string_lossy().into_owned()),
                "Skipping non-UTF-8 environment variable"
            );
            None
        }
    })
}

fn config_overrides(args: &ConfigArgs) -> ConfigOverrides {
    ConfigOverrides {
        endpoint: args.endpoint.clone(),
        timeout_ms: args.timeout_ms,
        max_retries: args.max_retries,
        backoff_base_ms: args.backoff_base_ms,
    }
}

/// Effective, validated configuration for these arguments.
fn load_config(args: &ConfigArgs) -> Result<StepConfig> {
    StepConfig::resolve(args.config.as_deref(), &config_overrides(args))
}
