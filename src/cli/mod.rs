//! CLI argument parsing for promptstep.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Promptstep: a build step that sends a prompt to a text-generation endpoint.
///
/// The prompt template is resolved against build variables, sent with a
/// timeout and bounded retries, and the outcome is written to stdout as one
/// JSON record. The exit code is the pass/fail signal.
#[derive(Parser, Debug)]
#[command(name = "promptstep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for promptstep.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the step: resolve the prompt, call the endpoint, record the result.
    ///
    /// Exits 0 on success, 2 when the step fails, 130 when interrupted.
    Run(RunArgs),

    /// Resolve the prompt template and print it. No network access.
    Render(RenderArgs),

    /// Print the effective configuration as YAML.
    Config(ConfigArgs),

    /// Summarize records from a build log and exit with the last one's status.
    Replay(ReplayArgs),
}

/// Where the prompt template comes from.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct PromptArgs {
    /// Prompt template text, e.g. "Summarize {{file}}".
    #[arg(long)]
    pub prompt: Option<String>,

    /// Read the prompt template from a file.
    #[arg(long, value_name = "PATH")]
    pub prompt_file: Option<PathBuf>,
}

/// Build variables available to `{{placeholders}}`.
#[derive(Args, Debug, Clone, Default)]
pub struct ContextArgs {
    /// Set a variable (repeatable).
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// Expose environment variables as build variables.
    #[arg(long)]
    pub env: bool,

    /// Only expose environment variables matching these globs (implies --env).
    #[arg(long = "env-include", value_name = "GLOB")]
    pub env_include: Vec<String>,

    /// Name a technology for `{{tech_stack}}` (repeatable).
    #[arg(long = "tech-stack", value_name = "NAME")]
    pub tech_stack: Vec<String>,

    /// Detect build-tool keywords in this file and add them to `{{tech_stack}}`.
    #[arg(long, value_name = "PATH")]
    pub requirements_file: Option<PathBuf>,
}

/// Config file and overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to the YAML config file.
    #[arg(long, value_name = "PATH", env = "PROMPTSTEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Endpoint URL.
    #[arg(long, env = "PROMPTSTEP_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Per-attempt timeout in milliseconds.
    #[arg(long, env = "PROMPTSTEP_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Retries after the first attempt.
    #[arg(long, env = "PROMPTSTEP_MAX_RETRIES")]
    pub max_retries: Option<u32>,

    /// Delay before the first retry in milliseconds.
    #[arg(long, env = "PROMPTSTEP_BACKOFF_BASE_MS")]
    pub backoff_base_ms: Option<u64>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub prompt: PromptArgs,

    #[command(flatten)]
    pub context: ContextArgs,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Also append the record to this file (parent directories are created).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub prompt: PromptArgs,

    #[command(flatten)]
    pub context: ContextArgs,

    /// List placeholders and report unresolved ones instead of printing.
    #[arg(long)]
    pub check: bool,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Build log containing record lines.
    pub log_file: PathBuf,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_run_minimal() {
        let cli = Cli::try_parse_from([
            "promptstep",
            "run",
            "--prompt",
            "Say hi to {{who}}",
            "--var",
            "who=Sam",
            "--endpoint",
            "http://localhost:8080/generate",
        ])
        .unwrap();

        assert!(!cli.verbose);
        if let Command::Run(args) = cli.command {
            assert_eq!(args.prompt.prompt.as_deref(), Some("Say hi to {{who}}"));
            assert_eq!(args.context.vars, vec!["who=Sam"]);
            assert!(!args.context.env);
            assert_eq!(
                args.config.endpoint.as_deref(),
                Some("http://localhost:8080/generate")
            );
            assert!(args.log_file.is_none());
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_run_full() {
        let cli = Cli::try_parse_from([
            "promptstep",
            "-v",
            "run",
            "--prompt-file",
            "prompt.txt",
            "--var",
            "a=1",
            "--var",
            "b=2",
            "--env-include",
            "CI_*",
            "--config",
            "step.yaml",
            "--timeout-ms",
            "500",
            "--max-retries",
            "0",
            "--backoff-base-ms",
            "10",
            "--log-file",
            "out/build.log",
        ])
        .unwrap();

        assert!(cli.verbose);
        if let Command::Run(args) = cli.command {
            assert_eq!(args.prompt.prompt_file, Some(PathBuf::from("prompt.txt")));
            assert_eq!(args.context.vars.len(), 2);
            assert_eq!(args.context.env_include, vec!["CI_*"]);
            assert_eq!(args.config.config, Some(PathBuf::from("step.yaml")));
            assert_eq!(args.config.timeout_ms, Some(500));
            assert_eq!(args.config.max_retries, Some(0));
            assert_eq!(args.config.backoff_base_ms, Some(10));
            assert_eq!(args.log_file, Some(PathBuf::from("out/build.log")));
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn run_requires_a_prompt_source() {
        assert!(Cli::try_parse_from(["promptstep", "run"]).is_err());
    }

    #[test]
    fn prompt_sources_are_exclusive() {
        let result = Cli::try_parse_from([
            "promptstep",
            "render",
            "--prompt",
            "x",
            "--prompt-file",
            "p.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_render_check() {
        let cli =
            Cli::try_parse_from(["promptstep", "render", "--prompt", "{{a}}", "--check"]).unwrap();
        if let Command::Render(args) = cli.command {
            assert!(args.check);
        } else {
            panic!("Expected Render command");
        }
    }

    #[test]
    fn parse_tech_stack_flags() {
        let cli = Cli::try_parse_from([
            "promptstep",
            "render",
            "--prompt",
            "Pipeline for {{tech_stack}}",
            "--tech-stack",
            "gradle",
            "--tech-stack",
            "docker",
            "--requirements-file",
            "REQUIREMENTS.md",
        ])
        .unwrap();
        if let Command::Render(args) = cli.command {
            assert_eq!(args.context.tech_stack, vec!["gradle", "docker"]);
            assert_eq!(
                args.context.requirements_file,
                Some(PathBuf::from("REQUIREMENTS.md"))
            );
        } else {
            panic!("Expected Render command");
        }
    }

    #[test]
    fn parse_config() {
        let cli = Cli::try_parse_from(["promptstep", "config", "--max-retries", "4"]).unwrap();
        if let Command::Config(args) = cli.command {
            assert_eq!(args.max_retries, Some(4));
        } else {
            panic!("Expected Config command");
        }
    }

    #[test]
    fn parse_replay() {
        let cli = Cli::try_parse_from(["promptstep", "replay", "build.log"]).unwrap();
        if let Command::Replay(args) = cli.command {
            assert_eq!(args.log_file, PathBuf::from("build.log"));
        } else {
            panic!("Expected Replay command");
        }
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        let result = Cli::try_parse_from([
            "promptstep",
            "config",
            "--timeout-ms",
            "soon",
        ]);
        assert!(result.is_err());
    }
}
