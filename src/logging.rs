//! Structured logging setup.
//!
//! Diagnostics go to stderr through `tracing`; stdout is reserved for the
//! build log (prompt echo, response text, and record lines).
//!
//! Configuration comes from, in increasing precedence:
//!
//! - `PROMPTSTEP_LOG_LEVEL` (trace, debug, info, warn, error)
//! - `--verbose` on the command line (forces debug)
//! - `RUST_LOG` directives, layered on top of the chosen level
//!
//! `PROMPTSTEP_LOG_JSON=true` switches to JSON lines.

use std::env;
use std::io;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

pub const LOG_LEVEL_ENV: &str = "PROMPTSTEP_LOG_LEVEL";
pub const LOG_JSON_ENV: &str = "PROMPTSTEP_LOG_JSON";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Minimum level for this crate's own events.
    pub level: Level,

    /// Emit JSON lines instead of human-readable output.
    pub use_json: bool,

    /// Include the module target in each event.
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            use_json: false,
            include_target: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Build the configuration from the environment and the `--verbose` flag.
    pub fn from_env(verbose: bool) -> Self {
        let level = if verbose {
            Level::DEBUG
        } else {
            env::var(LOG_LEVEL_ENV)
                .ok()
                .map(|value| {
                    parse_level(&value).unwrap_or_else(|| {
                        eprintln!(
                            "Invalid {} '{}', defaulting to warn. Valid levels: trace, debug, info, warn, error",
                            LOG_LEVEL_ENV, value
                        );
                        Level::WARN
                    })
                })
                .unwrap_or(Level::WARN)
        };

        let use_json = env::var(LOG_JSON_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            level,
            use_json,
            include_target: verbose,
        }
    }
}

/// Parses a log level from a string (case-insensitive).
pub fn parse_level(level_str: &str) -> Option<Level> {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.level).into())
        .from_env_lossy();

    // RUST_LOG gets the final say; otherwise keep the HTTP stack quiet.
    if env::var("RUST_LOG").is_err() {
        for directive in ["h2=warn", "hyper=warn", "hyper_util=warn", "reqwest=warn"] {
            if let Ok(directive) = directive.parse() {
                filter = filter.add_directive(directive);
            }
        }
    }

    filter
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(&config);

        let result = if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(io::stderr)
                        .with_target(config.include_target),
                )
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(io::stderr)
                        .with_target(config.include_target),
                )
                .try_init()
        };

        if let Err(e) = result {
            eprintln!("failed to initialize logging: {}", e);
        }
    });
}
