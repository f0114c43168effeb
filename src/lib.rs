//! Promptstep: a build step that resolves a prompt template, sends it to a
//! text-generation endpoint, and records the outcome.
//!
//! The pieces, in the order one invocation uses them:
//!
//! - [`prompt`]: `{{placeholder}}` templates resolved against build variables
//! - [`client`]: HTTP transport with per-attempt timeout, bounded retries,
//!   and cancellation
//! - [`recorder`]: one deterministic JSON record per invocation
//! - [`step`]: the controller sequencing the three and mapping the result to
//!   pass or fail

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod prompt;
pub mod recorder;
pub mod step;

pub use error::{Result, StepError};
pub use step::{StepController, StepOutcome, StepReport};
