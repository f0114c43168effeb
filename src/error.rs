//! Error types for promptstep.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Failures of the step itself (unresolved variables, failed calls) are not
//! errors: they are recorded outcomes. `StepError` covers everything that
//! prevents the step from being run at all.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for promptstep operations.
#[derive(Error, Debug)]
pub enum StepError {
    /// User provided invalid arguments or input.
    #[error("{0}")]
    UserError(String),

    /// The step configuration is missing, malformed, or invalid.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// A local I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StepError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            StepError::UserError(_) => exit_codes::USER_ERROR,
            StepError::ConfigError(_) => exit_codes::USER_ERROR,
            StepError::Io(_) => exit_codes::USER_ERROR,
        }
    }
}

/// Result type alias for promptstep operations.
pub type Result<T> = std::result::Result<T, StepError>;
