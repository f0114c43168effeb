//! Exit code constants for the promptstep binary.
//!
//! The host build system maps these to its own build status:
//! - 0: Step passed
//! - 1: User error (bad args, invalid config, unreadable prompt file)
//! - 2: Step failed (unresolved variable or failed call)
//! - 130: Step cancelled (build aborted)

/// The step ran and the call succeeded.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid configuration, or unreadable input.
pub const USER_ERROR: i32 = 1;

/// Step failure: a placeholder did not resolve or the external call failed.
pub const STEP_FAILURE: i32 = 2;

/// The step was cancelled by the host (Ctrl-C / SIGINT).
pub const CANCELLED: i32 = 130;
