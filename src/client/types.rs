//! Call request and result types.

use crate::prompt::ResolvedPrompt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default delay before the first retry.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Upper bound on any single backoff delay.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Retry, timeout, and endpoint settings for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallConfig {
    /// Endpoint URL of the text-generation service.
    pub endpoint: String,
    /// Per-attempt timeout. Must be non-zero.
    pub timeout: Duration,
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each later one.
    pub backoff_base: Duration,
}

impl CallConfig {
    /// Config for `endpoint` with default timeout and retry policy.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    /// Upper bound on network calls for one invocation.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// A resolved prompt paired with the config it is sent with.
///
/// Built once per invocation and never modified.
#[derive(Debug, Clone)]
pub struct CallRequest {
    prompt: ResolvedPrompt,
    config: CallConfig,
}

impl CallRequest {
    pub fn new(prompt: ResolvedPrompt, config: CallConfig) -> Self {
        Self { prompt, config }
    }

    pub fn prompt(&self) -> &str {
        self.prompt.as_str()
    }

    pub fn config(&self) -> &CallConfig {
        &self.config
    }
}

/// Classified reason a call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No response within the configured timeout.
    Timeout,
    /// Network error or 5xx-equivalent response.
    Transient,
    /// Malformed request or authentication rejection.
    Rejected,
    /// The invocation was aborted by the host.
    Cancelled,
    /// Anything that could not be classified.
    Unknown,
}

impl FailureKind {
    /// Whether a failure of this kind may succeed on retry.
    pub fn is_retryable(self) -> bool {
        matches!(self, FailureKind::Timeout | FailureKind::Transient)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Transient => write!(f, "transient"),
            FailureKind::Rejected => write!(f, "rejected"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Outcome of one invocation of the call client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallResult {
    Success {
        response_text: String,
        /// Duration of the attempt that succeeded.
        latency: Duration,
        attempts: u32,
    },
    Failure {
        kind: FailureKind,
        message: String,
        attempts: u32,
    },
}

impl CallResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CallResult::Success { .. })
    }

    /// Number of network calls made.
    pub fn attempts(&self) -> u32 {
        match self {
            CallResult::Success { attempts, .. } | CallResult::Failure { attempts, .. } => {
                *attempts
            }
        }
    }

    /// The failure kind, if this is a failure.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            CallResult::Success { .. } => None,
            CallResult::Failure { kind, .. } => Some(*kind),
        }
    }

    pub(crate) fn cancelled(message: impl Into<String>, attempts: u32) -> Self {
        CallResult::Failure {
            kind: FailureKind::Cancelled,
            message: message.into(),
            attempts,
        }
    }
}
