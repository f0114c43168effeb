//! The structured log record written once per invocation.
//!
//! Records are serialized as single-line JSON objects (NDJSON) so a build log
//! can be scanned for them and each one parsed back independently.
//!
//! # Record Format
//!
//! - `ts`: RFC3339 timestamp
//! - `step`: step name (e.g., `chatgpt`)
//! - `host`: machine that ran the step
//! - `prompt_digest`: `sha256:<hex>` of the resolved prompt (of the raw
//!   template when resolution failed)
//! - `attempts`: number of network calls made
//! - `outcome`: `success`, `failure`, `missing_variable`, or `invalid_template`,
//!   followed by outcome-specific fields

use crate::client::FailureKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome-specific part of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecordOutcome {
    /// The endpoint returned text.
    Success { latency_ms: u64, response: String },
    /// The call failed after retries, or was not retryable.
    Failure { kind: FailureKind, message: String },
    /// A placeholder had no value in the build context.
    MissingVariable { variable: String, message: String },
    /// The template could not be parsed.
    InvalidTemplate { error: String, message: String },
}

impl RecordOutcome {
    /// Short label used in summaries.
    pub fn label(&self) -> String {
        match self {
            RecordOutcome::Success { .. } => "success".to_string(),
            RecordOutcome::Failure { kind, .. } => format!("failure ({})", kind),
            RecordOutcome::MissingVariable { .. } => "missing_variable".to_string(),
            RecordOutcome::InvalidTemplate { error, .. } => format!("invalid_template ({})", error),
        }
    }
}

/// One append-only log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub ts: DateTime<Utc>,
    pub step: String,
    pub host: String,
    pub prompt_digest: String,
    pub attempts: u32,
    #[serde(flatten)]
    pub outcome: RecordOutcome,
}

impl LogRecord {
    /// Whether the step passed.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RecordOutcome::Success { .. })
    }

    /// Whether the invocation was cancelled by the host.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self.outcome,
            RecordOutcome::Failure {
                kind: FailureKind::Cancelled,
                ..
            }
        )
    }

    /// Serialize to a single JSON line.
    ///
    /// Total: falls back to a minimal hand-built line if serialization fails.
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                "{{\"ts\":\"{}\",\"step\":{:?},\"prompt_digest\":{:?},\"attempts\":{},\"outcome\":\"unserializable\",\"message\":{:?}}}",
                self.ts.to_rfc3339(),
                self.step,
                self.prompt_digest,
                self.attempts,
                e.to_string()
            )
        })
    }

    /// Parse a line produced by [`LogRecord::to_line`].
    ///
    /// Returns `None` for lines that are not records (prompt echoes,
    /// response text, output from other build steps).
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if !line.starts_with('{') {
            return None;
        }
        serde_json::from_str(line).ok()
    }
}
