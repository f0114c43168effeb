//! Result recorder.
//!
//! Turns a [`CallResult`] (or a resolution error) into a [`LogRecord`] and
//! appends it to the host's [`LogSink`]. Recording never fails: formatting is
//! total over every outcome, and sink errors are logged, not returned.

mod record;
mod sink;

pub use record::{LogRecord, RecordOutcome};
pub use sink::{FileSink, LogSink, MemorySink, StdoutSink, TeeSink};

use crate::client::CallResult;
use crate::prompt::TemplateError;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Digest identifying a prompt in log records: `sha256:<hex>`.
pub fn prompt_digest(text: &str) -> String {
    format!("sha256:{}", hex::encode(Sha256::digest(text.as_bytes())))
}

/// Builds and writes one [`LogRecord`] per invocation.
#[derive(Debug, Clone)]
pub struct Recorder {
    step: String,
    host: String,
    clock: fn() -> DateTime<Utc>,
}

impl Recorder {
    /// Recorder for `step`, stamped with this machine's hostname and the
    /// system clock.
    pub fn new(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            host: local_hostname(),
            clock: Utc::now,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn step(&self) -> &str {
        &self.step
    }

    /// Record the outcome of a call and write it to `sink`.
    pub fn record(
        &self,
        result: &CallResult,
        prompt_digest: &str,
        sink: &mut dyn LogSink,
    ) -> LogRecord {
        let outcome = match result {
            CallResult::Success {
                response_text,
                latency,
                ..
            } => RecordOutcome::Success {
                latency_ms: u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                response: response_text.clone(),
            },
            CallResult::Failure { kind, message, .. } => RecordOutcome::Failure {
                kind: *kind,
                message: message.clone(),
            },
        };

        self.write(outcome, result.attempts(), prompt_digest, sink)
    }

    /// Record a template that could not be resolved; no call was made.
    pub fn record_resolution_failure(
        &self,
        error: &TemplateError,
        prompt_digest: &str,
        sink: &mut dyn LogSink,
    ) -> LogRecord {
        let outcome = match error {
            TemplateError::MissingVariable { name, .. } => RecordOutcome::MissingVariable {
                variable: name.clone(),
                message: error.to_string(),
            },
            other => RecordOutcome::InvalidTemplate {
                error: other.code().to_string(),
                message: other.to_string(),
            },
        };

        self.write(outcome, 0, prompt_digest, sink)
    }

    fn write(
        &self,
        outcome: RecordOutcome,
        attempts: u32,
        prompt_digest: &str,
        sink: &mut dyn LogSink,
    ) -> LogRecord {
        let record = LogRecord {
            ts: (self.clock)(),
            step: self.step.clone(),
            host: self.host.clone(),
            prompt_digest: prompt_digest.to_string(),
            attempts,
            outcome,
        };
        sink.write(&record.to_line());
        record
    }
}

fn local_hostname() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}
