//! Step controller: resolve, call, record.
//!
//! One [`StepController::run`] is one build execution. It always produces
//! exactly one [`LogRecord`], including when the template cannot be resolved
//! and no call is made.

use crate::client::{CallClient, CallConfig, CallRequest, CallResult, CancelToken, Transport};
use crate::exit_codes;
use crate::prompt::{BuildContext, PromptTemplate};
use crate::recorder::{LogRecord, LogSink, Recorder, prompt_digest};
use tracing::{info, warn};

const PROMPT_PREFIX: &str = "Prompt: ";
const RESPONSE_PREFIX: &str = "Response: ";

/// Write `text` one line at a time, each line behind `prefix`, so that only
/// record lines can start with `{`.
fn write_prefixed(sink: &mut dyn LogSink, prefix: &str, text: &str) {
    if text.is_empty() {
        sink.write(prefix.trim_end());
        return;
    }
    for line in text.lines() {
        sink.write(&format!("{}{}", prefix, line));
    }
}

/// Pass/fail signal handed back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Pass,
    Fail,
}

/// Outcome of one invocation together with the record that was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub outcome: StepOutcome,
    pub record: LogRecord,
}

impl StepReport {
    /// Process exit code for this report.
    pub fn exit_code(&self) -> i32 {
        match self.outcome {
            StepOutcome::Pass => exit_codes::SUCCESS,
            StepOutcome::Fail if self.record.is_cancelled() => exit_codes::CANCELLED,
            StepOutcome::Fail => exit_codes::STEP_FAILURE,
        }
    }
}

impl From<LogRecord> for StepReport {
    /// Rebuild the report for a record read back from a build log.
    fn from(record: LogRecord) -> Self {
        let outcome = if record.is_success() {
            StepOutcome::Pass
        } else {
            StepOutcome::Fail
        };
        Self { outcome, record }
    }
}

pub struct StepController<T: Transport> {
    client: CallClient<T>,
    config: CallConfig,
    recorder: Recorder,
    echo_prompt: bool,
}

impl<T: Transport> StepController<T> {
    pub fn new(transport: T, config: CallConfig, recorder: Recorder) -> Self {
        Self {
            client: CallClient::new(transport),
            config,
            recorder,
            echo_prompt: true,
        }
    }

    /// Whether to write `Prompt: <resolved prompt>` to the sink before calling.
    pub fn echo_prompt(mut self, echo: bool) -> Self {
        self.echo_prompt = echo;
        self
    }

    pub fn transport(&self) -> &T {
        self.client.transport()
    }

    /// Run one invocation against `template` and `context`.
    pub async fn run(
        &self,
        template: &str,
        context: &BuildContext,
        sink: &mut dyn LogSink,
        cancel: &CancelToken,
    ) -> StepReport {
        let resolved = PromptTemplate::new(template).and_then(|t| t.resolve(context));
        let prompt = match resolved {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!(step = %self.recorder.step(), error = %e, "Prompt resolution failed");
                let record =
                    self.recorder
                        .record_resolution_failure(&e, &prompt_digest(template), sink);
                return StepReport {
                    outcome: StepOutcome::Fail,
                    record,
                };
            }
        };

        if self.echo_prompt {
            write_prefixed(sink, PROMPT_PREFIX, prompt.as_str());
        }

        let digest = prompt_digest(prompt.as_str());
        let request = CallRequest::new(prompt, self.config.clone());
        let result = self.client.invoke(&request, cancel).await;

        if let CallResult::Success { response_text, .. } = &result {
            write_prefixed(sink, RESPONSE_PREFIX, response_text);
        }

        let record = self.recorder.record(&result, &digest, sink);
        let outcome = if record.is_success() {
            StepOutcome::Pass
        } else {
            StepOutcome::Fail
        };

        info!(
            step = %self.recorder.step(),
            outcome = %record.outcome.label(),
            attempts = record.attempts,
            "Step finished"
        );

        StepReport { outcome, record }
    }
}
