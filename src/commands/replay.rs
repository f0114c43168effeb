//! Implementation of the `promptstep replay` command.
//!
//! Reads a build log, prints one summary line per record, and exits with the
//! status of the last record. Non-record lines (prompt echo, response text)
//! are skipped.

use crate::cli::ReplayArgs;
use crate::error::{Result, StepError};
use crate::recorder::{LogRecord, RecordOutcome};
use crate::step::StepReport;
use std::path::Path;

/// Execute the `promptstep replay` command.
pub fn cmd_replay(args: ReplayArgs) -> Result<i32> {
    let records = read_records(&args.log_file)?;

    for record in &records {
        println!("{}", summarize(record));
    }

    let Some(last) = records.into_iter().last() else {
        return Err(StepError::UserError(format!(
            "no records found in '{}'",
            args.log_file.display()
        )));
    };
    Ok(StepReport::from(last).exit_code())
}

fn read_records(path: &Path) -> Result<Vec<LogRecord>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        StepError::UserError(format!(
            "failed to read log file '{}': {}",
            path.display(),
            e
        ))
    })?;

    Ok(content.lines().filter_map(LogRecord::parse_line).collect())
}

fn summarize(record: &LogRecord) -> String {
    let detail = match &record.outcome {
        RecordOutcome::Success { latency_ms, .. } => format!("{} ms", latency_ms),
        RecordOutcome::Failure { message, .. }
        | RecordOutcome::MissingVariable { message, .. }
        | RecordOutcome::InvalidTemplate { message, .. } => message.clone(),
    };

    format!(
        "{} {} [{}] {} attempts={} {}",
        record.ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        record.step,
        record.host,
        record.outcome.label(),
        record.attempts,
        detail
    )
}
