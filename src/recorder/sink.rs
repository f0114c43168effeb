//! Log sinks: where build log lines go.
//!
//! The host supplies a sink; the step only appends lines to it. Sinks never
//! fail from the caller's point of view. Write errors are reported through
//! `tracing` and the line is dropped.

use crate::error::{Result, StepError};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Append-only destination for build log lines.
pub trait LogSink {
    /// Append `text` as one line.
    fn write(&mut self, text: &str);
}

impl<S: LogSink + ?Sized> LogSink for &mut S {
    fn write(&mut self, text: &str) {
        (**self).write(text);
    }
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn write(&mut self, text: &str) {
        (**self).write(text);
    }
}

/// Writes lines to standard output, which build servers capture as the build log.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write(&mut self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", text).and_then(|_| stdout.flush()) {
            warn!(error = %e, "failed to write to stdout");
        }
    }
}

/// Appends lines to a file, creating it if needed.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Prepare a file sink, creating parent directories.
    ///
    /// The file itself is opened in append mode on every write, so records
    /// from earlier builds are kept.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                StepError::UserError(format!(
                    "failed to create log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, text: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", text)?;
        file.sync_all()
    }
}

impl LogSink for FileSink {
    fn write(&mut self, text: &str) {
        if let Err(e) = self.append(text) {
            warn!(path = %self.path.display(), error = %e, "failed to append to log file");
        }
    }
}

/// Keeps lines in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Everything written so far, one line per entry.
    pub fn contents(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

impl LogSink for MemorySink {
    fn write(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }
}

/// Writes every line to each inner sink, in order.
#[derive(Default)]
pub struct TeeSink {
    sinks: Vec<Box<dyn LogSink + Send>>,
}

impl TeeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl LogSink + Send + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl LogSink for TeeSink {
    fn write(&mut self, text: &str) {
        for sink in &mut self.sinks {
            sink.write(text);
        }
    }
}
