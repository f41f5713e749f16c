//! Sinks over arbitrary writers and in-memory buffers

use crate::core::{Record, Result, Sink, SinkError};
use parking_lot::Mutex;
use std::io::Write;

/// Writes JSON lines to any [`Write`] implementation
///
/// Like the console sink, an unencodable record degrades to the fallback
/// line instead of failing.
///
/// # Example
///
/// ```
/// use multisink_logger::prelude::*;
///
/// let sink = WriterSink::new(Vec::new());
/// let record = Record::new(LogLevel::Info, "hello", &LogContext::new());
/// sink.write(&record).unwrap();
///
/// let bytes = sink.into_inner();
/// assert!(String::from_utf8(bytes).unwrap().contains("hello"));
/// ```
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
    name: String,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self::named(writer, "writer")
    }

    /// Create a writer sink reported under `name`
    pub fn named(writer: W, name: impl Into<String>) -> Self {
        Self {
            writer: Mutex::new(writer),
            name: name.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn write(&self, record: &Record) -> Result<()> {
        let line = record.to_json_line_or_fallback();
        self.writer
            .lock()
            .write_all(line.as_bytes())
            .map_err(|e| SinkError::write(&self.name, e))
    }

    fn flush(&self) -> Result<()> {
        self.writer
            .lock()
            .flush()
            .map_err(|e| SinkError::write(&self.name, e))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Keeps every encoded line in memory
///
/// Handy for tests and for inspecting what a decorator forwarded.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured lines, without trailing newlines
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Captured lines decoded back into records
    ///
    /// Degraded lines that no longer parse as records are skipped.
    pub fn records(&self) -> Vec<Record> {
        self.lines
            .lock()
            .iter()
            .filter_map(|line| Record::from_json_line(line).ok())
            .collect()
    }

    /// Everything captured, newline-joined as it would appear in a file
    pub fn contents(&self) -> String {
        self.lines
            .lock()
            .iter()
            .map(|line| format!("{}\n", line))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl Sink for MemorySink {
    fn write(&self, record: &Record) -> Result<()> {
        let line = record.to_json_line_or_fallback();
        self.lines.lock().push(line.trim_end_matches('\n').to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
