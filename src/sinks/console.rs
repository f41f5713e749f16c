//! Console sink implementation

use crate::core::{LogLevel, Record, Result, Sink, SinkError};
use std::io::Write;

/// Writes one JSON line per record to stdout, or stderr for `ERROR`
///
/// A record that cannot be encoded is replaced by a degraded line carrying
/// the encoding error, so the only failure left is a broken output stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }

    fn emit(level: LogLevel, line: &str) -> std::io::Result<()> {
        // Route Error to stderr, others to stdout
        match level {
            LogLevel::Error => std::io::stderr().lock().write_all(line.as_bytes()),
            LogLevel::Info | LogLevel::Warn => std::io::stdout().lock().write_all(line.as_bytes()),
        }
    }
}

impl Sink for ConsoleSink {
    fn write(&self, record: &Record) -> Result<()> {
        let line = record.to_json_line_or_fallback();
        Self::emit(record.level(), &line).map_err(|e| SinkError::write(self.name(), e))
    }

    fn flush(&self) -> Result<()> {
        // Flush both stdout and stderr since we write to both
        std::io::stdout()
            .flush()
            .map_err(|e| SinkError::write(self.name(), e))?;
        std::io::stderr()
            .flush()
            .map_err(|e| SinkError::write(self.name(), e))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogContext;

    #[test]
    fn test_console_write_all_levels() {
        let sink = ConsoleSink::new();
        let ctx = LogContext::new().attach("component", "console-test");

        for level in LogLevel::ALL {
            let record = Record::new(level, format!("console {}", level), &ctx);
            assert!(sink.write(&record).is_ok());
        }
        assert!(sink.flush().is_ok());
    }
}
