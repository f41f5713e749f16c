//! Append-only file sink

use crate::core::{Record, Result, Sink, SinkError};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends JSON lines to a single file, syncing after every write
pub struct FileSink {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileSink {
    /// Open `path` for appending, creating parent directories as needed
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = open_append(&path)?;

        Ok(Self {
            path,
            file: Mutex::new(Some(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Create parent directories and open `path` in create+append mode
pub(crate) fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            SinkError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", parent.display()),
                e,
            )
        })?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            SinkError::io_operation(
                "open log file",
                format!("Failed to open '{}'", path.display()),
                e,
            )
        })
}

impl Sink for FileSink {
    fn write(&self, record: &Record) -> Result<()> {
        let line = record.to_json_line()?;

        let mut guard = self.file.lock();
        let file = guard.as_mut().ok_or_else(|| SinkError::closed(self.name()))?;

        file.write_all(line.as_bytes())
            .map_err(|e| SinkError::write(self.name(), e))?;
        file.sync_all().map_err(|e| SinkError::write(self.name(), e))
    }

    fn flush(&self) -> Result<()> {
        if let Some(file) = self.file.lock().as_mut() {
            file.flush().map_err(|e| SinkError::write(self.name(), e))?;
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        // Dropping the handle releases it
        if let Some(file) = self.file.lock().take() {
            file.sync_all().map_err(|e| SinkError::write(self.name(), e))?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogContext, LogLevel};
    use tempfile::tempdir;

    #[test]
    fn test_file_sink_appends_lines() -> Result<()> {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("test.log");

        let sink = FileSink::new(&log_path)?;
        let ctx = LogContext::new().attach("user_id", 123);

        sink.write(&Record::new(LogLevel::Info, "file test message", &ctx))?;
        sink.write(&Record::new(LogLevel::Error, "second", &ctx))?;

        let content = fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("file test message"));
        assert!(lines[0].contains(r#""level":"INFO""#));
        assert!(lines[1].contains(r#""user_id":123"#));
        Ok(())
    }

    #[test]
    fn test_file_sink_creates_parent_directories() -> Result<()> {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("nested").join("deeper").join("app.log");

        let sink = FileSink::new(&log_path)?;
        sink.write(&Record::new(LogLevel::Warn, "nested", &LogContext::new()))?;

        assert!(log_path.exists());
        assert_eq!(sink.path(), log_path);
        Ok(())
    }

    #[test]
    fn test_file_sink_appends_to_existing_file() -> Result<()> {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("existing.log");
        fs::write(&log_path, "previous line\n").unwrap();

        let sink = FileSink::new(&log_path)?;
        sink.write(&Record::new(LogLevel::Info, "appended", &LogContext::new()))?;

        let content = fs::read_to_string(&log_path).unwrap();
        assert!(content.starts_with("previous line\n"));
        assert!(content.contains("appended"));
        Ok(())
    }

    #[test]
    fn test_write_after_close_fails() -> Result<()> {
        let dir = tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("closed.log"))?;

        sink.close()?;
        // Closing twice is harmless
        sink.close()?;

        let err = sink
            .write(&Record::new(LogLevel::Info, "too late", &LogContext::new()))
            .unwrap_err();
        assert!(matches!(err, SinkError::Closed { .. }));
        Ok(())
    }
}
