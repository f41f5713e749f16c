//! Rotating file sink with size-based rotation
//!
//! Files are named `<base>`, `<base>.1`, ... `<base>.<max_files - 1>`, newest
//! backup first. When the next line would push the active file past
//! `max_size`, the backups shift up one slot, the oldest slot is evicted, the
//! active file becomes `<base>.1` and a fresh `<base>` is opened. At most
//! `max_files` files exist at any time.

use super::file::open_append;
use crate::core::logger::stderr_diagnostic;
use crate::core::{Record, Result, Sink, SinkError};
use parking_lot::Mutex;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Default rotation threshold (10 MB)
pub const DEFAULT_MAX_SIZE: u64 = 10 * 1024 * 1024;

/// Default number of retained files, active file included
pub const DEFAULT_MAX_FILES: usize = 5;

struct RotatingState {
    /// `None` while a rotation is in flight or after close
    file: Option<File>,
    current_size: u64,
    closed: bool,
}

/// File sink that rotates by size and keeps a bounded number of backups
///
/// Rotation happens before a write that would push the active file past
/// `max_size`. An empty active file is never rotated: a single line longer
/// than `max_size` is written to it as is, and the next write rotates.
///
/// # Examples
///
/// ```no_run
/// use multisink_logger::sinks::RotatingFileSink;
///
/// // 1 MB per file, `app.log` plus four backups
/// let sink = RotatingFileSink::new("/var/log/app.log", 1024 * 1024, 5).unwrap();
/// ```
pub struct RotatingFileSink {
    base_path: PathBuf,
    max_size: u64,
    max_files: usize,
    state: Mutex<RotatingState>,
}

impl RotatingFileSink {
    /// Open `path` for appending and track its current size
    ///
    /// # Errors
    ///
    /// Returns error if `max_size` is zero, `max_files` is zero, or the file
    /// cannot be opened
    pub fn new(path: impl Into<PathBuf>, max_size: u64, max_files: usize) -> Result<Self> {
        if max_size == 0 {
            return Err(SinkError::config(
                "RotatingFileSink",
                "max_size must be greater than zero",
            ));
        }
        if max_files == 0 {
            return Err(SinkError::config(
                "RotatingFileSink",
                "max_files must be at least 1",
            ));
        }

        let base_path = path.into();
        let file = open_append(&base_path)?;
        let current_size = file
            .metadata()
            .map_err(|e| {
                SinkError::io_operation(
                    "open log file",
                    format!("Cannot access metadata of '{}'", base_path.display()),
                    e,
                )
            })?
            .len();

        Ok(Self {
            base_path,
            max_size,
            max_files,
            state: Mutex::new(RotatingState {
                file: Some(file),
                current_size,
                closed: false,
            }),
        })
    }

    /// Open with [`DEFAULT_MAX_SIZE`] and [`DEFAULT_MAX_FILES`]
    pub fn with_defaults(path: impl Into<PathBuf>) -> Result<Self> {
        Self::new(path, DEFAULT_MAX_SIZE, DEFAULT_MAX_FILES)
    }

    /// Bytes written to the active file
    pub fn current_size(&self) -> u64 {
        self.state.lock().current_size
    }

    pub fn path(&self) -> &Path {
        &self.base_path
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Path of the backup at `index` (`<base>.<index>`)
    pub fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.base_path.as_os_str().to_os_string();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    fn rotation_error(&self, operation: impl Into<String>, source: io::Error) -> SinkError {
        SinkError::rotation(self.base_path.display().to_string(), operation, source)
    }

    /// Shift backups up one slot and move the active file to `<base>.1`
    ///
    /// Caller holds the state lock and has already dropped the file handle.
    fn shift_files(&self) -> Result<()> {
        for i in (1..self.max_files).rev() {
            let path = self.backup_path(i);
            if i == self.max_files - 1 {
                // Oldest slot is evicted
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => {
                        return Err(self.rotation_error(
                            format!("removing oldest backup '{}'", path.display()),
                            e,
                        ))
                    }
                }
            } else if path.exists() {
                let next = self.backup_path(i + 1);
                fs::rename(&path, &next).map_err(|e| {
                    self.rotation_error(
                        format!("renaming '{}' to '{}'", path.display(), next.display()),
                        e,
                    )
                })?;
            }
        }

        if !self.base_path.exists() {
            return Ok(());
        }

        if self.max_files == 1 {
            // No backup slots: the active file is discarded
            fs::remove_file(&self.base_path)
                .map_err(|e| self.rotation_error("removing active file", e))
        } else {
            let first = self.backup_path(1);
            fs::rename(&self.base_path, &first).map_err(|e| {
                self.rotation_error(format!("renaming active file to '{}'", first.display()), e)
            })
        }
    }

    fn rotate(&self, state: &mut RotatingState) -> Result<()> {
        if let Some(mut file) = state.file.take() {
            file.flush()
                .map_err(|e| self.rotation_error("flushing before rotation", e))?;
            // File is dropped here, releasing the handle
        }

        self.shift_files()?;
        self.reopen(state)
            .map_err(|e| self.rotation_error("reopening active file", e))
    }

    fn reopen(&self, state: &mut RotatingState) -> io::Result<()> {
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.base_path)?;
        state.current_size = file.metadata()?.len();
        state.file = Some(file);
        Ok(())
    }

    fn append(&self, state: &mut RotatingState, line: &str) -> Result<()> {
        let file = state
            .file
            .as_mut()
            .ok_or_else(|| SinkError::closed(self.name()))?;

        file.write_all(line.as_bytes())
            .map_err(|e| SinkError::write(self.name(), e))?;
        state.current_size += line.len() as u64;
        file.sync_all().map_err(|e| SinkError::write(self.name(), e))
    }
}

impl Sink for RotatingFileSink {
    fn write(&self, record: &Record) -> Result<()> {
        let line = record.to_json_line()?;

        let mut state = self.state.lock();
        if state.closed {
            return Err(SinkError::closed(self.name()));
        }

        let candidate = state.current_size + line.len() as u64;
        // An empty file takes the line even if it alone exceeds max_size
        if candidate > self.max_size && state.current_size > 0 {
            if let Err(rotation_err) = self.rotate(&mut state) {
                // Keep the in-flight line: write it to whatever base file exists
                if state.file.is_none() {
                    if let Err(e) = self.reopen(&mut state) {
                        stderr_diagnostic(format_args!(
                            "[LOGGER ERROR] Failed to reopen '{}' after rotation failure: {}",
                            self.base_path.display(),
                            e
                        ));
                    }
                }
                if let Err(e) = self.append(&mut state, &line) {
                    stderr_diagnostic(format_args!(
                        "[LOGGER ERROR] Line lost after rotation failure of '{}': {}",
                        self.base_path.display(),
                        e
                    ));
                }
                return Err(rotation_err);
            }
        }

        self.append(&mut state, &line)
    }

    fn flush(&self) -> Result<()> {
        if let Some(file) = self.state.lock().file.as_mut() {
            file.flush().map_err(|e| SinkError::write(self.name(), e))?;
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.closed = true;
        if let Some(file) = state.file.take() {
            file.sync_all().map_err(|e| SinkError::write(self.name(), e))?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "rotating_file"
    }
}
