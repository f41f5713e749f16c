//! Declarative logger configuration
//!
//! A logger can be described as JSON and built in one step:
//!
//! ```
//! use multisink_logger::prelude::*;
//!
//! let config = LoggerConfig::from_json(r#"{"sinks":[
//!     {"type":"console"},
//!     {"type":"filter","levels":["ERROR"],"inner":{"type":"console"}}
//! ]}"#).unwrap();
//!
//! let logger = Logger::from_config(&config).unwrap();
//! assert_eq!(logger.sink_count(), 2);
//! ```

use super::error::{Result, SinkError};
use super::log_level::LogLevel;
use super::logger::Logger;
use super::sink::Sink;
use crate::sinks::buffered::{DEFAULT_CAPACITY, DEFAULT_FLUSH_DELAY};
use crate::sinks::rotating_file::{DEFAULT_MAX_FILES, DEFAULT_MAX_SIZE};
use crate::sinks::{
    BufferedSink, ConsoleSink, FileSink, FilterSink, RemoteSink, RotatingFileSink,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

fn default_max_size() -> u64 {
    DEFAULT_MAX_SIZE
}

fn default_max_files() -> usize {
    DEFAULT_MAX_FILES
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_flush_delay_ms() -> u64 {
    DEFAULT_FLUSH_DELAY.as_millis() as u64
}

/// One sink, possibly wrapping another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkConfig {
    Console,
    File {
        path: PathBuf,
    },
    RotatingFile {
        path: PathBuf,
        #[serde(default = "default_max_size")]
        max_size: u64,
        #[serde(default = "default_max_files")]
        max_files: usize,
    },
    Buffered {
        inner: Box<SinkConfig>,
        #[serde(default = "default_capacity")]
        capacity: usize,
        #[serde(default = "default_flush_delay_ms")]
        flush_delay_ms: u64,
    },
    Filter {
        levels: Vec<LogLevel>,
        inner: Box<SinkConfig>,
    },
    Remote {
        base_uri: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
}

impl SinkConfig {
    /// Construct the described sink, building inner sinks first
    ///
    /// # Errors
    ///
    /// Returns the first construction error, e.g. an unopenable file or a
    /// zero rotation limit
    pub fn build(&self) -> Result<Arc<dyn Sink>> {
        let sink: Arc<dyn Sink> = match self {
            SinkConfig::Console => Arc::new(ConsoleSink::new()),
            SinkConfig::File { path } => Arc::new(FileSink::new(path)?),
            SinkConfig::RotatingFile {
                path,
                max_size,
                max_files,
            } => Arc::new(RotatingFileSink::new(path, *max_size, *max_files)?),
            SinkConfig::Buffered {
                inner,
                capacity,
                flush_delay_ms,
            } => Arc::new(BufferedSink::new(
                inner.build()?,
                *capacity,
                Duration::from_millis(*flush_delay_ms),
            )?),
            SinkConfig::Filter { levels, inner } => {
                Arc::new(FilterSink::new(inner.build()?, levels.iter().copied()))
            }
            SinkConfig::Remote {
                base_uri,
                timeout_ms,
            } => match timeout_ms {
                Some(ms) => Arc::new(RemoteSink::with_timeout(
                    base_uri,
                    Duration::from_millis(*ms),
                )?),
                None => Arc::new(RemoteSink::new(base_uri)?),
            },
        };
        Ok(sink)
    }
}

/// Ordered list of top-level sinks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

impl LoggerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SinkError::config("logger config", e.to_string()))
    }

    /// Read and parse a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SinkError::io_operation(
                "read logger config",
                format!("Failed to read '{}'", path.display()),
                e,
            )
        })?;
        Self::from_json(&raw)
    }

    /// Build every sink in order
    pub fn build_sinks(&self) -> Result<Vec<Arc<dyn Sink>>> {
        self.sinks.iter().map(SinkConfig::build).collect()
    }
}

impl Logger {
    /// Build a logger whose registry holds the configured sinks in order
    ///
    /// An empty sink list yields a logger with no sinks.
    pub fn from_config(config: &LoggerConfig) -> Result<Self> {
        Ok(Logger::with_sinks(config.build_sinks()?))
    }
}
