//! Level filtering decorator

use crate::core::{LogLevel, Record, Result, Sink};
use std::collections::HashSet;
use std::sync::Arc;

/// Forwards only records whose level is in the allow-set
///
/// Rejected records are dropped silently and count as a successful write.
///
/// # Example
///
/// ```
/// use multisink_logger::prelude::*;
/// use std::sync::Arc;
///
/// let errors = Arc::new(MemorySink::new());
/// let filter = FilterSink::new(errors.clone(), [LogLevel::Error]);
/// let ctx = LogContext::new();
///
/// filter.write(&Record::new(LogLevel::Info, "skipped", &ctx)).unwrap();
/// filter.write(&Record::new(LogLevel::Error, "kept", &ctx)).unwrap();
/// assert_eq!(errors.len(), 1);
/// ```
pub struct FilterSink {
    inner: Arc<dyn Sink>,
    levels: HashSet<LogLevel>,
}

impl FilterSink {
    pub fn new(inner: Arc<dyn Sink>, levels: impl IntoIterator<Item = LogLevel>) -> Self {
        Self {
            inner,
            levels: levels.into_iter().collect(),
        }
    }

    /// Allow `min_level` and everything more severe
    pub fn at_least(inner: Arc<dyn Sink>, min_level: LogLevel) -> Self {
        Self::new(
            inner,
            LogLevel::ALL.into_iter().filter(|level| *level >= min_level),
        )
    }

    pub fn allows(&self, level: LogLevel) -> bool {
        self.levels.contains(&level)
    }

    pub fn levels(&self) -> &HashSet<LogLevel> {
        &self.levels
    }
}

impl Sink for FilterSink {
    fn write(&self, record: &Record) -> Result<()> {
        if !self.allows(record.level()) {
            return Ok(());
        }
        self.inner.write(record)
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }

    fn close(&self) -> Result<()> {
        self.inner.close()
    }

    fn name(&self) -> &str {
        "filter"
    }
}
