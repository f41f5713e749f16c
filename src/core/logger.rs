//! Main logger implementation

use super::{
    error::Result,
    log_context::{Fields, LogContext},
    log_level::LogLevel,
    metrics::LoggerMetrics,
    record::Record,
    sink::{Sink, SinkId},
};
use crate::sinks::ConsoleSink;
use parking_lot::RwLock;
use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Message of the synthetic record reporting a failed sink write
pub const SINK_ERROR_MESSAGE: &str = "Logger sink error";

/// Write one diagnostic line to `out`, ignoring failures of `out` itself
pub(crate) fn write_diagnostic<W: Write>(out: &mut W, args: fmt::Arguments<'_>) {
    let _ = out.write_fmt(args).and_then(|()| out.write_all(b"\n"));
}

/// Diagnostic line on stderr for failures with no caller to return to
///
/// Unlike `eprintln!`, a closed or broken stderr is ignored instead of
/// panicking.
pub(crate) fn stderr_diagnostic(args: fmt::Arguments<'_>) {
    write_diagnostic(&mut std::io::stderr().lock(), args);
}

#[derive(Clone)]
struct Registered {
    id: SinkId,
    sink: Arc<dyn Sink>,
}

/// Fans each record out to an ordered set of sinks
///
/// The registry is swap-on-write: dispatch clones the current list and
/// iterates it without holding the lock, while `add_sink`/`remove_sink`
/// publish a new list. A sink that errors or panics never stops the others;
/// the failure is reported through the first registered sink, and if that
/// fails too, straight to stderr.
pub struct Logger {
    sinks: RwLock<Arc<Vec<Registered>>>,
    next_id: AtomicU64,
    metrics: LoggerMetrics,
}

impl Logger {
    /// Logger writing to a single [`ConsoleSink`]
    #[must_use]
    pub fn new() -> Self {
        Self::with_sinks([Arc::new(ConsoleSink::new()) as Arc<dyn Sink>])
    }

    /// Logger writing to the given sinks, in order
    #[must_use]
    pub fn with_sinks<I>(sinks: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Sink>>,
    {
        let logger = Self {
            sinks: RwLock::new(Arc::new(Vec::new())),
            next_id: AtomicU64::new(1),
            metrics: LoggerMetrics::new(),
        };
        for sink in sinks {
            logger.add_sink(sink);
        }
        logger
    }

    /// Register a sink at the end of the fan-out order
    pub fn add_sink(&self, sink: Arc<dyn Sink>) -> SinkId {
        let id = SinkId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut guard = self.sinks.write();
        let mut next = Vec::clone(&guard);
        next.push(Registered { id, sink });
        *guard = Arc::new(next);
        id
    }

    /// Unregister the sink added under `id`
    ///
    /// The sink is handed back rather than closed; it may still be shared
    /// elsewhere.
    pub fn remove_sink(&self, id: SinkId) -> Option<Arc<dyn Sink>> {
        let mut guard = self.sinks.write();
        let position = guard.iter().position(|entry| entry.id == id)?;
        let mut next = Vec::clone(&guard);
        let removed = next.remove(position);
        *guard = Arc::new(next);
        Some(removed.sink)
    }

    /// Registered sinks in fan-out order
    pub fn sinks(&self) -> Vec<Arc<dyn Sink>> {
        self.snapshot().iter().map(|entry| Arc::clone(&entry.sink)).collect()
    }

    /// Registered sink handles in fan-out order
    pub fn sink_ids(&self) -> Vec<SinkId> {
        self.snapshot().iter().map(|entry| entry.id).collect()
    }

    pub fn sink_count(&self) -> usize {
        self.snapshot().len()
    }

    fn snapshot(&self) -> Arc<Vec<Registered>> {
        Arc::clone(&self.sinks.read())
    }

    /// Build a record from `ctx` and dispatch it to every sink
    pub fn log(&self, ctx: &LogContext, level: LogLevel, message: impl Into<String>) {
        let record = Record::new(level, message, ctx);
        self.dispatch(&record);
    }

    #[inline]
    pub fn info(&self, ctx: &LogContext, message: impl Into<String>) {
        self.log(ctx, LogLevel::Info, message);
    }

    #[inline]
    pub fn warn(&self, ctx: &LogContext, message: impl Into<String>) {
        self.log(ctx, LogLevel::Warn, message);
    }

    #[inline]
    pub fn error(&self, ctx: &LogContext, message: impl Into<String>) {
        self.log(ctx, LogLevel::Error, message);
    }

    /// Write an already built record to every sink in registration order
    ///
    /// Never fails: every sink is attempted regardless of earlier failures.
    pub fn dispatch(&self, record: &Record) {
        let sinks = self.snapshot();
        self.metrics.record_dispatched();

        for entry in sinks.iter() {
            match Self::write_isolated(entry.sink.as_ref(), record) {
                Ok(()) => self.metrics.record_delivered(),
                Err(reason) => {
                    self.metrics.record_sink_failure();
                    self.report_failure(&sinks, entry, &reason);
                }
            }
        }
    }

    /// Write to one sink, turning a panic into an error description
    fn write_isolated(sink: &dyn Sink, record: &Record) -> std::result::Result<(), String> {
        let result =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sink.write(record)));

        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                Err(format!("sink panicked: {}", panic_msg))
            }
        }
    }

    /// Report a failed write through the first sink only, then stderr
    ///
    /// Never re-dispatches to the whole registry, so a failing sink cannot
    /// trigger a cascade of reports.
    fn report_failure(&self, sinks: &[Registered], failed: &Registered, reason: &str) {
        let Some(first) = sinks.first() else {
            return;
        };

        let mut fields = Fields::new();
        fields.insert("error".to_string(), reason.into());
        fields.insert("sink".to_string(), failed.sink.name().into());
        let report = Record::with_fields(LogLevel::Error, SINK_ERROR_MESSAGE, fields);

        match Self::write_isolated(first.sink.as_ref(), &report) {
            Ok(()) => self.metrics.record_fallback_report(),
            Err(fallback_reason) => {
                self.metrics.record_last_resort();
                stderr_diagnostic(format_args!(
                    "{}: {} (fallback sink {} failed: {})",
                    SINK_ERROR_MESSAGE,
                    reason,
                    first.sink.name(),
                    fallback_reason
                ));
            }
        }
    }

    /// Get the logger metrics for detailed observability
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Flush every sink, returning the first error after visiting all
    pub fn flush(&self) -> Result<()> {
        let mut first_error = None;
        for entry in self.snapshot().iter() {
            if let Err(e) = entry.sink.flush() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Close every sink, returning the first error after visiting all
    ///
    /// Sinks stay registered; closed sinks reject further writes and those
    /// failures go through the usual fallback path.
    pub fn close(&self) -> Result<()> {
        let mut first_error = None;
        for entry in self.snapshot().iter() {
            if let Err(e) = entry.sink.close() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            stderr_diagnostic(format_args!(
                "[LOGGER ERROR] Failed to flush during shutdown: {}",
                e
            ));
        }

        let failures = self.metrics.sink_failures();
        if failures > 0 {
            stderr_diagnostic(format_args!(
                "[LOGGER WARNING] Logger shutting down after {} failed sink writes \
                 (failure rate: {:.2}%)",
                failures,
                self.metrics.failure_rate()
            ));
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use multisink_logger::prelude::*;
/// use std::sync::Arc;
///
/// let memory = Arc::new(MemorySink::new());
/// let logger = Logger::builder()
///     .sink(ConsoleSink::new())
///     .shared_sink(memory.clone())
///     .build();
///
/// assert_eq!(logger.sink_count(), 2);
/// ```
#[derive(Default)]
pub struct LoggerBuilder {
    sinks: Vec<Arc<dyn Sink>>,
}

impl LoggerBuilder {
    /// Create a builder with no sinks
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink owned by the logger
    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    /// Add a sink the caller keeps a handle to
    #[must_use = "builder methods return a new value"]
    pub fn shared_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Add a console sink
    #[must_use = "builder methods return a new value"]
    pub fn console(self) -> Self {
        self.sink(ConsoleSink::new())
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        Logger::with_sinks(self.sinks)
    }
}

impl Logger {
    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}
