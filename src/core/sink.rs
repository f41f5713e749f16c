//! Sink trait for log output destinations

use super::{error::Result, record::Record};
use std::fmt;
use std::sync::Arc;

/// A destination for log records
///
/// Writes take `&self`: sinks are shared across every thread that logs, so
/// each implementation serializes its own state. `flush` and `close` default
/// to no-ops for sinks that hold no resources.
pub trait Sink: Send + Sync {
    fn write(&self, record: &Record) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Release files, connections or timers held by the sink
    fn close(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn write(&self, record: &Record) -> Result<()> {
        (**self).write(record)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }

    fn close(&self) -> Result<()> {
        (**self).close()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Opaque handle returned when a sink is registered with a logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SinkId(pub(crate) u64);

impl fmt::Display for SinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sink#{}", self.0)
    }
}
