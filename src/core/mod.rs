//! Core logger types and traits

pub mod config;
pub mod error;
pub mod log_context;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod record;
pub mod sink;

pub use config::{LoggerConfig, SinkConfig};
pub use error::{Result, SinkError};
pub use log_context::{Fields, LogContext};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder, SINK_ERROR_MESSAGE};
pub use metrics::LoggerMetrics;
pub use record::{Record, DATE_FORMAT};
pub use sink::{Sink, SinkId};
