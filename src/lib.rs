//! # Multi-sink Logger
//!
//! A structured logger that fans every record out to an ordered,
//! reconfigurable set of sinks, writing one JSON line per record.
//!
//! ## Features
//!
//! - **Context snapshots**: copy-on-write key/value context attached to records
//! - **Stateful sinks**: size-based rotation, count/idle buffering, level
//!   filtering and HTTP push
//! - **Failure isolation**: a failing or panicking sink never silences the others
//! - **Declarative setup**: build a logger from JSON via [`LoggerConfig`]
//!
//! ## Example
//!
//! ```
//! use multisink_logger::prelude::*;
//! use std::sync::Arc;
//!
//! let errors = Arc::new(MemorySink::new());
//! let logger = Logger::builder()
//!     .console()
//!     .sink(FilterSink::new(errors.clone(), [LogLevel::Error]))
//!     .build();
//!
//! let ctx = LogContext::new().attach("user_id", 42);
//! logger.info(&ctx, "user signed in");
//! logger.error(&ctx, "payment declined");
//!
//! assert_eq!(errors.len(), 1);
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        Fields, LogContext, LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerMetrics, Record,
        Result, Sink, SinkConfig, SinkError, SinkId,
    };
    pub use crate::sinks::{
        BufferedSink, ConsoleSink, FileSink, FilterSink, MemorySink, RemoteSink,
        RotatingFileSink, WriterSink,
    };
}

pub use core::{
    Fields, LogContext, LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerMetrics, Record,
    Result, Sink, SinkConfig, SinkError, SinkId, DATE_FORMAT, SINK_ERROR_MESSAGE,
};
pub use sinks::{
    BufferedSink, ConsoleSink, FileSink, FilterSink, MemorySink, RemoteSink, RotatingFileSink,
    WriterSink,
};
