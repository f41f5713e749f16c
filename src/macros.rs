//! Logging macros with `format!`-style message formatting.
//!
//! Every macro takes the logger, the context to snapshot, and the message
//! format arguments.
//!
//! # Examples
//!
//! ```
//! use multisink_logger::prelude::*;
//! use multisink_logger::info;
//! use std::sync::Arc;
//!
//! let memory = Arc::new(MemorySink::new());
//! let logger = Logger::with_sinks([memory.clone() as Arc<dyn Sink>]);
//! let ctx = LogContext::new().attach("service", "billing");
//!
//! let port = 8080;
//! info!(logger, &ctx, "Server listening on port {}", port);
//!
//! assert_eq!(memory.records()[0].message(), "Server listening on port 8080");
//! ```

/// Log a formatted message at an explicit level.
///
/// # Examples
///
/// ```
/// # use multisink_logger::prelude::*;
/// # let logger = Logger::new();
/// # let ctx = LogContext::new();
/// use multisink_logger::log;
/// log!(logger, &ctx, LogLevel::Info, "Simple message");
/// log!(logger, &ctx, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $ctx:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($ctx, $level, format!($($arg)+))
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $ctx:expr, $($arg:tt)+) => {
        $crate::log!($logger, $ctx, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use multisink_logger::prelude::*;
/// # let logger = Logger::new();
/// use multisink_logger::warn;
/// let ctx = LogContext::new().attach("disk", "/var");
/// warn!(logger, &ctx, "Disk usage at {}%", 91);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $ctx:expr, $($arg:tt)+) => {
        $crate::log!($logger, $ctx, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use multisink_logger::prelude::*;
/// # let logger = Logger::new();
/// use multisink_logger::error;
/// let ctx = LogContext::new().attach("request_id", "r-17");
/// error!(logger, &ctx, "Upstream returned {}", 503);
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $ctx:expr, $($arg:tt)+) => {
        $crate::log!($logger, $ctx, $crate::LogLevel::Error, $($arg)+)
    };
}
