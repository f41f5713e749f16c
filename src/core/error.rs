//! Error types for the logger system

pub type Result<T> = std::result::Result<T, SinkError>;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Record could not be serialized
    #[error("Failed to encode log record: {0}")]
    Encoding(#[from] serde_json::Error),

    /// IO failure while writing to a destination
    #[error("Write to {sink} sink failed: {source}")]
    Write {
        sink: String,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem operation failed during rotation
    #[error("File rotation failed for '{path}' while {operation}: {source}")]
    Rotation {
        path: String,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Remote push rejected or unreachable
    #[error("Remote push to {url} failed: {message}")]
    Remote { url: String, message: String },

    /// Sink used after close
    #[error("{sink} sink is closed")]
    Closed { sink: String },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// IO error with context, raised while setting a sink up
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl SinkError {
    /// Create a write error for the named sink
    pub fn write(sink: impl Into<String>, source: std::io::Error) -> Self {
        SinkError::Write {
            sink: sink.into(),
            source,
        }
    }

    /// Create a rotation error
    pub fn rotation(
        path: impl Into<String>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        SinkError::Rotation {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Create a remote push error
    pub fn remote(url: impl Into<String>, message: impl Into<String>) -> Self {
        SinkError::Remote {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn closed(sink: impl Into<String>) -> Self {
        SinkError::Closed { sink: sink.into() }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        SinkError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        SinkError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Whether this error means data durability is at risk
    pub fn is_rotation(&self) -> bool {
        matches!(self, SinkError::Rotation { .. })
    }
}
