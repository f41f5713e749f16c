//! Request-scoped structured context
//!
//! A [`LogContext`] is an immutable handle over a key/value map. Attaching a
//! field never touches the parent: it copies the parent's entries, overlays
//! the new key and hands back a fresh handle. Handles are cheap to clone and
//! safe to share between threads, so one parent can seed any number of
//! concurrent requests without them seeing each other's fields.

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Field map shared between a context and every record logged with it
pub type Fields = Map<String, Value>;

/// Copy-on-write key/value context attached to log records
///
/// # Example
///
/// ```
/// use multisink_logger::LogContext;
///
/// let base = LogContext::new().attach("service", "billing");
/// let request = base.attach("request_id", "req-123");
///
/// assert_eq!(request.read("service").unwrap(), "billing");
/// assert!(base.read("request_id").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogContext {
    fields: Arc<Fields>,
}

impl LogContext {
    /// Create a new empty log context
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a context with `key` bound to `value`
    #[must_use]
    pub fn attach<K, V>(&self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut fields = Fields::clone(&self.fields);
        fields.insert(key.into(), value.into());
        Self {
            fields: Arc::new(fields),
        }
    }

    /// Derive a context with every pair attached, in iteration order
    #[must_use]
    pub fn attach_all<I, K, V>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut fields = Fields::clone(&self.fields);
        for (key, value) in values {
            fields.insert(key.into(), value.into());
        }
        Self {
            fields: Arc::new(fields),
        }
    }

    /// Look up a field; `None` when no ancestor bound it
    pub fn read(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Shared snapshot handed to records
    pub(crate) fn snapshot(&self) -> Arc<Fields> {
        Arc::clone(&self.fields)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Format fields as key=value pairs
    pub fn format_fields(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => format!("{}={}", k, s),
                other => format!("{}={}", k, other),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<Fields> for LogContext {
    fn from(fields: Fields) -> Self {
        Self {
            fields: Arc::new(fields),
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_fields())
    }
}
