//! Log record structure
//!
//! A [`Record`] is built once per log call and handed by reference to every
//! sink. Its context is a shared snapshot, so cloning a record (as buffering
//! sinks do) never copies the field map.

use super::error::Result;
use super::log_context::{Fields, LogContext};
use super::log_level::LogLevel;
use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Wall-clock layout of the `date` field
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

mod date_format {
    use super::DATE_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// One immutable structured log event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(with = "date_format")]
    date: NaiveDateTime,
    level: LogLevel,
    message: String,
    context: Arc<Fields>,
}

impl Record {
    /// Build a record stamped with the current local time
    pub fn new(level: LogLevel, message: impl Into<String>, context: &LogContext) -> Self {
        Self {
            date: Local::now().naive_local().trunc_subsecs(0),
            level,
            message: message.into(),
            context: context.snapshot(),
        }
    }

    /// Build a record from a bare field map
    pub fn with_fields(level: LogLevel, message: impl Into<String>, fields: Fields) -> Self {
        Self::new(level, message, &LogContext::from(fields))
    }

    /// Replace the timestamp, truncated to whole seconds
    #[must_use]
    pub fn at(mut self, date: NaiveDateTime) -> Self {
        self.date = date.trunc_subsecs(0);
        self
    }

    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &Fields {
        &self.context
    }

    /// Encode as one JSON object followed by a newline
    pub fn to_json_line(&self) -> Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    /// Decode a line produced by [`Record::to_json_line`]
    pub fn from_json_line(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line.trim_end())?)
    }

    /// Degraded line used when the record itself cannot be encoded
    ///
    /// Keeps level and message, and replaces the context with the encoding
    /// error so the attempt stays visible.
    pub fn fallback_line(&self, error: &dyn std::fmt::Display) -> String {
        let value = serde_json::json!({
            "level": self.level.to_str(),
            "message": self.message,
            "context": { "error": error.to_string() },
        });
        format!("{}\n", value)
    }

    /// Encoded line, or the degraded line if encoding fails
    pub fn to_json_line_or_fallback(&self) -> String {
        self.to_json_line()
            .unwrap_or_else(|err| self.fallback_line(&err))
    }
}
