//! Remote push sink
//!
//! Sends every record to an HTTP collector as a batch of one. Delivery is a
//! single synchronous POST per record with no retry or batching.

use crate::core::{Fields, Record, Result, Sink, SinkError};
use serde::Serialize;
use std::time::Duration;

/// Path appended to the configured base URI
pub const PUSH_LOGS_PATH: &str = "/api/v1/observatory/logs";

#[derive(Serialize)]
struct PushLogsRequest<'a> {
    logs: [PushLog<'a>; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PushLog<'a> {
    message: &'a str,
    log_level: &'a str,
    data: &'a Fields,
    module: Option<&'a str>,
    submodule: Option<&'a str>,
}

/// POSTs records to `{base_uri}/api/v1/observatory/logs`
///
/// Anything but HTTP 200 is a failure. Requests have no deadline unless one
/// is set with [`RemoteSink::with_timeout`].
///
/// # Example
///
/// ```no_run
/// use multisink_logger::prelude::*;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let remote = RemoteSink::with_timeout("http://collector:8080", Duration::from_secs(2))
///     .expect("Failed to build HTTP client");
///
/// let logger = Logger::builder().console().sink(remote).build();
/// logger.error(&LogContext::new(), "pushed to the collector");
/// ```
pub struct RemoteSink {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl RemoteSink {
    /// Create a sink pushing to `base_uri` without a request timeout
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(base_uri: impl AsRef<str>) -> Result<Self> {
        Self::build(base_uri.as_ref(), None)
    }

    /// Create a sink whose requests give up after `timeout`
    pub fn with_timeout(base_uri: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        Self::build(base_uri.as_ref(), Some(timeout))
    }

    fn build(base_uri: &str, timeout: Option<Duration>) -> Result<Self> {
        if base_uri.trim().is_empty() {
            return Err(SinkError::config("remote", "base URI must not be empty"));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                SinkError::config("remote", format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", base_uri.trim_end_matches('/'), PUSH_LOGS_PATH),
        })
    }

    /// Full URL records are pushed to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn encode(record: &Record) -> Result<Vec<u8>> {
        let body = PushLogsRequest {
            logs: [PushLog {
                message: record.message(),
                log_level: record.level().to_str(),
                data: record.context(),
                module: None,
                submodule: None,
            }],
        };
        Ok(serde_json::to_vec(&body)?)
    }
}

impl Sink for RemoteSink {
    fn write(&self, record: &Record) -> Result<()> {
        let body = Self::encode(record)?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|e| SinkError::remote(&self.endpoint, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(SinkError::remote(
                &self.endpoint,
                format!("unexpected status {}", status),
            ));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "remote"
    }
}
