//! Connector error types.

use formwatch_core::errors::{ExError, ExErrorKind};
use thiserror::Error;

/// Failure talking to an external service or reading an export
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// HTTP request error (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Provider accepted the request but rejected the message
    #[error("Provider rejected request ({code}): {message}")]
    Rejected { code: String, message: String },

    /// Response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// CSV read error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConnectorError {
    /// Classify as a row source failure
    pub fn into_source_unavailable(self, op: &str) -> ExError {
        let kind = if self.is_timeout() {
            ExErrorKind::Timeout
        } else {
            ExErrorKind::ExternalService
        };
        ExError::new(ExErrorKind::SourceUnavailable)
            .with_op(op.to_string())
            .with_message(self.to_string())
            .with_source(ExError::new(kind).with_message(self.to_string()))
    }

    /// Classify as a failed delivery for one row
    pub fn into_delivery_failed(self, row_key: &str) -> ExError {
        ExError::new(ExErrorKind::DeliveryFailed)
            .with_op("send")
            .with_row_key(row_key)
            .with_message(self.to_string())
    }

    fn is_timeout(&self) -> bool {
        matches!(self, ConnectorError::Http(e) if e.is_timeout())
    }
}

/// Build a blocking HTTP client with a request timeout
pub(crate) fn http_client(
    timeout: std::time::Duration,
    op: &str,
) -> Result<reqwest::blocking::Client, ExError> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| {
            ExError::new(ExErrorKind::Config)
                .with_op(op.to_string())
                .with_message(format!("cannot build HTTP client: {}", e))
        })
}
