//! Google Sheets row source.
//!
//! Reads the monitored range with one `spreadsheets.values.get` call per
//! pass. Cells come back as formatted strings; any non-string JSON value is
//! stringified so a stray number never fails the fetch.

use crate::errors::{http_client, ConnectorError};
use formwatch_core::errors::{ExError, ExErrorKind, Result};
use formwatch_core::{Row, RowSource};
use formwatch_core_types::Sensitive;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4";

const OP: &str = "fetch_all";

/// Credential sent with every values request
#[derive(Debug, Clone)]
pub enum SheetsAuth {
    /// `key=` query parameter (public or link-shared sheets)
    ApiKey(Sensitive<String>),
    /// `Authorization: Bearer` header (OAuth or service-account token)
    Bearer(Sensitive<String>),
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub base_url: String,
    pub spreadsheet_id: String,
    pub sheet_name: String,
    /// A1 range within the sheet, e.g. `A2:Z`
    pub range: String,
    /// Leading rows of the returned range to drop
    pub header_rows: usize,
    pub auth: SheetsAuth,
    pub timeout: Duration,
}

impl SheetsConfig {
    /// Fully qualified A1 range, e.g. `Sheet1!A2:Z`
    pub fn a1_range(&self) -> String {
        format!("{}!{}", self.sheet_name, self.range)
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

pub struct SheetsRowSource {
    client: Client,
    config: SheetsConfig,
}

impl SheetsRowSource {
    /// # Errors
    ///
    /// Returns `ExErrorKind::Config` if the spreadsheet id is blank or the
    /// HTTP client cannot be built.
    pub fn new(config: SheetsConfig) -> Result<Self> {
        if config.spreadsheet_id.trim().is_empty() {
            return Err(ExError::new(ExErrorKind::Config)
                .with_op("sheets_source")
                .with_message("spreadsheet id is empty"));
        }
        let client = http_client(config.timeout, "sheets_source")?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SheetsConfig {
        &self.config
    }

    fn values_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url).map_err(|e| {
            ExError::new(ExErrorKind::Config)
                .with_op(OP)
                .with_message(format!("invalid base url '{}': {}", self.config.base_url, e))
        })?;
        let range = self.config.a1_range();
        url.path_segments_mut()
            .map_err(|_| {
                ExError::new(ExErrorKind::Config)
                    .with_op(OP)
                    .with_message(format!("base url '{}' cannot hold a path", self.config.base_url))
            })?
            .pop_if_empty()
            .extend([
                "spreadsheets",
                self.config.spreadsheet_id.as_str(),
                "values",
                range.as_str(),
            ]);
        Ok(url)
    }

    fn request(&self, url: Url) -> std::result::Result<ValueRange, ConnectorError> {
        let mut request = self
            .client
            .get(url)
            .query(&[("majorDimension", "ROWS")]);
        request = match &self.config.auth {
            SheetsAuth::ApiKey(key) => request.query(&[("key", key.expose().as_str())]),
            SheetsAuth::Bearer(token) => request.bearer_auth(token.expose()),
        };

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ConnectorError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let text = response.text()?;
        serde_json::from_str(&text).map_err(|e| ConnectorError::Decode(e.to_string()))
    }
}

impl RowSource for SheetsRowSource {
    fn fetch_all(&self) -> Result<Vec<Row>> {
        let url = self.values_url()?;
        debug!(range = %self.config.a1_range(), "Requesting sheet values");

        let body = self
            .request(url)
            .map_err(|e| e.into_source_unavailable(OP))?;

        let rows: Vec<Row> = body
            .values
            .into_iter()
            .skip(self.config.header_rows)
            .map(|cells| cells.into_iter().map(cell_text).collect::<Row>())
            .collect();

        info!(
            spreadsheet_id = %self.config.spreadsheet_id,
            rows = rows.len(),
            "Fetched sheet rows"
        );
        Ok(rows)
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
