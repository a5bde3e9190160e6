//! Solapi SMS notifier.
//!
//! Sends one message per change through `POST /messages/v4/send`. Requests
//! are signed with the HMAC-SHA256 scheme Solapi requires: the signature is
//! `hex(HMAC(api_secret, date + salt))`, carried in the `Authorization`
//! header next to the API key, the ISO-8601 date and the salt.

use crate::errors::{http_client, ConnectorError};
use chrono::{SecondsFormat, Utc};
use formwatch_core::errors::{FormwatchError, Result};
use formwatch_core::{Change, MessageTemplate, Notifier};
use formwatch_core_types::Sensitive;
use reqwest::blocking::Client;
use ring::hmac;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

pub const DEFAULT_BASE_URL: &str = "https://api.solapi.com";

/// Where the recipient number of a message comes from
#[derive(Debug, Clone)]
pub enum RecipientSource {
    /// Cell at this column index of the changed row
    Column(usize),
    /// One fixed number for every message (e.g. an operator's phone)
    Fixed(Sensitive<String>),
}

#[derive(Debug, Clone)]
pub struct SolapiConfig {
    pub base_url: String,
    pub api_key: Sensitive<String>,
    pub api_secret: Sensitive<String>,
    /// Registered sender number
    pub sender: String,
    pub recipient: RecipientSource,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    message: OutgoingMessage<'a>,
}

#[derive(Debug, Serialize)]
struct OutgoingMessage<'a> {
    to: &'a str,
    from: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    status_code: Option<String>,
    #[serde(default)]
    status_message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    error_code: String,
    error_message: String,
}

pub struct SolapiNotifier {
    client: Client,
    config: SolapiConfig,
    template: MessageTemplate,
}

impl SolapiNotifier {
    /// # Errors
    ///
    /// Returns `ExErrorKind::Config` if the HTTP client cannot be built.
    pub fn new(config: SolapiConfig, template: MessageTemplate) -> Result<Self> {
        let client = http_client(config.timeout, "solapi_notifier")?;
        Ok(Self {
            client,
            config,
            template,
        })
    }

    fn recipient(&self, change: &Change) -> std::result::Result<String, FormwatchError> {
        let raw = match &self.config.recipient {
            RecipientSource::Fixed(number) => number.expose().as_str(),
            RecipientSource::Column(index) => change.row.cell(*index).unwrap_or(""),
        };
        let digits = normalize_phone(raw);
        if digits.is_empty() {
            return Err(FormwatchError::MissingRecipient {
                row_key: change.key().to_string(),
                reason: "recipient cell holds no phone number".to_string(),
            });
        }
        Ok(digits)
    }

    fn post(&self, to: &str, text: &str) -> std::result::Result<String, ConnectorError> {
        let date = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let salt = Uuid::new_v4().simple().to_string();
        let authorization = authorization_header(
            self.config.api_key.expose(),
            self.config.api_secret.expose(),
            &date,
            &salt,
        );
        let body = SendRequest {
            message: OutgoingMessage {
                to,
                from: &self.config.sender,
                text,
            },
        };
        let url = format!(
            "{}/messages/v4/send",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .json(&body)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(match serde_json::from_str::<ErrorResponse>(&text) {
                Ok(err) => ConnectorError::Rejected {
                    code: err.error_code,
                    message: err.error_message,
                },
                Err(_) => ConnectorError::Status {
                    status: status.as_u16(),
                    body: text,
                },
            });
        }

        let accepted: SendResponse = serde_json::from_str(&text)?;
        // Status codes 2xxx mean accepted for delivery.
        match accepted.status_code.as_deref() {
            Some(code) if !code.starts_with('2') => Err(ConnectorError::Rejected {
                code: code.to_string(),
                message: accepted.status_message.unwrap_or_default(),
            }),
            _ => Ok(accepted.message_id.unwrap_or_default()),
        }
    }
}

impl Notifier for SolapiNotifier {
    fn send(&self, change: &Change) -> Result<()> {
        let to = self.recipient(change)?;
        let text = self.template.render(change);

        match self.post(&to, &text) {
            Ok(message_id) => {
                info!(row_key = %change.key(), message_id = %message_id, "Solapi accepted message");
                Ok(())
            }
            Err(e) => {
                warn!(row_key = %change.key(), error = %e, "Solapi send failed");
                Err(e.into_delivery_failed(change.key()))
            }
        }
    }
}

/// Value of the `Authorization` header for one request
pub fn authorization_header(api_key: &str, api_secret: &str, date: &str, salt: &str) -> String {
    format!(
        "HMAC-SHA256 apiKey={}, date={}, salt={}, signature={}",
        api_key,
        date,
        salt,
        signature(api_secret, date, salt)
    )
}

fn signature(api_secret: &str, date: &str, salt: &str) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, api_secret.as_bytes());
    let mut message = String::with_capacity(date.len() + salt.len());
    message.push_str(date);
    message.push_str(salt);
    hex::encode(hmac::sign(&key, message.as_bytes()).as_ref())
}

/// Strip everything but digits, e.g. `010-1234-5678` -> `01012345678`
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}
