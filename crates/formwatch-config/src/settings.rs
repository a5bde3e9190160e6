//! Settings model and layered loading.

use config::{Config, Environment, File, FileFormat};
use formwatch_connectors::{sheets, solapi, RecipientSource};
use formwatch_core::errors::{ExError, ExErrorKind, Result};
use formwatch_core::logging_facility::Profile;
use formwatch_core::message::{DEFAULT_COLUMNS, DEFAULT_TEMPLATE};
use formwatch_core::MessageTemplate;
use formwatch_core_types::Sensitive;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "FORMWATCH";

/// Complete runtime settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub store: StoreSettings,
    pub notify: NotifySettings,
    pub webhook: WebhookSettings,
    pub watch: WatchSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Sheets,
    Csv,
}

/// `[source]`: where rows come from
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub kind: SourceKind,
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub range: String,
    pub header_rows: usize,
    pub api_key: Option<Sensitive<String>>,
    pub bearer_token: Option<Sensitive<String>>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub csv_path: Option<PathBuf>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            kind: SourceKind::Sheets,
            spreadsheet_id: String::new(),
            sheet_name: "Sheet1".to_string(),
            range: "A2:Z".to_string(),
            header_rows: 0,
            api_key: None,
            bearer_token: None,
            base_url: sheets::DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            csv_path: None,
        }
    }
}

impl SourceSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[store]`: where the snapshot document lives
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub path: PathBuf,
    pub doc_ref: String,
    pub busy_timeout_ms: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("formwatch.db"),
            doc_ref: "form-responses".to_string(),
            busy_timeout_ms: 5_000,
        }
    }
}

impl StoreSettings {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyKind {
    #[default]
    Solapi,
    Log,
}

/// `[notify]`: how changed rows are announced
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifySettings {
    pub kind: NotifyKind,
    pub api_key: Option<Sensitive<String>>,
    pub api_secret: Option<Sensitive<String>>,
    pub sender: String,
    /// Column holding the recipient's phone number
    pub recipient_column: String,
    /// Fixed recipient; overrides `recipient_column` when set
    pub recipient: Option<Sensitive<String>>,
    pub template: String,
    /// Sheet column names, in sheet order
    pub columns: Vec<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            kind: NotifyKind::Solapi,
            api_key: None,
            api_secret: None,
            sender: String::new(),
            recipient_column: "phone".to_string(),
            recipient: None,
            template: DEFAULT_TEMPLATE.to_string(),
            columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            base_url: solapi::DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl NotifySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parse the message template against the configured columns.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTemplate` or `Config` if the template or the column
    /// names are invalid.
    pub fn message_template(&self) -> Result<MessageTemplate> {
        Ok(MessageTemplate::parse(&self.template, self.columns.as_slice())?)
    }

    /// Resolve where each message's recipient number comes from.
    ///
    /// # Errors
    ///
    /// Returns `Config` if `recipient_column` names no configured column.
    pub fn recipient_source(&self) -> Result<RecipientSource> {
        if let Some(fixed) = &self.recipient {
            return Ok(RecipientSource::Fixed(fixed.clone()));
        }
        self.columns
            .iter()
            .position(|c| c.trim() == self.recipient_column.trim())
            .map(RecipientSource::Column)
            .ok_or_else(|| {
                config_error(format!(
                    "notify.recipient_column '{}' is not one of notify.columns",
                    self.recipient_column
                ))
            })
    }
}

/// `[webhook]`: trigger adapter listener
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebhookSettings {
    pub bind: String,
    pub channel_token: Option<Sensitive<String>>,
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            channel_token: None,
        }
    }
}

impl WebhookSettings {
    /// # Errors
    ///
    /// Returns `Config` if `bind` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse()
            .map_err(|e| config_error(format!("webhook.bind '{}': {}", self.bind, e)))
    }
}

/// `[watch]`: polling loop
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    pub interval_secs: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self { interval_secs: 2 }
    }
}

impl WatchSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// `[logging]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub profile: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            profile: "development".to_string(),
            file: None,
        }
    }
}

impl LoggingSettings {
    /// # Errors
    ///
    /// Returns `Config` for an unknown profile name.
    pub fn profile(&self) -> Result<Profile> {
        self.profile.parse()
    }
}

impl Settings {
    /// Load `.env`, then defaults, `file` (if any) and the process
    /// environment, and validate the result.
    ///
    /// # Errors
    ///
    /// Returns `Config` if a layer cannot be read or the merged settings are
    /// inconsistent.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::load_from(file, None)
    }

    /// Load from `file` and an explicit environment map instead of the
    /// process environment. `None` reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns `Config` if a layer cannot be read or the merged settings are
    /// inconsistent.
    pub fn load_from(
        file: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }
        builder = builder.add_source(environment().source(env));
        Self::finish(builder)
    }

    /// Load from TOML text only.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the text is not valid TOML for these settings or
    /// the settings are inconsistent.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let builder = Config::builder().add_source(File::from_str(text, FileFormat::Toml));
        Self::finish(builder)
    }

    fn finish(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let settings: Settings = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| config_error(e.to_string()).with_op("load_settings"))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check cross-field consistency, reporting every problem at once.
    ///
    /// # Errors
    ///
    /// Returns `Config` listing each problem, or the template's own error if
    /// it does not parse.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        match self.source.kind {
            SourceKind::Sheets => {
                if self.source.spreadsheet_id.trim().is_empty() {
                    problems.push("source.spreadsheet_id is required".to_string());
                }
                match (&self.source.api_key, &self.source.bearer_token) {
                    (None, None) => problems
                        .push("source.api_key or source.bearer_token is required".to_string()),
                    (Some(_), Some(_)) => problems.push(
                        "set only one of source.api_key and source.bearer_token".to_string(),
                    ),
                    _ => {}
                }
            }
            SourceKind::Csv => {
                if self.source.csv_path.is_none() {
                    problems.push("source.csv_path is required for a csv source".to_string());
                }
            }
        }

        if self.store.doc_ref.trim().is_empty() {
            problems.push("store.doc_ref must not be empty".to_string());
        }

        if self.notify.kind == NotifyKind::Solapi {
            if blank(&self.notify.api_key) {
                problems.push("notify.api_key is required".to_string());
            }
            if blank(&self.notify.api_secret) {
                problems.push("notify.api_secret is required".to_string());
            }
            if self.notify.sender.trim().is_empty() {
                problems.push("notify.sender is required".to_string());
            }
            if let Err(e) = self.notify.recipient_source() {
                problems.push(e.message().to_string());
            }
        }

        if self.watch.interval_secs == 0 {
            problems.push("watch.interval_secs must be at least 1".to_string());
        }
        if let Err(e) = self.webhook.bind_addr() {
            problems.push(e.message().to_string());
        }
        if let Err(e) = self.logging.profile() {
            problems.push(e.message().to_string());
        }

        if !problems.is_empty() {
            return Err(config_error(problems.join("; ")).with_op("validate_settings"));
        }

        // A bad template has its own error kind.
        self.notify.message_template().map(|_| ())
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

fn blank(value: &Option<Sensitive<String>>) -> bool {
    value.as_ref().map_or(true, Sensitive::is_blank)
}

fn config_error(message: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::Config).with_message(message)
}
