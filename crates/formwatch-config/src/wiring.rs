//! Build concrete collaborators from settings.

use crate::settings::{
    NotifyKind, NotifySettings, Settings, SourceKind, SourceSettings, StoreSettings,
};
use formwatch_connectors::{
    CsvRowSource, LogNotifier, SheetsAuth, SheetsConfig, SheetsRowSource, SolapiConfig,
    SolapiNotifier,
};
use formwatch_core::errors::{ExError, ExErrorKind, Result};
use formwatch_core::{Notifier, RowSource};
use formwatch_engine::Collaborators;
use formwatch_store::SqliteSnapshotStore;
use std::sync::Arc;
use tracing::info;

/// The row source, snapshot store and notifier one deployment runs against
#[derive(Clone)]
pub struct Wiring {
    pub source: Arc<dyn RowSource>,
    pub store: Arc<SqliteSnapshotStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl Wiring {
    /// # Errors
    ///
    /// Returns `Config` for settings that cannot be turned into a
    /// collaborator, or the store's error if the database cannot be opened.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let wiring = Self {
            source: build_source(&settings.source)?,
            store: Arc::new(open_store(&settings.store)?),
            notifier: build_notifier(&settings.notify)?,
        };
        info!(
            source = ?settings.source.kind,
            notifier = ?settings.notify.kind,
            doc_ref = %settings.store.doc_ref,
            "Collaborators ready"
        );
        Ok(wiring)
    }

    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            source: self.source.as_ref(),
            store: self.store.as_ref(),
            notifier: self.notifier.as_ref(),
        }
    }
}

/// Open the snapshot store alone, e.g. for inspection commands.
///
/// # Errors
///
/// Returns the store's error if the database cannot be opened or migrated.
pub fn open_store(settings: &StoreSettings) -> Result<SqliteSnapshotStore> {
    SqliteSnapshotStore::open_with_timeout(
        &settings.path,
        settings.doc_ref.clone(),
        settings.busy_timeout(),
    )
}

fn build_source(settings: &SourceSettings) -> Result<Arc<dyn RowSource>> {
    match settings.kind {
        SourceKind::Sheets => {
            let auth = match (&settings.api_key, &settings.bearer_token) {
                (Some(key), _) => SheetsAuth::ApiKey(key.clone()),
                (None, Some(token)) => SheetsAuth::Bearer(token.clone()),
                (None, None) => return Err(missing("source.api_key")),
            };
            let source = SheetsRowSource::new(SheetsConfig {
                base_url: settings.base_url.clone(),
                spreadsheet_id: settings.spreadsheet_id.clone(),
                sheet_name: settings.sheet_name.clone(),
                range: settings.range.clone(),
                header_rows: settings.header_rows,
                auth,
                timeout: settings.timeout(),
            })?;
            Ok(Arc::new(source))
        }
        SourceKind::Csv => {
            let path = settings
                .csv_path
                .clone()
                .ok_or_else(|| missing("source.csv_path"))?;
            Ok(Arc::new(CsvRowSource::new(path, settings.header_rows)))
        }
    }
}

fn build_notifier(settings: &NotifySettings) -> Result<Arc<dyn Notifier>> {
    let template = settings.message_template()?;
    match settings.kind {
        NotifyKind::Log => Ok(Arc::new(LogNotifier::new(template))),
        NotifyKind::Solapi => {
            let config = SolapiConfig {
                base_url: settings.base_url.clone(),
                api_key: settings
                    .api_key
                    .clone()
                    .ok_or_else(|| missing("notify.api_key"))?,
                api_secret: settings
                    .api_secret
                    .clone()
                    .ok_or_else(|| missing("notify.api_secret"))?,
                sender: settings.sender.clone(),
                recipient: settings.recipient_source()?,
                timeout: settings.timeout(),
            };
            Ok(Arc::new(SolapiNotifier::new(config, template)?))
        }
    }
}

fn missing(key: &str) -> ExError {
    ExError::new(ExErrorKind::Config)
        .with_op("wire_collaborators")
        .with_message(format!("{} is required", key))
}
