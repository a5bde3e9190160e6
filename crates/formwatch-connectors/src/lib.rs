//! Formwatch Connectors - concrete collaborators
//!
//! Blocking adapters behind the `formwatch-core` collaborator traits:
//! - [`SheetsRowSource`]: Google Sheets `values.get`
//! - [`CsvRowSource`]: a CSV export on disk
//! - [`SolapiNotifier`]: SMS through the Solapi messages API
//! - [`LogNotifier`]: renders messages into the log instead of sending

pub mod csv_source;
pub mod errors;
pub mod log_notifier;
pub mod sheets;
pub mod solapi;

pub use csv_source::CsvRowSource;
pub use errors::ConnectorError;
pub use log_notifier::LogNotifier;
pub use sheets::{SheetsAuth, SheetsConfig, SheetsRowSource};
pub use solapi::{RecipientSource, SolapiConfig, SolapiNotifier};
