//! Formwatch Config - layered settings and collaborator wiring
//!
//! Settings are read from built-in defaults, then an optional TOML file, then
//! `FORMWATCH_`-prefixed environment variables (`__` separates sections, so
//! `FORMWATCH_STORE__PATH` sets `store.path`). A `.env` file in the working
//! directory is loaded into the environment first.
//!
//! [`Wiring::from_settings`] turns validated settings into the concrete row
//! source, snapshot store and notifier a pass runs against.

pub mod settings;
pub mod wiring;

pub use settings::{
    LoggingSettings, NotifyKind, NotifySettings, Settings, SourceKind, SourceSettings,
    StoreSettings, WatchSettings, WebhookSettings,
};
pub use wiring::{open_store, Wiring};
