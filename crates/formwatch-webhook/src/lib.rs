//! Formwatch Webhook - push-notification trigger adapter
//!
//! Turns Google Drive change notifications into reconciliation passes. The
//! adapter keeps no snapshot state of its own; every accepted notification
//! runs one complete pass against the configured collaborators.

pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
