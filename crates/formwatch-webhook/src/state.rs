//! Shared state handed to every request.

use formwatch_config::Wiring;
use formwatch_core::{Notifier, RowSource, SnapshotStore};
use formwatch_core_types::Sensitive;
use formwatch_engine::Collaborators;
use std::sync::Arc;

pub struct AppState {
    source: Arc<dyn RowSource>,
    store: Arc<dyn SnapshotStore>,
    notifier: Arc<dyn Notifier>,
    /// Expected `X-Goog-Channel-Token`; `None` accepts any caller
    pub channel_token: Option<Sensitive<String>>,
}

impl AppState {
    pub fn new(
        source: Arc<dyn RowSource>,
        store: Arc<dyn SnapshotStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            source,
            store,
            notifier,
            channel_token: None,
        }
    }

    pub fn from_wiring(wiring: Wiring) -> Self {
        Self::new(wiring.source, wiring.store, wiring.notifier)
    }

    pub fn with_channel_token(mut self, token: Option<Sensitive<String>>) -> Self {
        self.channel_token = token.filter(|t| !t.is_blank());
        self
    }

    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            source: self.source.as_ref(),
            store: self.store.as_ref(),
            notifier: self.notifier.as_ref(),
        }
    }
}
