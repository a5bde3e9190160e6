//! Notifier that writes each rendered message to the log.
//!
//! Lets an operator run the full pipeline against a live sheet before
//! provider credentials exist. Never fails.

use formwatch_core::errors::Result;
use formwatch_core::{Change, MessageTemplate, Notifier};
use tracing::info;

pub struct LogNotifier {
    template: MessageTemplate,
}

impl LogNotifier {
    pub fn new(template: MessageTemplate) -> Self {
        Self { template }
    }

    pub fn render(&self, change: &Change) -> String {
        self.template.render(change)
    }
}

impl Notifier for LogNotifier {
    fn send(&self, change: &Change) -> Result<()> {
        info!(
            row_key = %change.key(),
            kind = change.kind.as_str(),
            message = %self.render(change),
            "Notification (log only)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwatch_core::{ChangeKind, Row};

    #[test]
    fn test_log_notifier_always_succeeds() {
        let template = MessageTemplate::parse("hi {name}", &["timestamp", "name"]).unwrap();
        let notifier = LogNotifier::new(template);
        let change = Change::new(Row::new(vec!["t1".into(), "Kim".into()]), ChangeKind::New);

        assert_eq!(notifier.render(&change), "hi Kim");
        assert!(notifier.send(&change).is_ok());
    }
}
