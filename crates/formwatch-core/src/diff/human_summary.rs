//! Human-readable rendering of a change set.

use crate::model::{ChangeKind, ChangeSet};

/// Render a plain-text summary of a [`ChangeSet`], one line per change.
///
/// Informational only. Cells after the key are joined with ` | `.
pub fn render_change_set(changes: &ChangeSet) -> String {
    if changes.is_empty() {
        return "No pending changes.\n".to_string();
    }

    let mut out = format!(
        "{} pending change(s): {} new, {} modified\n",
        changes.len(),
        changes.count(ChangeKind::New),
        changes.count(ChangeKind::Modified)
    );
    for change in changes {
        let rest = change.row.cells().get(1..).unwrap_or_default().join(" | ");
        out.push_str(&format!(
            "  {:<8} {}  {}\n",
            change.kind.as_str(),
            change.key(),
            rest
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Change, Row};

    #[test]
    fn test_empty_change_set() {
        assert_eq!(render_change_set(&ChangeSet::new()), "No pending changes.\n");
    }

    #[test]
    fn test_lists_each_change() {
        let changes = ChangeSet::from(vec![
            Change::new(Row::from_iter(["t2", "B", "222"]), ChangeKind::New),
            Change::new(Row::from_iter(["t1", "A", "999"]), ChangeKind::Modified),
        ]);
        let text = render_change_set(&changes);

        assert!(text.starts_with("2 pending change(s): 1 new, 1 modified"));
        assert!(text.contains("new      t2  B | 222"));
        assert!(text.contains("modified t1  A | 999"));
    }
}
