pub mod change;
pub mod row;
pub mod snapshot;

pub use change::{Change, ChangeKind, ChangeSet, NotificationOutcome, NotificationResult};
pub use row::Row;
pub use snapshot::{LoadedSnapshot, Snapshot, VersionToken};
