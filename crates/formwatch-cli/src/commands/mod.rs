pub mod pass;
pub mod snapshot;
pub mod watch;
