//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names identical across the engine, the store
//! and the adapters so that log queries work across all of them.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_PASS_ID: &str = "pass_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Entity identifiers
pub const FIELD_ROW_KEY: &str = "row_key";
pub const FIELD_DOC_REF: &str = "doc_ref";
pub const FIELD_VERSION: &str = "version";

// Pass tallies
pub const FIELD_ROWS_FETCHED: &str = "rows_fetched";
pub const FIELD_CHANGES: &str = "changes";
pub const FIELD_CHANGES_SENT: &str = "changes_sent";
pub const FIELD_CHANGES_FAILED: &str = "changes_failed";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
