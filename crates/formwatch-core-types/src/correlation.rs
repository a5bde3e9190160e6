//! Correlation types for pass tracking and tracing
//!
//! Every reconciliation pass gets its own [`PassId`] so that the log lines of
//! overlapping passes (two webhook deliveries for the same sheet edit) can be
//! told apart. An optional [`TraceId`] carries the identifier of whatever
//! woke the pass up, e.g. the push channel message number.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PassId(String);

impl PassId {
    /// Generate a new PassId using UUIDv7 (time ordered)
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for PassId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PassId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the external trigger that caused a pass
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId(String);

impl TraceId {
    /// Wrap a trigger-supplied identifier
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried through one pass for correlation
#[derive(Debug, Clone)]
pub struct PassContext {
    pub pass_id: PassId,
    pub trace_id: Option<TraceId>,
    /// Human readable origin of the pass ("webhook", "cli", "watch")
    pub origin: &'static str,
}

impl PassContext {
    /// Create a new context with a fresh PassId
    pub fn new(origin: &'static str) -> Self {
        Self {
            pass_id: PassId::new(),
            trace_id: None,
            origin,
        }
    }

    /// Attach the trigger's identifier
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }
}

impl Default for PassContext {
    fn default() -> Self {
        Self::new("unknown")
    }
}
