//! Core types shared across Formwatch facilities
//!
//! This crate provides foundational types used by the error facility,
//! the logging facility and every adapter crate:
//!
//! - **Correlation types**: PassId, TraceId, PassContext
//! - **Sensitive data**: Sensitive<T> marker for automatic redaction
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::{PassContext, PassId, TraceId};
pub use sensitive::Sensitive;
