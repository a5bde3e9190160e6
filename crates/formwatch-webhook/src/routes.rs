//! Axum router and HTTP handlers.
//!
//! `build_router` is the single entry point; `main.rs` calls it and binds
//! the listener, tests drive the bare router in-process.

use crate::state::AppState;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use formwatch_core::errors::{ExError, ExErrorKind};
use formwatch_core_types::{PassContext, TraceId};
use formwatch_engine::{apply_engine_command, EngineCommand};
use ring::constant_time;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

pub const CHANNEL_TOKEN_HEADER: &str = "x-goog-channel-token";
pub const CHANNEL_ID_HEADER: &str = "x-goog-channel-id";
pub const MESSAGE_NUMBER_HEADER: &str = "x-goog-message-number";
pub const RESOURCE_STATE_HEADER: &str = "x-goog-resource-state";

/// Error body returned with every non-2xx answer
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// Build the application router wired to the given shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/healthz", get(health))
        .route("/notifications", post(notifications))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

// ---------------------------------------------------------------------------
// POST /notifications
// ---------------------------------------------------------------------------

/// Drive change notification.
///
/// - `401` if a channel token is configured and the request's differs
/// - `200 ok` for the `sync` handshake sent when a channel is created
/// - `200` with the pass report otherwise, including conflict-skipped passes
/// - `503` if the pass failed, so the sender retries
pub(crate) async fn notifications(
    State(st): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    if let Some(expected) = &st.channel_token {
        if !token_matches(header(&headers, CHANNEL_TOKEN_HEADER), expected.expose()) {
            warn!("Rejected notification with a wrong channel token");
            let err = ExError::new(ExErrorKind::Unauthorised)
                .with_op("notifications")
                .with_message("channel token mismatch");
            return error_response(StatusCode::UNAUTHORIZED, &err);
        }
    }

    if header(&headers, RESOURCE_STATE_HEADER) == Some("sync") {
        info!(channel_id = ?header(&headers, CHANNEL_ID_HEADER), "Channel handshake");
        return (StatusCode::OK, "ok").into_response();
    }

    let mut ctx = PassContext::new("webhook");
    if let Some(trace_id) = trace_id(&headers) {
        ctx = ctx.with_trace_id(trace_id);
    }

    let state = Arc::clone(&st);
    let outcome = tokio::task::spawn_blocking(move || {
        apply_engine_command(EngineCommand::Reconcile, &ctx, state.collaborators())
    })
    .await;

    match outcome {
        Ok(Ok(report)) => (StatusCode::OK, Json(report)).into_response(),
        Ok(Err(err)) => error_response(StatusCode::SERVICE_UNAVAILABLE, &err),
        Err(join_err) => {
            let err = ExError::new(ExErrorKind::Internal)
                .with_op("notifications")
                .with_message(format!("pass worker failed: {}", join_err));
            error_response(StatusCode::SERVICE_UNAVAILABLE, &err)
        }
    }
}

/// Constant-time comparison of the presented channel token
fn token_matches(presented: Option<&str>, expected: &str) -> bool {
    presented.is_some_and(|token| {
        constant_time::verify_slices_are_equal(token.as_bytes(), expected.as_bytes()).is_ok()
    })
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// `{channel id}:{message number}` when the sender supplied them
fn trace_id(headers: &HeaderMap) -> Option<TraceId> {
    let channel = header(headers, CHANNEL_ID_HEADER)?;
    Some(match header(headers, MESSAGE_NUMBER_HEADER) {
        Some(number) => TraceId::from_string(format!("{}:{}", channel, number)),
        None => TraceId::from_string(channel),
    })
}

fn error_response(status: StatusCode, err: &ExError) -> Response {
    (
        status,
        Json(ErrorBody {
            code: err.code(),
            message: err.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_matches_only_exact_value() {
        assert!(token_matches(Some("s3cr3t"), "s3cr3t"));
        assert!(!token_matches(Some("s3cr3"), "s3cr3t"));
        assert!(!token_matches(Some("s3cr3T"), "s3cr3t"));
        assert!(!token_matches(Some(""), "s3cr3t"));
        assert!(!token_matches(None, "s3cr3t"));
    }
}
