mod common;

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use formwatch_connectors::{SheetsAuth, SheetsConfig, SheetsRowSource};
use formwatch_core::{ExErrorKind, RowSource};
use formwatch_core_types::Sensitive;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

fn config(base_url: String, auth: SheetsAuth) -> SheetsConfig {
    SheetsConfig {
        base_url,
        spreadsheet_id: "sheet-1".to_string(),
        sheet_name: "Sheet1".to_string(),
        range: "A1:Z".to_string(),
        header_rows: 1,
        auth,
        timeout: Duration::from_secs(5),
    }
}

fn api_key() -> SheetsAuth {
    SheetsAuth::ApiKey(Sensitive::new("test-key".to_string()))
}

async fn values(
    Path((id, range)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let key_ok = query.get("key").map(String::as_str) == Some("test-key");
    let bearer_ok = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some("Bearer token-1");
    if !(key_ok || bearer_ok) {
        return (StatusCode::FORBIDDEN, Json(json!({"error": "denied"}))).into_response();
    }
    Json(json!({
        "range": format!("{}/{}", id, range),
        "majorDimension": "ROWS",
        "values": [
            ["Timestamp", "Name", "Phone", "Inquiry"],
            ["2024. 3. 1 오후 2:05:09", "Kim", "010-1111-2222", "pricing", ""],
            [],
            ["2024. 3. 2 오전 9:00:00", "Lee", 1012345678_u64, "demo"]
        ]
    }))
    .into_response()
}

fn sheets_router() -> Router {
    Router::new().route("/v4/spreadsheets/:id/values/:range", get(values))
}

#[test]
fn test_fetch_skips_header_and_keeps_blank_rows() {
    let base = common::serve(sheets_router());
    let source = SheetsRowSource::new(config(format!("{}/v4", base), api_key())).unwrap();

    let rows = source.fetch_all().unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].key(), "2024. 3. 1 오후 2:05:09");
    assert_eq!(rows[0].len(), 4, "trailing empty cell trimmed");
    assert!(rows[1].is_blank());
    assert_eq!(rows[2].cell(2), Some("1012345678"));
}

#[test]
fn test_bearer_token_is_sent_as_header() {
    let base = common::serve(sheets_router());
    let auth = SheetsAuth::Bearer(Sensitive::new("token-1".to_string()));
    let source = SheetsRowSource::new(config(format!("{}/v4", base), auth)).unwrap();

    assert_eq!(source.fetch_all().unwrap().len(), 3);
}

#[test]
fn test_http_error_is_source_unavailable() {
    let base = common::serve(sheets_router());
    let auth = SheetsAuth::ApiKey(Sensitive::new("wrong".to_string()));
    let source = SheetsRowSource::new(config(format!("{}/v4", base), auth)).unwrap();

    let err = source.fetch_all().unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::SourceUnavailable);
    assert!(err.message().contains("403"));
    assert!(!err.to_string().contains("wrong"), "credential leaked");
}

#[test]
fn test_malformed_body_is_source_unavailable() {
    let router = Router::new().route(
        "/v4/spreadsheets/:id/values/:range",
        get(|| async { "<html>not json</html>" }),
    );
    let base = common::serve(router);
    let source = SheetsRowSource::new(config(format!("{}/v4", base), api_key())).unwrap();

    let err = source.fetch_all().unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::SourceUnavailable);
}

#[test]
fn test_empty_sheet_has_no_values_field() {
    let router = Router::new().route(
        "/v4/spreadsheets/:id/values/:range",
        get(|| async { Json(json!({"range": "Sheet1!A1:Z1000", "majorDimension": "ROWS"})) }),
    );
    let base = common::serve(router);
    let source = SheetsRowSource::new(config(format!("{}/v4", base), api_key())).unwrap();

    assert!(source.fetch_all().unwrap().is_empty());
}

#[test]
fn test_unreachable_host_is_source_unavailable() {
    // Port 9 (discard) is not expected to accept HTTP on loopback.
    let mut cfg = config("http://127.0.0.1:9/v4".to_string(), api_key());
    cfg.timeout = Duration::from_secs(2);
    let source = SheetsRowSource::new(cfg).unwrap();

    let err = source.fetch_all().unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::SourceUnavailable);
}
