use formwatch_core::errors::{ExError, ExErrorKind, FormwatchError};
use formwatch_core_types::PassId;
use std::error::Error as _;

#[test]
fn test_unknown_placeholder_maps_to_invalid_template() {
    let err = FormwatchError::UnknownPlaceholder {
        name: "phone_number".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidTemplate);
    assert_eq!(ex_err.code(), "ERR_INVALID_TEMPLATE");
    assert!(ex_err.message().contains("phone_number"));
}

#[test]
fn test_missing_recipient_carries_row_key() {
    let err = FormwatchError::MissingRecipient {
        row_key: "2025. 6. 12 02:26:19".to_string(),
        reason: "phone column is empty".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::DeliveryFailed);
    assert_eq!(ex_err.row_key(), Some("2025. 6. 12 02:26:19"));
}

#[test]
fn test_invalid_timestamp_maps_to_own_kind() {
    let err = FormwatchError::InvalidTimestamp {
        input: "yesterday".to_string(),
        reason: "expected year, month and day".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidTimestamp);
    assert_eq!(ex_err.op(), Some("parse_submission_timestamp"));
}

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (ExErrorKind::SourceUnavailable, "ERR_SOURCE_UNAVAILABLE"),
        (ExErrorKind::StoreUnavailable, "ERR_STORE_UNAVAILABLE"),
        (ExErrorKind::VersionConflict, "ERR_VERSION_CONFLICT"),
        (ExErrorKind::DeliveryFailed, "ERR_DELIVERY_FAILED"),
        (ExErrorKind::InvalidTemplate, "ERR_INVALID_TEMPLATE"),
        (ExErrorKind::Config, "ERR_CONFIG"),
        (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
        (ExErrorKind::Unauthorised, "ERR_UNAUTHORISED"),
    ];

    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
    }
}

#[test]
fn test_builder_context_is_retained() {
    let pass_id = PassId::new();
    let err = ExError::new(ExErrorKind::StoreUnavailable)
        .with_op("commit_if_version")
        .with_doc_ref("sheet_snapshots/main")
        .with_pass_id(pass_id.clone())
        .with_message("database is locked");

    assert_eq!(err.op(), Some("commit_if_version"));
    assert_eq!(err.doc_ref(), Some("sheet_snapshots/main"));
    assert_eq!(err.pass_id(), Some(&pass_id));
    assert_eq!(
        err.to_string(),
        "[ERR_STORE_UNAVAILABLE] in operation 'commit_if_version': database is locked (doc_ref: sheet_snapshots/main)"
    );
}

#[test]
fn test_source_chain_is_exposed() {
    let cause = ExError::new(ExErrorKind::Timeout).with_message("no response in 10s");
    let err = ExError::new(ExErrorKind::SourceUnavailable)
        .with_op("fetch_all")
        .with_source(cause);

    assert_eq!(
        err.source_error().map(|e| e.kind()),
        Some(ExErrorKind::Timeout)
    );
    assert!(err.source().is_some());
}
