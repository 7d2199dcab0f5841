//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server is
//! involved.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use trainlog_api::error::{AppError, NOT_INITIALIZED_MESSAGE};
use trainlog_sheets::SheetsError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: BadRequest maps to 400 with only an error message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bad_request_returns_400_without_success_flag() {
    let (status, json) =
        error_to_response(AppError::BadRequest("Range parameter is required".into())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, serde_json::json!({ "error": "Range parameter is required" }));
}

// ---------------------------------------------------------------------------
// Test: upstream errors map to 500 and keep their message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upstream_error_returns_500_with_message_verbatim() {
    let err = AppError::Sheets(SheetsError::Api {
        status: 403,
        message: "The caller does not have permission".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "The caller does not have permission");
}

#[tokio::test]
async fn invalid_range_message_matches_google() {
    let err = AppError::from(SheetsError::InvalidRange("Sheet1!!A1".into()));
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Unable to parse range: Sheet1!!A1");
}

// ---------------------------------------------------------------------------
// Test: missing client maps to 500
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_initialized_returns_500() {
    let (status, json) = error_to_response(AppError::NotInitialized).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], NOT_INITIALIZED_MESSAGE);
}
