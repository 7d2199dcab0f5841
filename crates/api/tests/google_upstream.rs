//! The proxy in front of the real Sheets client, against a mock Google.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, post_json};
use serde_json::json;
use trainlog_gcp::StaticTokenProvider;
use trainlog_sheets::{GoogleSheetsClient, SheetsApi};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app_for(server: &MockServer) -> axum::Router {
    let client = GoogleSheetsClient::new("sid", Arc::new(StaticTokenProvider("tok".into())))
        .with_base_url(server.uri());
    build_test_app(Some(Arc::new(client) as Arc<dyn SheetsApi>))
}

#[tokio::test]
async fn google_error_message_is_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "Unable to parse range: Nope!A1",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = get(app_for(&server), "/readSheet?range=Nope!A1").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "success": false, "error": "Unable to parse range: Nope!A1" })
    );
}

#[tokio::test]
async fn write_response_is_reshaped() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/spreadsheets/sid/values/Sheet1%21A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "spreadsheetId": "sid",
            "updatedRange": "Sheet1!A1",
            "updatedRows": 1,
            "updatedColumns": 1,
            "updatedCells": 1
        })))
        .mount(&server)
        .await;

    let response = post_json(
        app_for(&server),
        "/writeSheet",
        json!({ "range": "Sheet1!A1", "values": [["x"]] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "success": true, "updatedCells": 1, "updatedRange": "Sheet1!A1" })
    );
}

#[tokio::test]
async fn missing_parameters_never_reach_google() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;
    Mock::given(method("PUT")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

    let response = get(app_for(&server), "/readSheet").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let response = post_json(app_for(&server), "/writeSheet", json!({ "values": [["x"]] })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
