//! Google Sheets REST client against a mock server.

use std::sync::Arc;

use assert_matches::assert_matches;
use serde_json::json;
use trainlog_gcp::StaticTokenProvider;
use trainlog_sheets::{GoogleSheetsClient, SheetsApi, SheetsError, ValueRange};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GoogleSheetsClient {
    GoogleSheetsClient::new("sid", Arc::new(StaticTokenProvider("tok".into())))
        .with_base_url(server.uri())
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

#[tokio::test]
async fn read_values_encodes_range_and_sends_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spreadsheets/sid/values/Sheet1%21A1%3AB2"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "Sheet1!A1:B2",
            "majorDimension": "ROWS",
            "values": [["a", "b"], ["1", "2"]],
        })))
        .mount(&server)
        .await;

    let read = client_for(&server).read_values("Sheet1!A1:B2").await.unwrap();
    assert_eq!(read.values[1][1], "2");
}

#[tokio::test]
async fn empty_range_has_no_values_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "Sheet1!Z1:Z9", "majorDimension": "ROWS",
        })))
        .mount(&server)
        .await;

    let read = client_for(&server).read_values("Sheet1!Z1:Z9").await.unwrap();
    assert!(read.values.is_empty());
}

#[tokio::test]
async fn write_uses_user_entered_input() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/spreadsheets/sid/values/Sheet1%21A1"))
        .and(query_param("valueInputOption", "USER_ENTERED"))
        .and(body_partial_json(json!({"values": [["x"]]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "spreadsheetId": "sid",
            "updatedRange": "Sheet1!A1",
            "updatedRows": 1, "updatedColumns": 1, "updatedCells": 1,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let res = client_for(&server)
        .write_values("Sheet1!A1", vec![vec![json!("x")]])
        .await
        .unwrap();
    assert_eq!(res.updated_cells, 1);
    assert_eq!(res.updated_range, "Sheet1!A1");
}

#[tokio::test]
async fn append_posts_to_append_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/spreadsheets/sid/values/Log%21A%3AC:append"))
        .and(query_param("valueInputOption", "USER_ENTERED"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "spreadsheetId": "sid",
            "tableRange": "Log!A1:C4",
            "updates": {"updatedRange": "Log!A5:C5", "updatedRows": 1, "updatedColumns": 3, "updatedCells": 3},
        })))
        .mount(&server)
        .await;

    let res = client_for(&server)
        .append_values("Log!A:C", vec![vec![json!(1), json!(2), json!(3)]])
        .await
        .unwrap();
    assert_eq!(res.updates.updated_range, "Log!A5:C5");
}

#[tokio::test]
async fn batch_update_posts_all_ranges() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/spreadsheets/sid/values:batchUpdate"))
        .and(body_partial_json(json!({
            "valueInputOption": "USER_ENTERED",
            "data": [{"range": "Sheet1!A1"}, {"range": "Sheet1!B1"}],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "spreadsheetId": "sid",
            "totalUpdatedCells": 2,
            "responses": [{"updatedRange": "Sheet1!A1"}, {"updatedRange": "Sheet1!B1"}],
        })))
        .mount(&server)
        .await;

    let res = client_for(&server)
        .batch_update(vec![
            ValueRange::new("Sheet1!A1", vec![vec![json!("a")]]),
            ValueRange::new("Sheet1!B1", vec![vec![json!("b")]]),
        ])
        .await
        .unwrap();
    assert_eq!(res.total_updated_cells, 2);
    assert_eq!(res.responses.len(), 2);
}

// ---------------------------------------------------------------------------
// Metadata and errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn spreadsheet_info_lists_titles() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spreadsheets/sid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "spreadsheetId": "sid",
            "sheets": [
                {"properties": {"sheetId": 0, "title": "Sheet1", "index": 0}},
                {"properties": {"sheetId": 7, "title": "Log", "index": 1}},
            ],
        })))
        .mount(&server)
        .await;

    let info = client_for(&server).spreadsheet_info().await.unwrap();
    assert_eq!(info.sheet_titles(), vec!["Sheet1", "Log"]);
}

#[tokio::test]
async fn google_error_message_is_surfaced_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "Unable to parse range: Nope!A1", "status": "INVALID_ARGUMENT"},
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).read_values("Nope!A1").await.unwrap_err();
    assert_eq!(err.to_string(), "Unable to parse range: Nope!A1");
    assert_matches!(err, SheetsError::Api { status: 400, .. });
}
