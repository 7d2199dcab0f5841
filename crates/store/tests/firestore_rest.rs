//! Firestore REST adapter against a mock server.

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use futures::StreamExt;
use serde_json::json;
use trainlog_gcp::StaticTokenProvider;
use trainlog_store::{DocumentStore, Fields, Filter, FirestoreStore, Query, StoreError};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const DOCS: &str = "/projects/demo/databases/trainlog/documents";

fn store_for(server: &MockServer) -> FirestoreStore {
    FirestoreStore::new("demo", "trainlog", Arc::new(StaticTokenProvider("tok".into())))
        .with_base_url(server.uri())
        .with_poll_interval(Duration::from_millis(20))
}

fn record_doc(id: &str, memo: &str) -> serde_json::Value {
    json!({
        "name": format!("projects/demo/databases/trainlog/documents/records/{id}"),
        "fields": {
            "ownerId": {"stringValue": "amy"},
            "memo": {"stringValue": memo},
        }
    })
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_missing_document_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/users/ghost")))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(store_for(&server).get("users", "ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn get_decodes_typed_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/users/amy")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/demo/databases/trainlog/documents/users/amy",
            "fields": {
                "displayName": {"stringValue": "Amy"},
                "role": {"stringValue": "student"},
                "password": {"stringValue": "pw"},
            }
        })))
        .mount(&server)
        .await;

    let doc = store_for(&server).get("users", "amy").await.unwrap().unwrap();
    assert_eq!(doc.id, "amy");
    assert_eq!(doc.fields["displayName"], "Amy");
}

#[tokio::test]
async fn merge_sends_update_mask() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{DOCS}/users/amy")))
        .and(query_param("updateMask.fieldPaths", "password"))
        .and(body_partial_json(json!({"fields": {"password": {"stringValue": "$argon2id$x"}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut fields = Fields::new();
    fields.insert("password".into(), json!("$argon2id$x"));
    store_for(&server).merge("users", "amy", fields).await.unwrap();
}

#[tokio::test]
async fn create_conflict_reports_existing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}/records")))
        .and(query_param("documentId", "amy_2024-05-01"))
        .respond_with(ResponseTemplate::new(409).set_body_string("ALREADY_EXISTS"))
        .mount(&server)
        .await;

    let created = store_for(&server)
        .create("records", "amy_2024-05-01", Fields::new())
        .await
        .unwrap();
    assert!(!created);
}

#[tokio::test]
async fn api_errors_carry_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(403).set_body_string("PERMISSION_DENIED"))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .set("records", "x", Fields::new())
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Api { status: 403, ref body } if body == "PERMISSION_DENIED");
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn run_query_skips_entries_without_documents() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .and(body_partial_json(json!({
            "structuredQuery": {"from": [{"collectionId": "records"}]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"document": record_doc("amy_2024-05-01", "a"), "readTime": "2024-05-01T00:00:00Z"},
            {"readTime": "2024-05-01T00:00:00Z"},
        ])))
        .mount(&server)
        .await;

    let snap = store_for(&server)
        .query(&Query::collection("records").filter(Filter::eq("ownerId", "amy")))
        .await
        .unwrap();
    assert_eq!(snap.len(), 1);
    assert_eq!(snap.documents[0].fields["memo"], "a");
}

#[tokio::test]
async fn empty_in_filter_short_circuits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let snap = store_for(&server)
        .query(&Query::collection("records").filter(Filter::is_in("ownerId", Vec::<String>::new())))
        .await
        .unwrap();
    assert!(snap.is_empty());
}

/// Number of values in the top-level `IN` filter of a `runQuery` body.
fn in_list_len(request: &Request) -> Option<usize> {
    let body: serde_json::Value = serde_json::from_slice(&request.body).ok()?;
    body["structuredQuery"]["where"]["fieldFilter"]["value"]["arrayValue"]["values"]
        .as_array()
        .map(Vec::len)
}

fn owned_doc(id: &str, owner: &str) -> serde_json::Value {
    json!({
        "name": format!("projects/demo/databases/trainlog/documents/records/{id}"),
        "fields": { "ownerId": {"stringValue": owner} }
    })
}

#[tokio::test]
async fn long_owner_lists_are_queried_in_chunks_of_thirty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .and(|req: &Request| in_list_len(req) == Some(30))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"document": owned_doc("s00_2024-05-01", "s00")},
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .and(|req: &Request| in_list_len(req) == Some(1))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"document": owned_doc("s30_2024-05-01", "s30")},
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let owners: Vec<String> = (0..31).map(|i| format!("s{i:02}")).collect();
    let snap = store_for(&server)
        .query(&Query::collection("records").filter(Filter::is_in("ownerId", owners)))
        .await
        .unwrap();
    let ids: Vec<&str> = snap.documents.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["s00_2024-05-01", "s30_2024-05-01"]);
}

#[tokio::test]
async fn listen_polls_and_emits_only_changes() {
    let server = MockServer::start().await;
    // First two polls see the same result; later polls see an edit.
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"document": record_doc("amy_2024-05-01", "v1")}])),
        )
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"document": record_doc("amy_2024-05-01", "v2")}])),
        )
        .mount(&server)
        .await;

    let mut stream = store_for(&server).listen(Query::collection("records"));
    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.documents[0].fields["memo"], "v1");
    let second = tokio::time::timeout(Duration::from_secs(2), stream.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(second.documents[0].fields["memo"], "v2");
}
