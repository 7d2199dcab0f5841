//! Firestore REST v1 backend.
//!
//! Firestore's streaming `Listen` RPC is not exposed over plain REST, so
//! live queries poll `documents:runQuery` at a fixed interval and emit a
//! snapshot only when the result set changed since the last poll.

pub mod value;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use trainlog_gcp::TokenProvider;

use crate::document::{Direction, Document, Fields, Filter, FilterOp, Query, QuerySnapshot};
use crate::error::StoreError;
use crate::store::{DocumentStore, SnapshotStream};
use value::{decode_document, encode_fields, encode_value};

/// Public Firestore REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Default database id.
pub const DEFAULT_DATABASE: &str = "(default)";

/// Default interval between live-query polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Most values Firestore accepts in one `IN` filter.
pub const MAX_IN_VALUES: usize = 30;

/// One element of a `runQuery` response array.
#[derive(Debug, Deserialize)]
struct RunQueryItem {
    #[serde(default)]
    document: Option<Value>,
}

/// [`DocumentStore`] backed by the Firestore REST API.
#[derive(Clone)]
pub struct FirestoreStore {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    database: String,
    tokens: Arc<dyn TokenProvider>,
    poll_interval: Duration,
}

impl FirestoreStore {
    pub fn new(
        project_id: impl Into<String>,
        database: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: project_id.into(),
            database: database.into(),
            tokens,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Point at a different endpoint (emulator, mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents",
            self.base_url, self.project_id, self.database
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.documents_url(),
            collection,
            urlencoding::encode(id)
        )
    }

    async fn authorized(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, StoreError> {
        let token = self.tokens.access_token().await?;
        Ok(builder.bearer_auth(token).send().await?)
    }

    // ---- private helpers ----

    /// Returns the response unchanged on success, or
    /// [`StoreError::Api`] with the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StoreError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn patch(
        &self,
        collection: &str,
        id: &str,
        fields: &Fields,
        mask: Option<Vec<(&str, &str)>>,
    ) -> Result<(), StoreError> {
        let mut request = self
            .client
            .patch(self.document_url(collection, id))
            .json(&json!({ "fields": encode_fields(fields) }));
        if let Some(mask) = mask {
            request = request.query(&mask);
        }
        let response = self.authorized(request).await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn run_query(&self, query: &Query) -> Result<QuerySnapshot, StoreError> {
        let request = self
            .client
            .post(format!("{}:runQuery", self.documents_url()))
            .json(&structured_query(query));
        let response = self.authorized(request).await?;
        let items: Vec<RunQueryItem> = Self::ensure_success(response).await?.json().await?;
        let documents = items
            .iter()
            .filter_map(|item| item.document.as_ref())
            .map(decode_document)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(QuerySnapshot { documents })
    }
}

/// Split a query whose `IN` filter lists more than [`MAX_IN_VALUES`] values
/// into one query per chunk of values. The parts carry no limit; ordering
/// and limit are applied once their results are merged.
pub fn split_in_filter(query: &Query) -> Option<Vec<Query>> {
    let index = query.filters.iter().position(|f| {
        f.op == FilterOp::In && f.value.as_array().is_some_and(|v| v.len() > MAX_IN_VALUES)
    })?;
    let values = query.filters[index].value.as_array()?;
    let parts = values
        .chunks(MAX_IN_VALUES)
        .map(|chunk| {
            let mut part = query.clone();
            part.filters[index].value = Value::Array(chunk.to_vec());
            part.limit = None;
            part
        })
        .collect();
    Some(parts)
}

/// Build the `structuredQuery` body for a [`Query`].
pub fn structured_query(query: &Query) -> Value {
    let mut structured = json!({
        "from": [{ "collectionId": query.collection }],
    });

    let filters: Vec<Value> = query.filters.iter().map(field_filter).collect();
    match filters.len() {
        0 => {}
        1 => structured["where"] = filters.into_iter().next().unwrap_or(Value::Null),
        _ => {
            structured["where"] = json!({
                "compositeFilter": { "op": "AND", "filters": filters }
            })
        }
    }

    if let Some((field, direction)) = &query.order_by {
        let direction = match direction {
            Direction::Ascending => "ASCENDING",
            Direction::Descending => "DESCENDING",
        };
        structured["orderBy"] = json!([{ "field": { "fieldPath": field }, "direction": direction }]);
    }
    if let Some(limit) = query.limit {
        structured["limit"] = json!(limit);
    }
    json!({ "structuredQuery": structured })
}

fn field_filter(filter: &Filter) -> Value {
    let op = match filter.op {
        FilterOp::Eq => "EQUAL",
        FilterOp::In => "IN",
        FilterOp::Lt => "LESS_THAN",
        FilterOp::Lte => "LESS_THAN_OR_EQUAL",
        FilterOp::Gt => "GREATER_THAN",
        FilterOp::Gte => "GREATER_THAN_OR_EQUAL",
    };
    json!({
        "fieldFilter": {
            "field": { "fieldPath": filter.field },
            "op": op,
            "value": encode_value(&filter.value),
        }
    })
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let response = self
            .authorized(self.client.get(self.document_url(collection, id)))
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: Value = Self::ensure_success(response).await?.json().await?;
        Ok(Some(decode_document(&body)?))
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.patch(collection, id, &fields, None).await
    }

    async fn create(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<bool, StoreError> {
        let request = self
            .client
            .post(format!("{}/{}", self.documents_url(), collection))
            .query(&[("documentId", id)])
            .json(&json!({ "fields": encode_fields(&fields) }));
        let response = self.authorized(request).await?;
        if response.status() == reqwest::StatusCode::CONFLICT {
            return Ok(false);
        }
        Self::ensure_success(response).await?;
        Ok(true)
    }

    async fn merge(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mask: Vec<(&str, &str)> = fields
            .keys()
            .map(|k| ("updateMask.fieldPaths", k.as_str()))
            .collect();
        self.patch(collection, id, &fields, Some(mask)).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let response = self
            .authorized(self.client.delete(self.document_url(collection, id)))
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<QuerySnapshot, StoreError> {
        // Firestore rejects an empty IN list; it can match nothing anyway.
        let empty_in = query
            .filters
            .iter()
            .any(|f| f.op == FilterOp::In && f.value.as_array().is_some_and(Vec::is_empty));
        if empty_in {
            return Ok(QuerySnapshot::default());
        }

        let Some(parts) = split_in_filter(query) else {
            return self.run_query(query).await;
        };
        let snapshots = future::try_join_all(parts.iter().map(|part| self.run_query(part))).await?;
        let documents: Vec<Document> = snapshots.into_iter().flat_map(|s| s.documents).collect();
        Ok(query.evaluate(&documents))
    }

    fn listen(&self, query: Query) -> SnapshotStream {
        let store = self.clone();
        stream::unfold(
            (store, query, None::<QuerySnapshot>, true),
            |(store, query, mut last, mut first)| async move {
                loop {
                    if !first {
                        tokio::time::sleep(store.poll_interval).await;
                    }
                    first = false;
                    match store.query(&query).await {
                        Ok(snapshot) => {
                            if last.as_ref() != Some(&snapshot) {
                                last = Some(snapshot.clone());
                                return Some((Ok(snapshot), (store, query, last, first)));
                            }
                        }
                        Err(e) => {
                            tracing::warn!(
                                collection = %query.collection,
                                error = %e,
                                "Live query poll failed",
                            );
                            return Some((Err(e), (store, query, last, first)));
                        }
                    }
                }
            },
        )
        .boxed()
    }
}
