use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::document::{Document, Fields, Query, QuerySnapshot};
use crate::error::StoreError;

/// A live query: the current result set first, then a new snapshot every
/// time the result set changes. Dropping the stream ends the subscription.
pub type SnapshotStream = BoxStream<'static, Result<QuerySnapshot, StoreError>>;

/// A document database with live queries.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Create or fully replace a document.
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Create a document only if none exists. Returns `false` when a document
    /// with this id is already present; it is left untouched.
    async fn create(&self, collection: &str, id: &str, fields: Fields)
        -> Result<bool, StoreError>;

    /// Overwrite only the given fields, creating the document if needed.
    async fn merge(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Delete a document. Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Run a query once.
    async fn query(&self, query: &Query) -> Result<QuerySnapshot, StoreError>;

    /// Subscribe to a query.
    fn listen(&self, query: Query) -> SnapshotStream;
}
