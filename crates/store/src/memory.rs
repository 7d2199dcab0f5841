//! In-process [`DocumentStore`] with push-based live queries.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::sync::{broadcast, RwLock};

use crate::document::{Document, Fields, Query, QuerySnapshot};
use crate::error::StoreError;
use crate::store::{DocumentStore, SnapshotStream};

/// Capacity of the change feed. Listeners that fall behind re-query.
const CHANGE_FEED_CAPACITY: usize = 256;

type Collections = HashMap<String, BTreeMap<String, Fields>>;

/// A [`DocumentStore`] held entirely in memory.
///
/// Every write publishes the collection name on a broadcast channel;
/// listeners re-evaluate their query on each change and emit a snapshot
/// only when the result set actually differs. Cloning shares the data.
#[derive(Clone)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
    changes: broadcast::Sender<String>,
    offline: Arc<AtomicBool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            changes,
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Simulate losing the backend: while offline every operation fails
    /// with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of documents in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        Ok(())
    }

    fn notify(&self, collection: &str) {
        // No receivers is fine.
        let _ = self.changes.send(collection.to_string());
    }

    async fn evaluate(&self, query: &Query) -> QuerySnapshot {
        let collections = self.collections.read().await;
        let docs: Vec<Document> = collections
            .get(&query.collection)
            .map(|c| {
                c.iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default();
        query.evaluate(&docs)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.ensure_online()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|c| c.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.ensure_online()?;
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
        self.notify(collection);
        Ok(())
    }

    async fn create(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<bool, StoreError> {
        self.ensure_online()?;
        {
            let mut collections = self.collections.write().await;
            let docs = collections.entry(collection.to_string()).or_default();
            if docs.contains_key(id) {
                return Ok(false);
            }
            docs.insert(id.to_string(), fields);
        }
        self.notify(collection);
        Ok(true)
    }

    async fn merge(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.ensure_online()?;
        {
            let mut collections = self.collections.write().await;
            let doc = collections
                .entry(collection.to_string())
                .or_default()
                .entry(id.to_string())
                .or_default();
            doc.extend(fields);
        }
        self.notify(collection);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.ensure_online()?;
        let removed = self
            .collections
            .write()
            .await
            .get_mut(collection)
            .and_then(|c| c.remove(id))
            .is_some();
        if removed {
            self.notify(collection);
        }
        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<QuerySnapshot, StoreError> {
        self.ensure_online()?;
        Ok(self.evaluate(query).await)
    }

    fn listen(&self, query: Query) -> SnapshotStream {
        // Subscribe before the first evaluation so no change is missed.
        let rx = self.changes.subscribe();
        let store = self.clone();
        stream::unfold(
            (store, query, rx, None::<QuerySnapshot>, true),
            |(store, query, mut rx, last, mut first)| async move {
                loop {
                    if !first {
                        loop {
                            match rx.recv().await {
                                Ok(collection) if collection == query.collection => break,
                                Ok(_) => continue,
                                Err(broadcast::error::RecvError::Lagged(_)) => break,
                                Err(broadcast::error::RecvError::Closed) => return None,
                            }
                        }
                    }
                    first = false;
                    if let Err(e) = store.ensure_online() {
                        return Some((Err(e), (store, query, rx, last, first)));
                    }
                    let snapshot = store.evaluate(&query).await;
                    if last.as_ref() != Some(&snapshot) {
                        let next = Some(snapshot.clone());
                        return Some((Ok(snapshot), (store, query, rx, next, first)));
                    }
                }
            },
        )
        .boxed()
    }
}
