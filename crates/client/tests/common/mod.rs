#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::StreamExt;
use tokio::sync::oneshot;
use trainlog_client::auth::password::hash_password;
use trainlog_client::storage::{LocalStorage, MemoryStorage};
use trainlog_client::{AppState, ClientConfig, ClientContext};
use trainlog_core::roles::Role;
use trainlog_core::session::{Credential, Session};
use trainlog_store::models::user::StoredUser;
use trainlog_store::repositories::UserRepo;
use trainlog_store::{
    Document, DocumentStore, Fields, MemoryStore, Query, QuerySnapshot, SnapshotStream,
    StoreError,
};

pub const STUDENT: &str = "amy";
pub const STUDENT_PASSWORD: &str = "1234";
pub const OTHER_STUDENT: &str = "bo";
pub const OTHER_PASSWORD: &str = "bench-press";
pub const COACH: &str = "kim";
pub const COACH_PASSWORD: &str = "whistle";

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

/// Build a context over the given store with in-memory local storage.
pub fn context_with(store: Arc<dyn DocumentStore>, storage: Arc<dyn LocalStorage>) -> ClientContext {
    ClientContext::new(ClientConfig::default(), Some(store), storage)
}

/// A context over a fresh in-memory store seeded with two students (one
/// with a legacy plain password) and a coach.
pub async fn seeded_context() -> (ClientContext, MemoryStore) {
    let store = MemoryStore::new();
    seed_users(&store).await;
    let ctx = context_with(Arc::new(store.clone()), Arc::new(MemoryStorage::new()));
    (ctx, store)
}

pub async fn seed_users(store: &MemoryStore) {
    let users = [
        (STUDENT, "Amy", Role::Student, STUDENT_PASSWORD.to_string()),
        (OTHER_STUDENT, "Bo", Role::Student, hash_password(OTHER_PASSWORD).unwrap()),
        (COACH, "Kim", Role::Coach, hash_password(COACH_PASSWORD).unwrap()),
    ];
    for (id, name, role, password) in users {
        let user = StoredUser {
            user_id: id.into(),
            display_name: name.into(),
            role,
            password,
        };
        assert!(UserRepo::create(store, &user).await.unwrap());
    }
}

/// Put a session in place without opening any subscription.
pub async fn sign_in_as(ctx: &ClientContext, user_id: &str, role: Role) {
    let session = Session {
        user_id: user_id.into(),
        display_name: user_id.into(),
        role,
        credential: Credential::Plain(String::new()),
    };
    ctx.state
        .update(trainlog_client::StateField::Session, |s| s.session = Some(session))
        .await;
}

/// Wait until `pred` holds for the state, re-checking on every event.
pub async fn wait_for(ctx: &ClientContext, pred: impl Fn(&AppState) -> bool) {
    let mut events = ctx.state.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if ctx.state.read(&pred).await {
                return;
            }
            let _ = events.recv().await;
        }
    })
    .await
    .expect("state condition not reached in time");
}

// ---------------------------------------------------------------------------
// Store wrappers
// ---------------------------------------------------------------------------

/// Delegates to a [`MemoryStore`], counting live queries and optionally
/// holding back the first snapshot of the next one until released.
#[derive(Clone)]
pub struct InstrumentedStore {
    inner: MemoryStore,
    listens: Arc<AtomicUsize>,
    gate: Arc<Mutex<Option<oneshot::Receiver<()>>>>,
}

impl InstrumentedStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            listens: Arc::new(AtomicUsize::new(0)),
            gate: Arc::new(Mutex::new(None)),
        }
    }

    pub fn listens(&self) -> usize {
        self.listens.load(Ordering::SeqCst)
    }

    /// Hold back the next live query. Dropping or sending on the returned
    /// sender releases it.
    pub fn arm_gate(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock().unwrap() = Some(rx);
        tx
    }
}

#[async_trait]
impl DocumentStore for InstrumentedStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.inner.get(collection, id).await
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.inner.set(collection, id, fields).await
    }

    async fn create(&self, collection: &str, id: &str, fields: Fields) -> Result<bool, StoreError> {
        self.inner.create(collection, id, fields).await
    }

    async fn merge(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.inner.merge(collection, id, fields).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.inner.delete(collection, id).await
    }

    async fn query(&self, query: &Query) -> Result<QuerySnapshot, StoreError> {
        self.inner.query(query).await
    }

    fn listen(&self, query: Query) -> SnapshotStream {
        self.listens.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().take();
        let inner = self.inner.clone();
        match gate {
            None => inner.listen(query),
            Some(gate) => futures::stream::once(async move {
                let _ = gate.await;
                inner.listen(query)
            })
            .flatten()
            .boxed(),
        }
    }
}
