//! The explicit context passed to every client operation.

use std::sync::Arc;

use trainlog_core::session::Session;
use trainlog_core::util::today;
use trainlog_store::DocumentStore;

use crate::config::ClientConfig;
use crate::debounce::Debouncer;
use crate::error::{ClientError, ClientResult};
use crate::state::{AppState, AppStore};
use crate::storage::{FileStorage, LocalStorage};
use crate::subscription::SubscriptionRegistry;

/// Handles shared by the sync, auth and render layers. Cheap to clone.
#[derive(Clone)]
pub struct ClientContext {
    pub config: Arc<ClientConfig>,
    store: Option<Arc<dyn DocumentStore>>,
    pub state: Arc<AppStore>,
    pub subscriptions: SubscriptionRegistry,
    pub storage: Arc<dyn LocalStorage>,
    /// Debounces record reloads triggered by date selection.
    pub record_reload: Debouncer,
}

impl ClientContext {
    /// Assemble a context from parts. `store` is `None` when the document
    /// store could not be initialised.
    pub fn new(
        config: ClientConfig,
        store: Option<Arc<dyn DocumentStore>>,
        storage: Arc<dyn LocalStorage>,
    ) -> Self {
        let record_reload = Debouncer::new(config.debounce);
        Self {
            config: Arc::new(config),
            store,
            state: Arc::new(AppStore::new(AppState::new(today()))),
            subscriptions: SubscriptionRegistry::new(),
            storage,
            record_reload,
        }
    }

    /// Connect using `config`. A store that fails to initialise is logged
    /// and the context runs without it.
    pub fn initialize(config: ClientConfig) -> Self {
        let storage: Arc<dyn LocalStorage> = Arc::new(FileStorage::new(&config.storage_dir));
        let store = match config.connect_store() {
            Ok(store) => {
                tracing::info!(
                    project = config.firestore_project.as_deref().unwrap_or_default(),
                    "Document store connected",
                );
                Some(store)
            }
            Err(e) => {
                tracing::error!(error = %e, "Document store unavailable, running degraded");
                None
            }
        };
        Self::new(config, store, storage)
    }

    /// The document store, or [`ClientError::StoreUnavailable`].
    pub fn store(&self) -> ClientResult<Arc<dyn DocumentStore>> {
        self.store.clone().ok_or(ClientError::StoreUnavailable)
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// The logged-in session, or [`ClientError::NotLoggedIn`].
    pub async fn session(&self) -> ClientResult<Session> {
        self.state
            .read(|s| s.session.clone())
            .await
            .ok_or(ClientError::NotLoggedIn)
    }
}
