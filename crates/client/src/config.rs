//! Client configuration loaded from environment variables.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use trainlog_gcp::{ServiceAccountKey, ServiceAccountTokenProvider, DATASTORE_SCOPE};
use trainlog_store::firestore::DEFAULT_DATABASE;
use trainlog_store::{DocumentStore, FirestoreStore};

/// Default debounce delay for reload triggers, in milliseconds.
const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Default live-query poll interval, in milliseconds.
const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Default directory for local storage.
const DEFAULT_STORAGE_DIR: &str = ".trainlog";

/// Static connection parameters for the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Spreadsheet used for exports through the proxy.
    pub spreadsheet_id: Option<String>,
    pub firestore_project: Option<String>,
    pub firestore_database: String,
    /// Path to a service-account JSON key.
    pub credentials_path: Option<PathBuf>,
    pub storage_dir: PathBuf,
    pub debounce: Duration,
    pub poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            firestore_project: None,
            firestore_database: DEFAULT_DATABASE.to_string(),
            credentials_path: None,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                          | Default       |
    /// |----------------------------------|---------------|
    /// | `TRAINLOG_SPREADSHEET_ID`        | --            |
    /// | `TRAINLOG_FIRESTORE_PROJECT`     | --            |
    /// | `TRAINLOG_FIRESTORE_DATABASE`    | `(default)`   |
    /// | `GOOGLE_APPLICATION_CREDENTIALS` | --            |
    /// | `TRAINLOG_STORAGE_DIR`           | `.trainlog`   |
    /// | `TRAINLOG_DEBOUNCE_MS`           | `300`         |
    /// | `TRAINLOG_POLL_INTERVAL_MS`      | `2000`        |
    ///
    /// # Panics
    ///
    /// Panics if a numeric variable is set but cannot be parsed.
    pub fn from_env() -> Self {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let debounce_ms: u64 = std::env::var("TRAINLOG_DEBOUNCE_MS")
            .unwrap_or_else(|_| DEFAULT_DEBOUNCE_MS.to_string())
            .parse()
            .expect("TRAINLOG_DEBOUNCE_MS must be a valid u64");

        let poll_ms: u64 = std::env::var("TRAINLOG_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| DEFAULT_POLL_INTERVAL_MS.to_string())
            .parse()
            .expect("TRAINLOG_POLL_INTERVAL_MS must be a valid u64");

        Self {
            spreadsheet_id: non_empty("TRAINLOG_SPREADSHEET_ID"),
            firestore_project: non_empty("TRAINLOG_FIRESTORE_PROJECT"),
            firestore_database: non_empty("TRAINLOG_FIRESTORE_DATABASE")
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            credentials_path: non_empty("GOOGLE_APPLICATION_CREDENTIALS").map(PathBuf::from),
            storage_dir: non_empty("TRAINLOG_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR)),
            debounce: Duration::from_millis(debounce_ms),
            poll_interval: Duration::from_millis(poll_ms),
        }
    }

    /// Read a `.env` file if present, then [`ClientConfig::from_env`].
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Connect to Firestore with the configured project and credentials.
    pub fn connect_store(&self) -> Result<Arc<dyn DocumentStore>, String> {
        let project = self
            .firestore_project
            .as_deref()
            .ok_or("TRAINLOG_FIRESTORE_PROJECT is not set")?;
        let path = self
            .credentials_path
            .as_ref()
            .ok_or("GOOGLE_APPLICATION_CREDENTIALS is not set")?;
        let key = ServiceAccountKey::from_file(path).map_err(|e| e.to_string())?;
        let tokens = ServiceAccountTokenProvider::new(key, &[DATASTORE_SCOPE])
            .map_err(|e| e.to_string())?;
        let store = FirestoreStore::new(project, &self.firestore_database, tokens.into_shared())
            .with_poll_interval(self.poll_interval);
        Ok(Arc::new(store))
    }
}
