use std::sync::Arc;

use trainlog_sheets::SheetsApi;

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// `None` when the client failed to initialise at startup.
    pub sheets: Option<Arc<dyn SheetsApi>>,
}

impl AppState {
    pub fn new(config: ServerConfig, sheets: Option<Arc<dyn SheetsApi>>) -> Self {
        Self {
            config: Arc::new(config),
            sheets,
        }
    }

    /// The spreadsheet client, or [`AppError::NotInitialized`].
    pub fn sheets(&self) -> AppResult<Arc<dyn SheetsApi>> {
        self.sheets.clone().ok_or(AppError::NotInitialized)
    }
}
