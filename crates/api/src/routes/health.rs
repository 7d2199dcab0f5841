use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the spreadsheet client was initialised.
    pub sheets_ready: bool,
}

/// GET /health -- returns service status and spreadsheet readiness.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let sheets_ready = state.sheets.is_some();
    let status = if sheets_ready { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        sheets_ready,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
