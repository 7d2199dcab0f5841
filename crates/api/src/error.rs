use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use trainlog_sheets::SheetsError;

/// Message returned when the server started without a spreadsheet client.
pub const NOT_INITIALIZED_MESSAGE: &str = "Spreadsheet client is not initialized";

/// Application-level error type for HTTP handlers.
///
/// Parameter errors answer 400 with `{ "error": message }`. Every other
/// failure answers 500 with `{ "success": false, "error": message }`, the
/// message passed through unchanged so callers see what the upstream said.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A required request parameter is missing.
    #[error("{0}")]
    BadRequest(String),

    /// The spreadsheet API rejected or failed the call.
    #[error(transparent)]
    Sheets(#[from] SheetsError),

    /// The spreadsheet client could not be built at startup.
    #[error("Spreadsheet client is not initialized")]
    NotInitialized,
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(message) => {
                tracing::debug!(error = %message, "Rejected request");
                (StatusCode::BAD_REQUEST, axum::Json(json!({ "error": message }))).into_response()
            }
            other => {
                let message = other.to_string();
                tracing::error!(error = %message, "Spreadsheet request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(json!({ "success": false, "error": message })),
                )
                    .into_response()
            }
        }
    }
}
