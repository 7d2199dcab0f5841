//! Shared response envelope for the sheet endpoints.
//!
//! Successful responses are flat JSON objects carrying `"success": true`
//! next to the payload fields. Use [`SuccessResponse`] instead of ad-hoc
//! `json!` so the payload stays typed.

use serde::Serialize;

/// `{ "success": true, ...T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(SuccessResponse::ok(ReadSheetData { values })))
/// ```
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
