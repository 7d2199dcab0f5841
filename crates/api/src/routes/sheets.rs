use axum::routing::{get, post};
use axum::Router;

use crate::handlers::sheets;
use crate::state::AppState;

/// The five spreadsheet proxy endpoints, mounted at the root.
///
/// ```text
/// GET  /readSheet?range=        read_sheet
/// POST /writeSheet              write_sheet
/// POST /appendSheet             append_sheet
/// GET  /getSheetInfo            get_sheet_info
/// POST /batchUpdateSheet        batch_update_sheet
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/readSheet", get(sheets::read_sheet))
        .route("/writeSheet", post(sheets::write_sheet))
        .route("/appendSheet", post(sheets::append_sheet))
        .route("/getSheetInfo", get(sheets::get_sheet_info))
        .route("/batchUpdateSheet", post(sheets::batch_update_sheet))
}
