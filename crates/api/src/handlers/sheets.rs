//! Handlers for the spreadsheet proxy endpoints.
//!
//! Each handler checks its required parameters, forwards one call to the
//! spreadsheet API and wraps the result in [`SuccessResponse`]. Nothing is
//! retried.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use trainlog_sheets::{UpdateValuesResponse, ValueRange, Values};

use crate::error::{AppError, AppResult};
use crate::response::SuccessResponse;
use crate::state::AppState;

const RANGE_REQUIRED: &str = "Range parameter is required";
const RANGE_AND_VALUES_REQUIRED: &str = "Range and values are required";
const DATA_REQUIRED: &str = "Data array is required";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query string of `GET /readSheet`.
#[derive(Debug, Default, Deserialize)]
pub struct ReadSheetQuery {
    pub range: Option<String>,
}

/// Body of `POST /writeSheet` and `POST /appendSheet`.
#[derive(Debug, Default, Deserialize)]
pub struct ValuesRequest {
    pub range: Option<String>,
    pub values: Option<Values>,
}

/// Body of `POST /batchUpdateSheet`.
#[derive(Debug, Default, Deserialize)]
pub struct BatchUpdateRequest {
    pub data: Option<Vec<ValueRange>>,
}

#[derive(Debug, Serialize)]
pub struct ReadSheetData {
    pub values: Values,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteSheetData {
    pub updated_cells: u32,
    pub updated_range: String,
}

#[derive(Debug, Serialize)]
pub struct AppendSheetData {
    pub updates: UpdateValuesResponse,
}

#[derive(Debug, Serialize)]
pub struct SheetInfoData {
    pub sheets: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateData {
    pub total_updated_cells: u32,
    pub responses: Vec<UpdateValuesResponse>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /readSheet?range=Sheet1!A1:C10
pub async fn read_sheet(
    State(state): State<AppState>,
    query: Result<Query<ReadSheetQuery>, QueryRejection>,
) -> AppResult<Json<SuccessResponse<ReadSheetData>>> {
    let range = required(query_or_default(query).range)
        .ok_or_else(|| AppError::BadRequest(RANGE_REQUIRED.into()))?;

    let result = state.sheets()?.read_values(&range).await?;
    tracing::info!(%range, rows = result.values.len(), "Sheet read");

    Ok(Json(SuccessResponse::ok(ReadSheetData {
        values: result.values,
    })))
}

/// POST /writeSheet `{ "range": "...", "values": [[...]] }`
pub async fn write_sheet(
    State(state): State<AppState>,
    payload: Result<Json<ValuesRequest>, JsonRejection>,
) -> AppResult<Json<SuccessResponse<WriteSheetData>>> {
    let (range, values) = range_and_values(body_or_default(payload))?;

    let result = state.sheets()?.write_values(&range, values).await?;
    tracing::info!(%range, updated_cells = result.updated_cells, "Sheet written");

    Ok(Json(SuccessResponse::ok(WriteSheetData {
        updated_cells: result.updated_cells,
        updated_range: result.updated_range,
    })))
}

/// POST /appendSheet `{ "range": "...", "values": [[...]] }`
pub async fn append_sheet(
    State(state): State<AppState>,
    payload: Result<Json<ValuesRequest>, JsonRejection>,
) -> AppResult<Json<SuccessResponse<AppendSheetData>>> {
    let (range, values) = range_and_values(body_or_default(payload))?;

    let result = state.sheets()?.append_values(&range, values).await?;
    tracing::info!(
        %range,
        updated_range = %result.updates.updated_range,
        updated_rows = result.updates.updated_rows,
        "Sheet rows appended",
    );

    Ok(Json(SuccessResponse::ok(AppendSheetData {
        updates: result.updates,
    })))
}

/// GET /getSheetInfo
pub async fn get_sheet_info(
    State(state): State<AppState>,
) -> AppResult<Json<SuccessResponse<SheetInfoData>>> {
    let info = state.sheets()?.spreadsheet_info().await?;
    let sheets = info.sheet_titles();
    tracing::info!(count = sheets.len(), "Sheet info fetched");

    Ok(Json(SuccessResponse::ok(SheetInfoData { sheets })))
}

/// POST /batchUpdateSheet `{ "data": [{ "range": "...", "values": [[...]] }] }`
pub async fn batch_update_sheet(
    State(state): State<AppState>,
    payload: Result<Json<BatchUpdateRequest>, JsonRejection>,
) -> AppResult<Json<SuccessResponse<BatchUpdateData>>> {
    let data = body_or_default(payload)
        .data
        .ok_or_else(|| AppError::BadRequest(DATA_REQUIRED.into()))?;

    let ranges = data.len();
    let result = state.sheets()?.batch_update(data).await?;
    tracing::info!(ranges, total_updated_cells = result.total_updated_cells, "Sheet batch updated");

    Ok(Json(SuccessResponse::ok(BatchUpdateData {
        total_updated_cells: result.total_updated_cells,
        responses: result.responses,
    })))
}

// ---- private helpers ----

/// A body that is missing or not valid JSON counts as having no parameters.
fn body_or_default<T: DeserializeOwned + Default>(payload: Result<Json<T>, JsonRejection>) -> T {
    match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Unreadable request body");
            T::default()
        }
    }
}

/// A query string that does not deserialize counts as having no parameters.
fn query_or_default<T: DeserializeOwned + Default>(query: Result<Query<T>, QueryRejection>) -> T {
    match query {
        Ok(Query(params)) => params,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Unreadable query string");
            T::default()
        }
    }
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn range_and_values(body: ValuesRequest) -> AppResult<(String, Values)> {
    match (required(body.range), body.values) {
        (Some(range), Some(values)) => Ok((range, values)),
        _ => Err(AppError::BadRequest(RANGE_AND_VALUES_REQUIRED.into())),
    }
}
