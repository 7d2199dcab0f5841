//! Request and response shapes of the Sheets v4 `values` API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cell values, row-major.
pub type Values = Vec<Vec<Value>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    /// Omitted by Google when the range is empty.
    #[serde(default)]
    pub values: Values,
}

impl ValueRange {
    pub fn new(range: impl Into<String>, values: Values) -> Self {
        Self {
            range: Some(range.into()),
            major_dimension: Some("ROWS".into()),
            values,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default)]
    pub updated_range: String,
    #[serde(default)]
    pub updated_rows: u32,
    #[serde(default)]
    pub updated_columns: u32,
    #[serde(default)]
    pub updated_cells: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendValuesResponse {
    #[serde(default)]
    pub spreadsheet_id: String,
    /// The existing table the values were appended after, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_range: Option<String>,
    pub updates: UpdateValuesResponse,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateValuesResponse {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default)]
    pub total_updated_rows: u32,
    #[serde(default)]
    pub total_updated_columns: u32,
    #[serde(default)]
    pub total_updated_cells: u32,
    #[serde(default)]
    pub total_updated_sheets: u32,
    #[serde(default)]
    pub responses: Vec<UpdateValuesResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default)]
    pub sheet_id: i64,
    pub title: String,
    #[serde(default)]
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub properties: SheetProperties,
}

/// The `spreadsheets.get` resource, restricted to sheet properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetInfo {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

impl SpreadsheetInfo {
    pub fn sheet_titles(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.properties.title.clone()).collect()
    }
}

/// Row count, max column count and cell count of a block of values.
pub fn dimensions(values: &Values) -> (u32, u32, u32) {
    let rows = values.len() as u32;
    let cols = values.iter().map(Vec::len).max().unwrap_or(0) as u32;
    let cells = values.iter().map(Vec::len).sum::<usize>() as u32;
    (rows, cols, cells)
}
