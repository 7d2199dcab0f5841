use async_trait::async_trait;

use crate::error::SheetsError;
use crate::models::{
    AppendValuesResponse, BatchUpdateValuesResponse, SpreadsheetInfo, UpdateValuesResponse,
    ValueRange, Values,
};

/// Operations on one spreadsheet. Values are written as if typed by a user
/// (`USER_ENTERED`).
#[async_trait]
pub trait SheetsApi: Send + Sync {
    fn spreadsheet_id(&self) -> &str;

    async fn read_values(&self, range: &str) -> Result<ValueRange, SheetsError>;

    async fn write_values(
        &self,
        range: &str,
        values: Values,
    ) -> Result<UpdateValuesResponse, SheetsError>;

    /// Append rows after the last row of the table found in `range`.
    async fn append_values(
        &self,
        range: &str,
        values: Values,
    ) -> Result<AppendValuesResponse, SheetsError>;

    async fn spreadsheet_info(&self) -> Result<SpreadsheetInfo, SheetsError>;

    async fn batch_update(
        &self,
        data: Vec<ValueRange>,
    ) -> Result<BatchUpdateValuesResponse, SheetsError>;
}
