//! REST client for the Google Sheets v4 API.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use trainlog_gcp::{ServiceAccountKey, ServiceAccountTokenProvider, TokenProvider, SHEETS_SCOPE};

use crate::api::SheetsApi;
use crate::error::SheetsError;
use crate::models::{
    AppendValuesResponse, BatchUpdateValuesResponse, SpreadsheetInfo, UpdateValuesResponse,
    ValueRange, Values,
};

/// Public Sheets REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4";

const VALUE_INPUT_OPTION: &str = "USER_ENTERED";

/// HTTP client for a single spreadsheet.
pub struct GoogleSheetsClient {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    tokens: Arc<dyn TokenProvider>,
}

impl GoogleSheetsClient {
    pub fn new(spreadsheet_id: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            tokens,
        }
    }

    /// Build a client authenticated with the service-account key at `path`.
    pub fn from_service_account_file(
        spreadsheet_id: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, SheetsError> {
        let key = ServiceAccountKey::from_file(path)?;
        let tokens = ServiceAccountTokenProvider::new(key, &[SHEETS_SCOPE])?;
        Ok(Self::new(spreadsheet_id, tokens.into_shared()))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/spreadsheets/{}", self.base_url, self.spreadsheet_id)
    }

    fn values_url(&self, range: &str) -> String {
        format!("{}/values/{}", self.spreadsheet_url(), urlencoding::encode(range))
    }

    // ---- private helpers ----

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, SheetsError> {
        let token = self.tokens.access_token().await?;
        let response = builder.bearer_auth(token).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), "Sheets API call failed");
            return Err(SheetsError::from_body(status.as_u16(), &body));
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl SheetsApi for GoogleSheetsClient {
    fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    async fn read_values(&self, range: &str) -> Result<ValueRange, SheetsError> {
        self.send(self.client.get(self.values_url(range))).await
    }

    async fn write_values(
        &self,
        range: &str,
        values: Values,
    ) -> Result<UpdateValuesResponse, SheetsError> {
        let request = self
            .client
            .put(self.values_url(range))
            .query(&[("valueInputOption", VALUE_INPUT_OPTION)])
            .json(&ValueRange::new(range, values));
        self.send(request).await
    }

    async fn append_values(
        &self,
        range: &str,
        values: Values,
    ) -> Result<AppendValuesResponse, SheetsError> {
        let request = self
            .client
            .post(format!("{}:append", self.values_url(range)))
            .query(&[("valueInputOption", VALUE_INPUT_OPTION)])
            .json(&ValueRange::new(range, values));
        self.send(request).await
    }

    async fn spreadsheet_info(&self) -> Result<SpreadsheetInfo, SheetsError> {
        let request = self
            .client
            .get(self.spreadsheet_url())
            .query(&[("fields", "spreadsheetId,sheets.properties")]);
        self.send(request).await
    }

    async fn batch_update(
        &self,
        data: Vec<ValueRange>,
    ) -> Result<BatchUpdateValuesResponse, SheetsError> {
        let request = self
            .client
            .post(format!("{}/values:batchUpdate", self.spreadsheet_url()))
            .json(&json!({
                "valueInputOption": VALUE_INPUT_OPTION,
                "data": data,
            }));
        self.send(request).await
    }
}
