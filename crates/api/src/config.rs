use std::path::PathBuf;
use std::sync::Arc;

use trainlog_sheets::{GoogleSheetsClient, SheetsApi};

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the
/// spreadsheet settings; without them the server starts but every sheet
/// endpoint reports that the client is not initialized.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    /// `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub spreadsheet_id: Option<String>,
    /// Path to the service-account JSON key.
    pub credentials_path: Option<PathBuf>,
    /// Override for the Sheets API root, used against local fakes.
    pub sheets_base_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            cors_origins: vec!["*".into()],
            request_timeout_secs: 30,
            spreadsheet_id: None,
            credentials_path: None,
            sheets_base_url: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default      |
    /// |----------------------------------|--------------|
    /// | `HOST`                           | `0.0.0.0`    |
    /// | `PORT`                           | `3000`       |
    /// | `CORS_ORIGINS`                   | `*`          |
    /// | `REQUEST_TIMEOUT_SECS`           | `30`         |
    /// | `SPREADSHEET_ID`                 | --           |
    /// | `GOOGLE_APPLICATION_CREDENTIALS` | --           |
    /// | `SHEETS_API_BASE_URL`            | Google's     |
    ///
    /// # Panics
    ///
    /// Panics if `PORT` or `REQUEST_TIMEOUT_SECS` cannot be parsed.
    pub fn from_env() -> Self {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            spreadsheet_id: non_empty("SPREADSHEET_ID"),
            credentials_path: non_empty("GOOGLE_APPLICATION_CREDENTIALS").map(PathBuf::from),
            sheets_base_url: non_empty("SHEETS_API_BASE_URL"),
        }
    }

    /// Build the Google Sheets client described by this configuration.
    pub fn connect_sheets(&self) -> Result<Arc<dyn SheetsApi>, String> {
        let spreadsheet_id = self
            .spreadsheet_id
            .as_deref()
            .ok_or("SPREADSHEET_ID is not set")?;
        let path = self
            .credentials_path
            .as_ref()
            .ok_or("GOOGLE_APPLICATION_CREDENTIALS is not set")?;
        let mut client = GoogleSheetsClient::from_service_account_file(spreadsheet_id, path)
            .map_err(|e| e.to_string())?;
        if let Some(base_url) = &self.sheets_base_url {
            client = client.with_base_url(base_url);
        }
        Ok(Arc::new(client))
    }

    /// Whether `CORS_ORIGINS` allows every origin.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}
