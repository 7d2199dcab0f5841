use trainlog_gcp::GcpAuthError;

/// Errors from the spreadsheet layer.
///
/// `Display` output is what HTTP callers see, so upstream messages are
/// passed through unchanged.
#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error("{0}")]
    Auth(#[from] GcpAuthError),

    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// The Sheets API rejected the call. `message` is Google's
    /// `error.message` when the body carries one, else the raw body.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Unable to parse range: {0}")]
    InvalidRange(String),
}

impl SheetsError {
    /// Build an [`SheetsError::Api`] from a Google error body.
    pub fn from_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or_else(|| body.to_string());
        SheetsError::Api { status, message }
    }
}
