use trainlog_gcp::GcpAuthError;

/// Errors from document store backends and repositories.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Obtaining a bearer token failed.
    #[error("Store authentication failed: {0}")]
    Auth(#[from] GcpAuthError),

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("Store request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Store API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// A document could not be converted to or from its typed model.
    #[error("Failed to decode document: {0}")]
    Decode(String),

    /// The backend is not reachable.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Decode(e.to_string())
    }
}
