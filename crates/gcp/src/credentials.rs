//! Service-account key files as downloaded from the Google Cloud console.

use std::path::Path;

use serde::Deserialize;

use crate::error::GcpAuthError;

/// Google's OAuth2 token endpoint, used when the key omits `token_uri`.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const SERVICE_ACCOUNT_TYPE: &str = "service_account";

/// The subset of a service-account JSON key needed to mint tokens.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Parse a key from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, GcpAuthError> {
        let key: Self = serde_json::from_str(json)
            .map_err(|e| GcpAuthError::InvalidCredentials(e.to_string()))?;
        if key.key_type != SERVICE_ACCOUNT_TYPE {
            return Err(GcpAuthError::InvalidCredentials(format!(
                "expected type \"{SERVICE_ACCOUNT_TYPE}\", got \"{}\"",
                key.key_type
            )));
        }
        if key.client_email.is_empty() || key.private_key.is_empty() {
            return Err(GcpAuthError::InvalidCredentials(
                "client_email and private_key must not be empty".into(),
            ));
        }
        Ok(key)
    }

    /// Read and parse a key file, typically the path in
    /// `GOOGLE_APPLICATION_CREDENTIALS`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GcpAuthError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| GcpAuthError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}
