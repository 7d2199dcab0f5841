/// Errors raised while loading credentials or minting access tokens.
#[derive(Debug, thiserror::Error)]
pub enum GcpAuthError {
    /// The credentials file could not be read.
    #[error("Failed to read credentials file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The credentials JSON is malformed or is not a service-account key.
    #[error("Invalid service account credentials: {0}")]
    InvalidCredentials(String),

    /// Signing the JWT assertion failed (bad PEM, etc.).
    #[error("Failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// The HTTP request to the token endpoint failed.
    #[error("Token request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The token endpoint returned a non-2xx status.
    #[error("Token endpoint error ({status}): {body}")]
    TokenEndpoint { status: u16, body: String },
}
