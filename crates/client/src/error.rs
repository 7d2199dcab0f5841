use trainlog_core::error::CoreError;
use trainlog_store::StoreError;

/// Errors surfaced by client operations.
///
/// A failed operation leaves application state as it was.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The document store failed to initialise; the app is running without it.
    #[error("Document store is not available")]
    StoreUnavailable,

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Invalid user id or password")]
    InvalidCredentials,

    #[error("Local storage error: {0}")]
    Storage(String),

    #[error("Password hashing failed: {0}")]
    Password(String),

    #[error("Render error: {0}")]
    Render(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl From<argon2::password_hash::Error> for ClientError {
    fn from(e: argon2::password_hash::Error) -> Self {
        ClientError::Password(e.to_string())
    }
}
