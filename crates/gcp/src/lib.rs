//! Google Cloud OAuth2 access tokens for service accounts.
//!
//! Both the Sheets client and the Firestore adapter authenticate the same
//! way: a service-account key signs an RS256 JWT assertion, which is
//! exchanged at the key's `token_uri` for a short-lived bearer token. The
//! [`TokenProvider`] seam lets tests substitute a fixed token.

pub mod credentials;
pub mod error;
pub mod token;

pub use credentials::ServiceAccountKey;
pub use error::GcpAuthError;
pub use token::{ServiceAccountTokenProvider, StaticTokenProvider, TokenProvider};

/// Scope for reading and writing spreadsheets.
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Scope for Firestore document access.
pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
