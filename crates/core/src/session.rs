//! Session identity and the remembered-login record.
//!
//! A [`Session`] exists only in memory between login and logout. When the
//! user ticks "remember me" a [`SavedLogin`] is written to local storage so
//! the next start can restore the session after re-checking the credential
//! against the store.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::UserId;

/// Maximum length of a login id.
pub const MAX_USER_ID_LENGTH: usize = 64;

/// Prefix of every Argon2 PHC string produced by the auth module.
pub const ARGON2_PREFIX: &str = "$argon2";

/// The credential a session was established with.
///
/// Accounts created before password hashing was introduced store their
/// password verbatim; those sessions carry [`Credential::Plain`] until the
/// login path upgrades the stored value to a hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Credential {
    Hashed(String),
    Plain(String),
}

impl Credential {
    /// Classify a stored `password` field.
    pub fn from_stored(stored: &str) -> Self {
        if stored.starts_with(ARGON2_PREFIX) {
            Credential::Hashed(stored.to_string())
        } else {
            Credential::Plain(stored.to_string())
        }
    }

    /// Whether this credential still matches what the store holds.
    pub fn matches_stored(&self, stored: &str) -> bool {
        match self {
            Credential::Hashed(hash) | Credential::Plain(hash) => hash == stored,
        }
    }

    pub fn is_hashed(&self) -> bool {
        matches!(self, Credential::Hashed(_))
    }
}

/// An authenticated user of the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub display_name: String,
    pub role: Role,
    pub credential: Credential,
}

impl Session {
    pub fn is_coach(&self) -> bool {
        self.role.is_coach()
    }

    /// Owners whose records this session may edit.
    ///
    /// Students may only touch their own records; coaches act on behalf of
    /// any owner.
    pub fn can_edit(&self, owner_id: &str) -> bool {
        self.is_coach() || self.user_id == owner_id
    }

    /// Reject edits outside of [`Session::can_edit`].
    pub fn ensure_can_edit(&self, owner_id: &str) -> Result<(), CoreError> {
        if self.can_edit(owner_id) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "{} may not edit records owned by {owner_id}",
                self.user_id
            )))
        }
    }

    /// The remembered-login form of this session.
    pub fn to_saved_login(&self) -> SavedLogin {
        SavedLogin {
            user_id: self.user_id.clone(),
            credential: self.credential.clone(),
        }
    }
}

/// Remembered login persisted to local storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedLogin {
    pub user_id: UserId,
    pub credential: Credential,
}

/// Validate a login id: non-empty, bounded, and safe to embed in document ids.
pub fn validate_user_id(user_id: &str) -> Result<(), CoreError> {
    if user_id.trim().is_empty() {
        return Err(CoreError::Validation("User id cannot be empty".into()));
    }
    if user_id.len() > MAX_USER_ID_LENGTH {
        return Err(CoreError::Validation(format!(
            "User id exceeds maximum length of {MAX_USER_ID_LENGTH} characters"
        )));
    }
    if !user_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '@')
    {
        return Err(CoreError::Validation(format!(
            "User id '{user_id}' may only contain letters, digits, '-', '.' and '@'"
        )));
    }
    Ok(())
}
