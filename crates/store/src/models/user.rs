//! User account model.

use serde::{Deserialize, Serialize};
use trainlog_core::memo::StudentSummary;
use trainlog_core::roles::Role;
use trainlog_core::types::UserId;

use crate::document::Document;
use crate::error::StoreError;

/// A document from the `users` collection, keyed by login id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub user_id: UserId,
    pub display_name: String,
    pub role: Role,
    /// Argon2 PHC string, or the plain password of a legacy account.
    pub password: String,
}

/// Field layout of a `users` document.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDoc {
    pub display_name: String,
    pub role: Role,
    pub password: String,
}

impl StoredUser {
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let fields: UserDoc = serde_json::from_value(serde_json::Value::Object(doc.fields.clone()))
            .map_err(|e| StoreError::Decode(format!("users/{}: {e}", doc.id)))?;
        Ok(Self {
            user_id: doc.id.clone(),
            display_name: fields.display_name,
            role: fields.role,
            password: fields.password,
        })
    }

    pub fn to_doc(&self) -> UserDoc {
        UserDoc {
            display_name: self.display_name.clone(),
            role: self.role,
            password: self.password.clone(),
        }
    }

    pub fn summary(&self) -> StudentSummary {
        StudentSummary {
            user_id: self.user_id.clone(),
            display_name: self.display_name.clone(),
        }
    }
}
