//! Repository for the `users` collection.

use serde_json::json;
use trainlog_core::memo::StudentSummary;
use trainlog_core::roles::ROLE_STUDENT;

use crate::document::{Filter, Query, QuerySnapshot};
use crate::error::StoreError;
use crate::models::to_fields;
use crate::models::user::StoredUser;
use crate::store::DocumentStore;

/// Provides lookup and registration for user accounts.
pub struct UserRepo;

impl UserRepo {
    pub const COLLECTION: &'static str = "users";

    /// Find a user by login id.
    pub async fn find(
        store: &dyn DocumentStore,
        user_id: &str,
    ) -> Result<Option<StoredUser>, StoreError> {
        store
            .get(Self::COLLECTION, user_id)
            .await?
            .map(|doc| StoredUser::from_document(&doc))
            .transpose()
    }

    /// Register a user. Returns `false` if the id is already taken.
    pub async fn create(store: &dyn DocumentStore, user: &StoredUser) -> Result<bool, StoreError> {
        let fields = to_fields(&user.to_doc())?;
        store.create(Self::COLLECTION, &user.user_id, fields).await
    }

    /// Replace the stored password (or hash) of a user.
    pub async fn update_password(
        store: &dyn DocumentStore,
        user_id: &str,
        password: &str,
    ) -> Result<(), StoreError> {
        let mut fields = crate::document::Fields::new();
        fields.insert("password".into(), json!(password));
        store.merge(Self::COLLECTION, user_id, fields).await
    }

    /// Query for every student account.
    pub fn students_query() -> Query {
        Query::collection(Self::COLLECTION).filter(Filter::eq("role", ROLE_STUDENT))
    }

    /// Roster entries from a students snapshot, sorted by display name.
    /// Documents that fail to decode are skipped with a warning.
    pub fn decode_students(snapshot: &QuerySnapshot) -> Vec<StudentSummary> {
        let mut students: Vec<StudentSummary> = snapshot
            .documents
            .iter()
            .filter_map(|doc| match StoredUser::from_document(doc) {
                Ok(user) => Some(user.summary()),
                Err(e) => {
                    tracing::warn!(user_id = %doc.id, error = %e, "Skipping malformed user");
                    None
                }
            })
            .collect();
        students.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        students
    }

    /// List every student account.
    pub async fn list_students(
        store: &dyn DocumentStore,
    ) -> Result<Vec<StudentSummary>, StoreError> {
        let snapshot = store.query(&Self::students_query()).await?;
        Ok(Self::decode_students(&snapshot))
    }
}
