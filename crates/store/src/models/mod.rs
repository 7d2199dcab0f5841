//! Document shapes of the `users`, `records` and `pinnedMemos` collections.

pub mod pinned_memo;
pub mod record;
pub mod user;

use serde::Serialize;

use crate::document::Fields;
use crate::error::StoreError;

/// Serialize a model into document fields.
pub(crate) fn to_fields<T: Serialize>(model: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(model)? {
        serde_json::Value::Object(fields) => Ok(fields),
        other => Err(StoreError::Decode(format!(
            "model serialized to {other} instead of an object"
        ))),
    }
}
