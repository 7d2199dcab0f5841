//! Pinned memo model.

use serde::{Deserialize, Serialize};
use trainlog_core::memo::PinnedMemo;
use trainlog_core::util::{format_iso, parse_iso};

use crate::document::Document;
use crate::error::StoreError;

/// Field layout of a `pinnedMemos` document.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnedMemoDoc {
    pub owner_id: String,
    pub record_date: String,
    pub text: String,
}

impl From<&PinnedMemo> for PinnedMemoDoc {
    fn from(memo: &PinnedMemo) -> Self {
        Self {
            owner_id: memo.owner_id.clone(),
            record_date: format_iso(memo.record_date),
            text: memo.text.clone(),
        }
    }
}

impl PinnedMemoDoc {
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        serde_json::from_value(serde_json::Value::Object(doc.fields.clone()))
            .map_err(|e| StoreError::Decode(format!("pinnedMemos/{}: {e}", doc.id)))
    }

    pub fn into_memo(self) -> Result<PinnedMemo, StoreError> {
        let record_date =
            parse_iso(&self.record_date).map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(PinnedMemo {
            owner_id: self.owner_id,
            record_date,
            text: self.text,
        })
    }
}
