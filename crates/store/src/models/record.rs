//! Training record model.

use serde::{Deserialize, Serialize};
use trainlog_core::record::{ExerciseSet, RawSet, TrainingRecord};
use trainlog_core::types::Timestamp;
use trainlog_core::util::{format_iso, parse_iso};

use crate::document::Document;
use crate::error::StoreError;

/// Field layout of a `records` document as read back from the store.
///
/// Sets are kept raw here; [`RecordDoc::into_record`] validates each one.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDoc {
    pub owner_id: String,
    pub date: String,
    #[serde(default)]
    pub sets: Vec<RawSet>,
    #[serde(default)]
    pub memo: String,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub pain: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

/// Field layout written for a record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordWrite<'a> {
    pub owner_id: &'a str,
    pub date: String,
    pub sets: &'a [ExerciseSet],
    pub memo: &'a str,
    pub pinned: bool,
    pub pain: bool,
    pub archived: bool,
    pub updated_at: Option<Timestamp>,
    pub updated_by: Option<&'a str>,
}

impl<'a> From<&'a TrainingRecord> for RecordWrite<'a> {
    fn from(record: &'a TrainingRecord) -> Self {
        Self {
            owner_id: &record.owner_id,
            date: format_iso(record.date),
            sets: &record.sets,
            memo: &record.memo,
            pinned: record.pinned,
            pain: record.pain,
            archived: record.archived,
            updated_at: record.updated_at,
            updated_by: record.updated_by.as_deref(),
        }
    }
}

impl RecordDoc {
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        serde_json::from_value(serde_json::Value::Object(doc.fields.clone()))
            .map_err(|e| StoreError::Decode(format!("records/{}: {e}", doc.id)))
    }

    /// Validate into a domain record. Any malformed set rejects the record.
    pub fn into_record(self) -> Result<TrainingRecord, StoreError> {
        let date = parse_iso(&self.date).map_err(|e| StoreError::Decode(e.to_string()))?;
        let sets = self
            .sets
            .iter()
            .enumerate()
            .map(|(i, raw)| ExerciseSet::parse(raw, i))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                StoreError::Decode(format!("record {}_{}: {e}", self.owner_id, self.date))
            })?;
        Ok(TrainingRecord {
            owner_id: self.owner_id,
            date,
            sets,
            memo: self.memo,
            pinned: self.pinned,
            pain: self.pain,
            archived: self.archived,
            updated_at: self.updated_at,
            updated_by: self.updated_by,
        })
    }
}
