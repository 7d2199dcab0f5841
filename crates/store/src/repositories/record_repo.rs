//! Repository for the `records` collection.

use trainlog_core::record::{record_doc_id, TrainingRecord};
use trainlog_core::types::{Day, UserId};
use trainlog_core::util::format_iso;

use crate::document::{Direction, Filter, Query, QuerySnapshot};
use crate::error::StoreError;
use crate::models::record::{RecordDoc, RecordWrite};
use crate::models::to_fields;
use crate::store::DocumentStore;

/// Provides reads, writes and live-query builders for training records.
pub struct RecordRepo;

impl RecordRepo {
    pub const COLLECTION: &'static str = "records";

    /// Find the record of `owner_id` on `date`, archived or not.
    pub async fn find(
        store: &dyn DocumentStore,
        owner_id: &str,
        date: Day,
    ) -> Result<Option<TrainingRecord>, StoreError> {
        match store
            .get(Self::COLLECTION, &record_doc_id(owner_id, date))
            .await?
        {
            Some(doc) => Ok(Some(RecordDoc::from_document(&doc)?.into_record()?)),
            None => Ok(None),
        }
    }

    /// Write the whole record, replacing any stored version.
    pub async fn save(store: &dyn DocumentStore, record: &TrainingRecord) -> Result<(), StoreError> {
        let fields = to_fields(&RecordWrite::from(record))?;
        store.set(Self::COLLECTION, &record.doc_id(), fields).await
    }

    /// Write the record only if none exists for its owner and date.
    pub async fn create_if_absent(
        store: &dyn DocumentStore,
        record: &TrainingRecord,
    ) -> Result<bool, StoreError> {
        let fields = to_fields(&RecordWrite::from(record))?;
        store.create(Self::COLLECTION, &record.doc_id(), fields).await
    }

    /// Records of the given owners on one day.
    pub fn for_date_query(date: Day, owner_ids: &[UserId]) -> Query {
        Query::collection(Self::COLLECTION)
            .filter(Filter::eq("date", format_iso(date)))
            .filter(Filter::is_in("ownerId", owner_ids.iter().cloned()))
    }

    /// Records of the given owners between `first` and `last` inclusive.
    pub fn for_range_query(first: Day, last: Day, owner_ids: &[UserId]) -> Query {
        Query::collection(Self::COLLECTION)
            .filter(Filter::is_in("ownerId", owner_ids.iter().cloned()))
            .filter(Filter::gte("date", format_iso(first)))
            .filter(Filter::lte("date", format_iso(last)))
            .order_by("date", Direction::Ascending)
    }

    /// Decode a snapshot, dropping archived records. Records that fail
    /// validation are skipped with a warning.
    pub fn decode_snapshot(snapshot: &QuerySnapshot) -> Vec<TrainingRecord> {
        snapshot
            .documents
            .iter()
            .filter_map(|doc| {
                match RecordDoc::from_document(doc).and_then(RecordDoc::into_record) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        tracing::warn!(record_id = %doc.id, error = %e, "Skipping malformed record");
                        None
                    }
                }
            })
            .filter(|r| !r.archived)
            .collect()
    }
}
