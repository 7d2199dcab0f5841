//! Repository for the `pinnedMemos` collection.

use std::cmp::Reverse;

use trainlog_core::memo::PinnedMemo;
use trainlog_core::record::record_doc_id;
use trainlog_core::types::{Day, UserId};

use crate::document::{Filter, Query, QuerySnapshot};
use crate::error::StoreError;
use crate::models::pinned_memo::PinnedMemoDoc;
use crate::models::to_fields;
use crate::store::DocumentStore;

/// Keeps the pinned-memo board in step with pinned records.
pub struct PinnedMemoRepo;

impl PinnedMemoRepo {
    pub const COLLECTION: &'static str = "pinnedMemos";

    /// Create or replace the memo for its record.
    pub async fn upsert(store: &dyn DocumentStore, memo: &PinnedMemo) -> Result<(), StoreError> {
        let fields = to_fields(&PinnedMemoDoc::from(memo))?;
        store
            .set(
                Self::COLLECTION,
                &record_doc_id(&memo.owner_id, memo.record_date),
                fields,
            )
            .await
    }

    pub async fn remove(
        store: &dyn DocumentStore,
        owner_id: &str,
        record_date: Day,
    ) -> Result<(), StoreError> {
        store
            .delete(Self::COLLECTION, &record_doc_id(owner_id, record_date))
            .await
    }

    pub fn for_owner_query(owner_id: &str) -> Query {
        Query::collection(Self::COLLECTION).filter(Filter::eq("ownerId", owner_id))
    }

    pub fn for_owners_query(owner_ids: &[UserId]) -> Query {
        Query::collection(Self::COLLECTION)
            .filter(Filter::is_in("ownerId", owner_ids.iter().cloned()))
    }

    /// Decode a snapshot, newest first. Malformed memos are skipped.
    pub fn decode_snapshot(snapshot: &QuerySnapshot) -> Vec<PinnedMemo> {
        let mut memos: Vec<PinnedMemo> = snapshot
            .documents
            .iter()
            .filter_map(|doc| {
                match PinnedMemoDoc::from_document(doc).and_then(PinnedMemoDoc::into_memo) {
                    Ok(memo) => Some(memo),
                    Err(e) => {
                        tracing::warn!(memo_id = %doc.id, error = %e, "Skipping malformed pinned memo");
                        None
                    }
                }
            })
            .collect();
        memos.sort_by_key(|m| (Reverse(m.record_date), m.owner_id.clone()));
        memos
    }
}
