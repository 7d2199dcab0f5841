//! Records on the selected date, and the mutations that edit them.

use chrono::Utc;
use trainlog_core::error::CoreError;
use trainlog_core::memo::PinnedMemo;
use trainlog_core::record::{RawSet, TrainingRecord};
use trainlog_core::session::Session;
use trainlog_core::types::{Day, UserId};
use trainlog_store::repositories::{PinnedMemoRepo, RecordRepo};
use trainlog_store::DocumentStore;

use crate::context::ClientContext;
use crate::error::{ClientError, ClientResult};
use crate::state::StateField;
use crate::subscription::{spawn_listener, SlotKey};

/// Subscribe to the records of `owner_ids` on `date`.
///
/// Replaces any records subscription already open; snapshots from the old
/// one are discarded.
pub async fn load_records_for_date(
    ctx: &ClientContext,
    date: Day,
    owner_ids: Vec<UserId>,
) -> ClientResult<()> {
    let store = ctx.store()?;
    let guard = ctx.subscriptions.open(SlotKey::Records);
    tracing::debug!(%date, owners = owner_ids.len(), generation = guard.generation(), "Loading records");

    if owner_ids.is_empty() {
        ctx.state
            .apply_scoped(&guard, StateField::Records, |s| s.records.clear())
            .await;
        return Ok(());
    }

    let stream = store.listen(RecordRepo::for_date_query(date, &owner_ids));
    spawn_listener(
        ctx.state.clone(),
        &ctx.subscriptions,
        guard,
        StateField::Records,
        stream,
        move |snapshot| {
            let mut records = RecordRepo::decode_snapshot(snapshot);
            // Keep the order the owners were selected in.
            records.sort_by_key(|r| owner_ids.iter().position(|o| *o == r.owner_id));
            records
        },
        |state, records| state.records = records,
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// Append a set, creating the day's record on first entry.
pub async fn add_set(
    ctx: &ClientContext,
    owner_id: &str,
    date: Day,
    raw: &RawSet,
) -> ClientResult<TrainingRecord> {
    let (session, store) = authorize(ctx, owner_id).await?;
    let mut record = match RecordRepo::find(store.as_ref(), owner_id, date).await? {
        // An archived day starts over.
        Some(existing) if !existing.archived => existing,
        _ => TrainingRecord::new(owner_id, date),
    };
    record.add_set(raw)?;
    persist(store.as_ref(), &session, record).await
}

pub async fn update_set(
    ctx: &ClientContext,
    owner_id: &str,
    date: Day,
    index: usize,
    raw: &RawSet,
) -> ClientResult<TrainingRecord> {
    edit(ctx, owner_id, date, |r| r.update_set(index, raw)).await
}

pub async fn remove_set(
    ctx: &ClientContext,
    owner_id: &str,
    date: Day,
    index: usize,
) -> ClientResult<TrainingRecord> {
    edit(ctx, owner_id, date, |r| r.remove_set(index).map(|_| ())).await
}

pub async fn set_memo(
    ctx: &ClientContext,
    owner_id: &str,
    date: Day,
    memo: &str,
) -> ClientResult<TrainingRecord> {
    edit(ctx, owner_id, date, |r| r.set_memo(memo)).await
}

/// Pin or unpin a record; pinned records surface their memo on the board.
pub async fn set_pinned(
    ctx: &ClientContext,
    owner_id: &str,
    date: Day,
    pinned: bool,
) -> ClientResult<TrainingRecord> {
    edit(ctx, owner_id, date, |r| {
        r.pinned = pinned;
        Ok(())
    })
    .await
}

/// Flag or clear pain reported for the day.
pub async fn set_pain(
    ctx: &ClientContext,
    owner_id: &str,
    date: Day,
    pain: bool,
) -> ClientResult<TrainingRecord> {
    edit(ctx, owner_id, date, |r| {
        r.pain = pain;
        Ok(())
    })
    .await
}

/// Hide a record. Records are never hard-deleted.
pub async fn archive_record(
    ctx: &ClientContext,
    owner_id: &str,
    date: Day,
) -> ClientResult<TrainingRecord> {
    edit(ctx, owner_id, date, |r| {
        r.archived = true;
        Ok(())
    })
    .await
}

// ---- private helpers ----

async fn authorize(
    ctx: &ClientContext,
    owner_id: &str,
) -> ClientResult<(Session, std::sync::Arc<dyn DocumentStore>)> {
    let session = ctx.session().await?;
    session.ensure_can_edit(owner_id)?;
    Ok((session, ctx.store()?))
}

/// Read-modify-write of an existing, live record.
async fn edit(
    ctx: &ClientContext,
    owner_id: &str,
    date: Day,
    change: impl FnOnce(&mut TrainingRecord) -> Result<(), CoreError>,
) -> ClientResult<TrainingRecord> {
    let (session, store) = authorize(ctx, owner_id).await?;
    let mut record = RecordRepo::find(store.as_ref(), owner_id, date)
        .await?
        .filter(|r| !r.archived)
        .ok_or_else(|| {
            ClientError::Core(CoreError::NotFound {
                entity: "record",
                id: trainlog_core::record::record_doc_id(owner_id, date),
            })
        })?;
    change(&mut record)?;
    persist(store.as_ref(), &session, record).await
}

/// Stamp, save and keep the pinned memo in step. Concurrent editors
/// resolve last-write-wins.
async fn persist(
    store: &dyn DocumentStore,
    session: &Session,
    mut record: TrainingRecord,
) -> ClientResult<TrainingRecord> {
    record.updated_at = Some(Utc::now());
    record.updated_by = Some(session.user_id.clone());
    RecordRepo::save(store, &record).await?;

    match PinnedMemo::from_record(&record) {
        Some(memo) => PinnedMemoRepo::upsert(store, &memo).await?,
        None => PinnedMemoRepo::remove(store, &record.owner_id, record.date).await?,
    }

    tracing::info!(
        record_id = %record.doc_id(),
        updated_by = %session.user_id,
        sets = record.sets.len(),
        "Record saved",
    );
    Ok(record)
}
