//! One-time copy of records kept in local storage into the document store.
//!
//! Before the document store existed, records lived on the device under
//! [`LEGACY_RECORDS_KEY`] as a JSON object keyed by ISO date:
//!
//! ```json
//! { "2024-03-01": { "sets": [{ "exercise": "Squat", "weight": 80, "reps": 5 }], "memo": "" } }
//! ```
//!
//! The records belong to whoever used the device before accounts existed,
//! so the first student to log in claims them. The legacy value is left in
//! place; a device-wide marker naming that student makes every later run a
//! no-op, for any account.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trainlog_core::record::{validate_memo, RawSet, TrainingRecord};
use trainlog_core::util::parse_iso;
use trainlog_store::repositories::RecordRepo;

use crate::context::ClientContext;
use crate::error::{ClientError, ClientResult};
use crate::storage::{LEGACY_RECORDS_KEY, MIGRATION_MARKER_KEY};

#[derive(Debug, Default, Deserialize)]
struct LegacyDay {
    #[serde(default)]
    sets: Vec<RawSet>,
    #[serde(default)]
    memo: Option<String>,
}

/// Stored under [`MIGRATION_MARKER_KEY`].
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MigrationMarker {
    owner_id: String,
    migrated_at: DateTime<Utc>,
}

/// Outcome of [`migrate_local_storage_to_store`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// An earlier run already claimed the legacy records.
    pub already_migrated: bool,
    /// Owner named by the marker of that earlier run, when readable.
    pub claimed_by: Option<String>,
    /// Records written to the store.
    pub migrated: usize,
    /// Days the store already had a record for.
    pub skipped_existing: usize,
    /// Days dropped because the date or every entry was unusable.
    pub skipped_invalid: usize,
    /// Individual sets that failed validation.
    pub dropped_sets: usize,
}

/// Copy legacy local records of this device into the store under `owner_id`,
/// unless another run already claimed them.
///
/// Existing store records are never overwritten. The marker is written only
/// after every day was handled, so a failed run is retried on next login.
pub async fn migrate_local_storage_to_store(
    ctx: &ClientContext,
    owner_id: &str,
) -> ClientResult<MigrationReport> {
    if let Some(raw) = ctx.storage.get(MIGRATION_MARKER_KEY).await? {
        let claimed_by = serde_json::from_str::<MigrationMarker>(&raw)
            .ok()
            .map(|m| m.owner_id);
        if claimed_by.as_deref() != Some(owner_id) {
            tracing::debug!(
                owner_id,
                claimed_by = ?claimed_by,
                "Legacy records claimed by another account",
            );
        }
        return Ok(MigrationReport {
            already_migrated: true,
            claimed_by,
            ..Default::default()
        });
    }

    let Some(raw) = ctx.storage.get(LEGACY_RECORDS_KEY).await? else {
        return Ok(MigrationReport::default());
    };
    let store = ctx.store()?;
    let legacy: BTreeMap<String, LegacyDay> = serde_json::from_str(&raw)
        .map_err(|e| ClientError::Storage(format!("legacy records are unreadable: {e}")))?;

    let mut report = MigrationReport::default();
    let now = Utc::now();
    for (date_key, day) in legacy {
        let Ok(date) = parse_iso(&date_key) else {
            tracing::warn!(owner_id, date = %date_key, "Skipping legacy day with invalid date");
            report.skipped_invalid += 1;
            continue;
        };

        let mut record = TrainingRecord::new(owner_id, date);
        for raw_set in &day.sets {
            if let Err(e) = record.add_set(raw_set) {
                tracing::warn!(owner_id, %date, error = %e, "Dropping legacy set");
                report.dropped_sets += 1;
            }
        }
        if let Some(memo) = day.memo.filter(|m| !m.trim().is_empty()) {
            match validate_memo(&memo) {
                Ok(()) => record.memo = memo,
                Err(e) => tracing::warn!(owner_id, %date, error = %e, "Dropping legacy memo"),
            }
        }
        if record.sets.is_empty() && record.memo.is_empty() {
            report.skipped_invalid += 1;
            continue;
        }

        record.updated_at = Some(now);
        record.updated_by = Some(owner_id.to_string());
        if RecordRepo::create_if_absent(store.as_ref(), &record).await? {
            report.migrated += 1;
        } else {
            report.skipped_existing += 1;
        }
    }

    let marker = MigrationMarker {
        owner_id: owner_id.to_string(),
        migrated_at: now,
    };
    let marker = serde_json::to_string(&marker)
        .map_err(|e| ClientError::Storage(format!("migration marker: {e}")))?;
    ctx.storage.set(MIGRATION_MARKER_KEY, &marker).await?;
    tracing::info!(
        owner_id,
        migrated = report.migrated,
        skipped_existing = report.skipped_existing,
        skipped_invalid = report.skipped_invalid,
        dropped_sets = report.dropped_sets,
        "Legacy records migrated",
    );
    Ok(report)
}
