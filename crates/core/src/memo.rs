use serde::{Deserialize, Serialize};

use crate::record::{validate_memo, TrainingRecord};
use crate::types::{Day, UserId};
use crate::error::CoreError;

/// Memo of a pinned record, surfaced on the coach board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnedMemo {
    pub owner_id: UserId,
    pub record_date: Day,
    pub text: String,
}

impl PinnedMemo {
    pub fn new(
        owner_id: impl Into<UserId>,
        record_date: Day,
        text: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let text = text.into();
        validate_memo(&text)?;
        Ok(Self {
            owner_id: owner_id.into(),
            record_date,
            text,
        })
    }

    /// The memo a record contributes to the board, if it is pinned and live.
    pub fn from_record(record: &TrainingRecord) -> Option<Self> {
        (record.pinned && !record.archived).then(|| Self {
            owner_id: record.owner_id.clone(),
            record_date: record.date,
            text: record.memo.clone(),
        })
    }
}

/// Roster entry shown to coaches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub user_id: UserId,
    pub display_name: String,
}
