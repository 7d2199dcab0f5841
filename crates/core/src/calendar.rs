//! The calendar cursor and the per-day marks drawn on the month grid.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::record::TrainingRecord;
use crate::types::Day;
use crate::util::month_bounds;

/// Transient UI cursor; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSelection {
    pub year: i32,
    pub month: u32,
    pub selected_date: Day,
}

impl CalendarSelection {
    /// Cursor on `date`'s month with `date` selected.
    pub fn on(date: Day) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            selected_date: date,
        }
    }

    /// Move the visible month by `delta` months. The selected date is kept.
    ///
    /// A move past the representable calendar is rejected and leaves the
    /// cursor where it was.
    pub fn shift_month(&mut self, delta: i32) -> Result<(), CoreError> {
        let out_of_range =
            || CoreError::Validation(format!("Cannot move the calendar by {delta} months"));
        let index = i64::from(self.year) * 12 + i64::from(self.month) - 1 + i64::from(delta);
        let year = i32::try_from(index.div_euclid(12)).map_err(|_| out_of_range())?;
        let month = index.rem_euclid(12) as u32 + 1;
        month_bounds(year, month).map_err(|_| out_of_range())?;
        self.year = year;
        self.month = month;
        Ok(())
    }

    pub fn next_month(&mut self) -> Result<(), CoreError> {
        self.shift_month(1)
    }

    pub fn prev_month(&mut self) -> Result<(), CoreError> {
        self.shift_month(-1)
    }

    /// Select `date` and bring its month into view.
    pub fn select(&mut self, date: Day) {
        *self = Self::on(date);
    }

    /// First and last day of the visible month.
    pub fn month_range(&self) -> Result<(Day, Day), CoreError> {
        month_bounds(self.year, self.month)
    }

    /// Weeks of the visible month, Monday first. Cells outside the month
    /// are `None`.
    pub fn grid(&self) -> Result<Vec<[Option<Day>; 7]>, CoreError> {
        let (first, last) = self.month_range()?;
        let lead = first.weekday().num_days_from_monday() as i64;
        let mut weeks = Vec::new();
        let mut cursor = first - Duration::days(lead);
        while cursor <= last {
            let mut week = [None; 7];
            for cell in week.iter_mut() {
                if cursor >= first && cursor <= last {
                    *cell = Some(cursor);
                }
                cursor += Duration::days(1);
            }
            weeks.push(week);
        }
        Ok(weeks)
    }
}

/// Summary of one day's records for the month grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayMark {
    pub has_sets: bool,
    pub pinned: bool,
    pub pain: bool,
}

impl DayMark {
    pub fn merge(&mut self, record: &TrainingRecord) {
        if record.archived {
            return;
        }
        self.has_sets |= !record.sets.is_empty();
        self.pinned |= record.pinned;
        self.pain |= record.pain;
    }
}

/// Fold records from any number of owners into per-day marks.
pub fn day_marks<'a>(
    records: impl IntoIterator<Item = &'a TrainingRecord>,
) -> BTreeMap<Day, DayMark> {
    let mut marks: BTreeMap<Day, DayMark> = BTreeMap::new();
    for record in records {
        if record.archived {
            continue;
        }
        marks.entry(record.date).or_default().merge(record);
    }
    marks
}
