//! View models: the serializable shape templates render from.

use chrono::Datelike;
use serde::Serialize;
use trainlog_core::memo::PinnedMemo;
use trainlog_core::record::TrainingRecord;
use trainlog_core::types::Day;
use trainlog_core::util::{format_display, format_iso, today};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AppView {
    pub logged_in: bool,
    pub user_name: String,
    pub is_coach: bool,
    pub status: Option<String>,
    pub calendar: CalendarView,
    pub selected_date: String,
    pub records: Vec<RecordView>,
    pub pinned_memos: Vec<MemoView>,
    pub students: Vec<StudentView>,
    pub coach_memos: Vec<MemoView>,
}

#[derive(Debug, Serialize)]
pub struct CalendarView {
    pub title: String,
    pub weeks: Vec<Vec<DayCell>>,
}

#[derive(Debug, Default, Serialize)]
pub struct DayCell {
    pub date: Option<String>,
    pub day: Option<u32>,
    pub selected: bool,
    pub today: bool,
    pub has_sets: bool,
    pub pinned: bool,
    pub pain: bool,
}

#[derive(Debug, Serialize)]
pub struct RecordView {
    pub owner: String,
    pub memo: String,
    pub pinned: bool,
    pub pain: bool,
    pub total_volume: String,
    pub sets: Vec<SetView>,
}

#[derive(Debug, Serialize)]
pub struct SetView {
    pub number: usize,
    pub exercise: String,
    pub weight: String,
    pub reps: u32,
}

#[derive(Debug, Serialize)]
pub struct MemoView {
    pub owner: String,
    pub date: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct StudentView {
    pub user_id: String,
    pub display_name: String,
    pub selected: bool,
}

impl AppView {
    pub fn from_state(state: &AppState) -> Self {
        let session = state.session.as_ref();
        Self {
            logged_in: session.is_some(),
            user_name: session.map(|s| s.display_name.clone()).unwrap_or_default(),
            is_coach: session.is_some_and(|s| s.is_coach()),
            status: state.status.clone(),
            calendar: CalendarView::from_state(state),
            selected_date: format_display(state.selected_date()),
            records: state.records.iter().map(|r| RecordView::new(state, r)).collect(),
            pinned_memos: memo_views(state, &state.pinned_memos),
            students: state
                .students
                .iter()
                .map(|s| StudentView {
                    user_id: s.user_id.clone(),
                    display_name: s.display_name.clone(),
                    selected: state.selected_students.contains(&s.user_id),
                })
                .collect(),
            coach_memos: memo_views(state, &state.coach_memos),
        }
    }
}

impl CalendarView {
    fn from_state(state: &AppState) -> Self {
        let cal = &state.calendar;
        let now = today();
        // An out-of-range month renders as an empty grid.
        let weeks = cal
            .grid()
            .unwrap_or_default()
            .into_iter()
            .map(|week| {
                week.iter()
                    .map(|cell| match cell {
                        Some(date) => day_cell(state, *date, now),
                        None => DayCell::default(),
                    })
                    .collect()
            })
            .collect();
        let title = cal
            .month_range()
            .map(|(first, _)| first.format("%B %Y").to_string())
            .unwrap_or_default();
        Self { title, weeks }
    }
}

impl RecordView {
    fn new(state: &AppState, record: &TrainingRecord) -> Self {
        Self {
            owner: owner_name(state, &record.owner_id),
            memo: record.memo.clone(),
            pinned: record.pinned,
            pain: record.pain,
            total_volume: format_number(record.total_volume()),
            sets: record
                .sets
                .iter()
                .map(|s| SetView {
                    number: s.index + 1,
                    exercise: s.exercise.clone(),
                    weight: format_number(s.weight),
                    reps: s.reps,
                })
                .collect(),
        }
    }
}

fn day_cell(state: &AppState, date: Day, now: Day) -> DayCell {
    let mark = state.month_marks.get(&date).copied().unwrap_or_default();
    DayCell {
        date: Some(format_iso(date)),
        day: Some(date.day()),
        selected: date == state.selected_date(),
        today: date == now,
        has_sets: mark.has_sets,
        pinned: mark.pinned,
        pain: mark.pain,
    }
}

fn memo_views(state: &AppState, memos: &[PinnedMemo]) -> Vec<MemoView> {
    memos
        .iter()
        .map(|m| MemoView {
            owner: owner_name(state, &m.owner_id),
            date: format_display(m.record_date),
            text: m.text.clone(),
        })
        .collect()
}

/// Display name from the roster, falling back to the id.
fn owner_name(state: &AppState, owner_id: &str) -> String {
    state
        .students
        .iter()
        .find(|s| s.user_id == owner_id)
        .map(|s| s.display_name.clone())
        .or_else(|| {
            state
                .session
                .as_ref()
                .filter(|s| s.user_id == owner_id)
                .map(|s| s.display_name.clone())
        })
        .unwrap_or_else(|| owner_id.to_string())
}

/// `80` rather than `80.0`; fractions keep up to two places.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        let s = format!("{n:.2}");
        s.trim_end_matches('0').to_string()
    }
}
