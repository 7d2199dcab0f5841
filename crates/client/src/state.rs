//! The application state container.
//!
//! [`AppStore`] owns the single [`AppState`] value. Every write goes
//! through [`AppStore::update`] or [`AppStore::apply_scoped`], and each
//! publishes a [`StateEvent`] so the render loop can react.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use trainlog_core::calendar::{CalendarSelection, DayMark};
use trainlog_core::memo::{PinnedMemo, StudentSummary};
use trainlog_core::record::TrainingRecord;
use trainlog_core::session::Session;
use trainlog_core::types::{Day, UserId};

use crate::subscription::SlotGuard;

/// Default buffer capacity for the state event channel.
const DEFAULT_CAPACITY: usize = 1024;

/// Which part of the state a mutation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateField {
    Session,
    Calendar,
    Records,
    PinnedMemos,
    MonthMarks,
    Students,
    SelectedStudents,
    CoachMemos,
    Status,
}

/// Published after every state mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateEvent {
    pub field: StateField,
    /// Monotonic counter, one per mutation.
    pub revision: u64,
}

/// Everything the render layer draws.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub session: Option<Session>,
    pub calendar: CalendarSelection,
    /// Records on the selected date for the active owners.
    pub records: Vec<TrainingRecord>,
    /// Pinned memos of the logged-in student.
    pub pinned_memos: Vec<PinnedMemo>,
    pub month_marks: BTreeMap<Day, DayMark>,
    /// Coach roster.
    pub students: Vec<StudentSummary>,
    pub selected_students: Vec<UserId>,
    /// Pinned memos of the selected students.
    pub coach_memos: Vec<PinnedMemo>,
    /// Last user-facing notice, e.g. a failed save.
    pub status: Option<String>,
}

impl AppState {
    pub fn new(today: Day) -> Self {
        Self {
            session: None,
            calendar: CalendarSelection::on(today),
            records: Vec::new(),
            pinned_memos: Vec::new(),
            month_marks: BTreeMap::new(),
            students: Vec::new(),
            selected_students: Vec::new(),
            coach_memos: Vec::new(),
            status: None,
        }
    }

    /// Clear everything tied to the logged-in user.
    pub fn reset_session(&mut self, today: Day) {
        *self = Self::new(today);
    }

    pub fn selected_date(&self) -> Day {
        self.calendar.selected_date
    }

    /// Owners whose records the current view shows: the student themself,
    /// or the students a coach selected.
    pub fn active_owner_ids(&self) -> Vec<UserId> {
        match &self.session {
            Some(s) if s.is_coach() => self.selected_students.clone(),
            Some(s) => vec![s.user_id.clone()],
            None => Vec::new(),
        }
    }
}

/// Shared owner of [`AppState`].
pub struct AppStore {
    state: RwLock<AppState>,
    revision: AtomicU64,
    events: broadcast::Sender<StateEvent>,
}

impl AppStore {
    pub fn new(initial: AppState) -> Self {
        let (events, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self {
            state: RwLock::new(initial),
            revision: AtomicU64::new(0),
            events,
        }
    }

    /// Subscribe to state events.
    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.events.subscribe()
    }

    /// Revision of the most recent mutation.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// Clone of the current state.
    pub async fn snapshot(&self) -> AppState {
        self.state.read().await.clone()
    }

    /// Read a projection of the state.
    pub async fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&*self.state.read().await)
    }

    /// Mutate the state and publish a [`StateEvent`] for `field`.
    pub async fn update<R>(&self, field: StateField, f: impl FnOnce(&mut AppState) -> R) -> R {
        let mut state = self.state.write().await;
        let result = f(&mut state);
        self.publish(field);
        result
    }

    /// Apply `f` only while `guard` still owns its subscription slot.
    ///
    /// The check runs under the state write lock, so once a slot has been
    /// reopened no snapshot delivered to the old holder can land. Returns
    /// `false` if the guard was stale and nothing changed.
    pub async fn apply_scoped(
        &self,
        guard: &SlotGuard,
        field: StateField,
        f: impl FnOnce(&mut AppState),
    ) -> bool {
        let mut state = self.state.write().await;
        if !guard.is_current() {
            tracing::debug!(slot = ?guard.key(), generation = guard.generation(), "Dropping stale snapshot");
            return false;
        }
        f(&mut state);
        self.publish(field);
        true
    }

    /// Must be called with the write lock held so revisions follow
    /// mutation order.
    fn publish(&self, field: StateField) {
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        // Ignore the SendError: it only means nobody is rendering.
        let _ = self.events.send(StateEvent { field, revision });
    }
}
