//! Scoped live subscriptions.
//!
//! Each kind of live query owns one named slot. Opening a slot cancels
//! whatever held it before: its [`CancellationToken`] fires, its task is
//! aborted, and its [`SlotGuard`] stops being current, so
//! [`AppStore::apply_scoped`](crate::state::AppStore::apply_scoped) rejects
//! anything it still delivers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use trainlog_store::{QuerySnapshot, SnapshotStream};

use crate::state::{AppState, AppStore, StateField};

/// Named subscription positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKey {
    /// Records on the selected date.
    Records,
    /// The student's own pinned memos.
    PinnedMemos,
    /// Day marks for the visible month.
    CalendarMonth,
    /// The coach roster.
    Students,
    /// Pinned memos of the coach's selected students.
    CoachMemos,
}

/// Internal bookkeeping for an occupied slot.
struct SlotEntry {
    generation: u64,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SlotEntry {
    fn stop(self) {
        self.cancel.cancel();
        if let Some(task) = self.task {
            task.abort();
        }
    }
}

type Slots = Arc<Mutex<HashMap<SlotKey, SlotEntry>>>;

/// Proof of ownership of a slot at one generation.
#[derive(Clone)]
pub struct SlotGuard {
    key: SlotKey,
    generation: u64,
    cancel: CancellationToken,
    slots: Slots,
}

impl SlotGuard {
    pub fn key(&self) -> SlotKey {
        self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether this guard still owns its slot.
    pub fn is_current(&self) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .get(&self.key)
            .is_some_and(|entry| entry.generation == self.generation)
    }

    /// Resolves once the slot is reopened or cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }
}

/// Registry of live subscription slots. Cloning shares the registry.
#[derive(Clone, Default)]
pub struct SubscriptionRegistry {
    slots: Slots,
    next_generation: Arc<AtomicU64>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take over `key`, cancelling its previous holder first.
    pub fn open(&self, key: SlotKey) -> SlotGuard {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancellationToken::new();
        let previous = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.insert(
                key,
                SlotEntry {
                    generation,
                    cancel: cancel.clone(),
                    task: None,
                },
            )
        };
        if let Some(previous) = previous {
            tracing::debug!(slot = ?key, superseded = previous.generation, generation, "Replacing subscription");
            previous.stop();
        }
        SlotGuard {
            key,
            generation,
            cancel,
            slots: Arc::clone(&self.slots),
        }
    }

    /// Record the task serving `guard`. If the slot moved on in the
    /// meantime the task is aborted instead.
    pub fn attach(&self, guard: &SlotGuard, task: JoinHandle<()>) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        match slots.get_mut(&guard.key) {
            Some(entry) if entry.generation == guard.generation => entry.task = Some(task),
            _ => task.abort(),
        }
    }

    /// Cancel the holder of `key`, if any.
    pub fn cancel(&self, key: SlotKey) {
        let removed = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        if let Some(entry) = removed {
            entry.stop();
        }
    }

    /// Cancel every slot. Used on logout.
    pub fn cancel_all(&self) {
        let drained: Vec<SlotEntry> = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, entry)| entry)
            .collect();
        let count = drained.len();
        for entry in drained {
            entry.stop();
        }
        tracing::debug!(count, "Cancelled all subscriptions");
    }

    pub fn is_active(&self, key: SlotKey) -> bool {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&key)
    }

    pub fn active_count(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Drive `stream` into the state until the slot is reopened or cancelled.
///
/// Each snapshot is decoded with `decode` and written with `apply` under
/// [`AppStore::apply_scoped`]. Stream errors are logged and reported in
/// `status`; the subscription stays open.
pub fn spawn_listener<T, D, A>(
    state: Arc<AppStore>,
    registry: &SubscriptionRegistry,
    guard: SlotGuard,
    field: StateField,
    mut stream: SnapshotStream,
    decode: D,
    apply: A,
) where
    T: Send + 'static,
    D: Fn(&QuerySnapshot) -> T + Send + 'static,
    A: Fn(&mut AppState, T) + Send + Sync + 'static,
{
    let task_guard = guard.clone();
    let task = tokio::spawn(async move {
        let guard = task_guard;
        loop {
            tokio::select! {
                _ = guard.cancelled() => break,
                next = stream.next() => match next {
                    Some(Ok(snapshot)) => {
                        let value = decode(&snapshot);
                        let applied = state
                            .apply_scoped(&guard, field, |s| apply(s, value))
                            .await;
                        if !applied {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        tracing::warn!(slot = ?guard.key(), error = %e, "Live query error");
                        let message = format!("Sync error: {e}");
                        state
                            .apply_scoped(&guard, StateField::Status, |s| s.status = Some(message))
                            .await;
                    }
                    None => break,
                }
            }
        }
    });
    registry.attach(&guard, task);
}
