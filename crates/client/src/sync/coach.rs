//! Coach scope: the roster, the selected students, and the pinned-memo
//! board across them.

use trainlog_core::error::CoreError;
use trainlog_core::types::UserId;
use trainlog_store::repositories::{PinnedMemoRepo, UserRepo};

use crate::context::ClientContext;
use crate::error::ClientResult;
use crate::state::StateField;
use crate::subscription::{spawn_listener, SlotKey};

use super::calendar::load_calendar_month;
use super::records::load_records_for_date;

/// Subscribe to the student roster.
pub async fn load_students(ctx: &ClientContext) -> ClientResult<()> {
    ensure_coach(ctx).await?;
    let store = ctx.store()?;
    let guard = ctx.subscriptions.open(SlotKey::Students);

    let stream = store.listen(UserRepo::students_query());
    spawn_listener(
        ctx.state.clone(),
        &ctx.subscriptions,
        guard,
        StateField::Students,
        stream,
        UserRepo::decode_students,
        |state, students| state.students = students,
    );
    Ok(())
}

/// Replace the selection and re-scope every coach subscription to it.
pub async fn select_students(ctx: &ClientContext, student_ids: Vec<UserId>) -> ClientResult<()> {
    ensure_coach(ctx).await?;
    let mut selected: Vec<UserId> = Vec::with_capacity(student_ids.len());
    for id in student_ids {
        if !selected.contains(&id) {
            selected.push(id);
        }
    }

    let (date, year, month) = ctx
        .state
        .update(StateField::SelectedStudents, |s| {
            s.selected_students = selected.clone();
            (s.selected_date(), s.calendar.year, s.calendar.month)
        })
        .await;
    tracing::info!(count = selected.len(), "Coach selection changed");

    load_records_for_date(ctx, date, selected.clone()).await?;
    load_calendar_month(ctx, year, month, selected.clone()).await?;
    load_coach_pinned_memos(ctx, selected).await
}

/// Subscribe to the pinned memos of every owner in `owner_ids`.
pub async fn load_coach_pinned_memos(
    ctx: &ClientContext,
    owner_ids: Vec<UserId>,
) -> ClientResult<()> {
    let store = ctx.store()?;
    let guard = ctx.subscriptions.open(SlotKey::CoachMemos);

    if owner_ids.is_empty() {
        ctx.state
            .apply_scoped(&guard, StateField::CoachMemos, |s| s.coach_memos.clear())
            .await;
        return Ok(());
    }

    let stream = store.listen(PinnedMemoRepo::for_owners_query(&owner_ids));
    spawn_listener(
        ctx.state.clone(),
        &ctx.subscriptions,
        guard,
        StateField::CoachMemos,
        stream,
        PinnedMemoRepo::decode_snapshot,
        |state, memos| state.coach_memos = memos,
    );
    Ok(())
}

// ---- private helpers ----

async fn ensure_coach(ctx: &ClientContext) -> ClientResult<()> {
    let session = ctx.session().await?;
    if session.is_coach() {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!("{} is not a coach", session.user_id)).into())
    }
}
