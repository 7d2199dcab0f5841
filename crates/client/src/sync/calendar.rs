//! The visible month and the selected day.

use trainlog_core::calendar::day_marks;
use trainlog_core::error::CoreError;
use trainlog_core::types::{Day, UserId};
use trainlog_core::util::month_bounds;
use trainlog_store::repositories::RecordRepo;

use crate::context::ClientContext;
use crate::error::ClientResult;
use crate::state::StateField;
use crate::subscription::{spawn_listener, SlotKey};

use super::records::load_records_for_date;

/// Subscribe to the day marks of `owner_ids` across one month.
pub async fn load_calendar_month(
    ctx: &ClientContext,
    year: i32,
    month: u32,
    owner_ids: Vec<UserId>,
) -> ClientResult<()> {
    let (first, last) = month_bounds(year, month)?;
    let store = ctx.store()?;
    let guard = ctx.subscriptions.open(SlotKey::CalendarMonth);
    tracing::debug!(year, month, owners = owner_ids.len(), generation = guard.generation(), "Loading calendar month");

    if owner_ids.is_empty() {
        ctx.state
            .apply_scoped(&guard, StateField::MonthMarks, |s| s.month_marks.clear())
            .await;
        return Ok(());
    }

    let stream = store.listen(RecordRepo::for_range_query(first, last, &owner_ids));
    spawn_listener(
        ctx.state.clone(),
        &ctx.subscriptions,
        guard,
        StateField::MonthMarks,
        stream,
        |snapshot| day_marks(&RecordRepo::decode_snapshot(snapshot)),
        |state, marks| state.month_marks = marks,
    );
    Ok(())
}

/// Select `date`.
///
/// The month subscription follows immediately when the visible month
/// changes. The records reload is debounced so clicking through days
/// issues one query for the day the user settles on.
pub async fn select_date(ctx: &ClientContext, date: Day) -> ClientResult<()> {
    let (before, (year, month), owners) = ctx
        .state
        .update(StateField::Calendar, |s| {
            let before = (s.calendar.year, s.calendar.month);
            s.calendar.select(date);
            (before, (s.calendar.year, s.calendar.month), s.active_owner_ids())
        })
        .await;

    if !ctx.has_store() || ctx.session().await.is_err() {
        return Ok(());
    }
    if before != (year, month) {
        load_calendar_month(ctx, year, month, owners).await?;
    }
    schedule_record_reload(ctx);
    Ok(())
}

/// Move the visible month by `delta` and follow it with the month
/// subscription. The selected day does not change.
pub async fn shift_month(ctx: &ClientContext, delta: i32) -> ClientResult<()> {
    let (year, month, owners) = ctx
        .state
        .update(StateField::Calendar, |s| {
            s.calendar.shift_month(delta)?;
            Ok::<_, CoreError>((s.calendar.year, s.calendar.month, s.active_owner_ids()))
        })
        .await?;

    if !ctx.has_store() || ctx.session().await.is_err() {
        return Ok(());
    }
    load_calendar_month(ctx, year, month, owners).await
}

// ---- private helpers ----

/// Reload records for whatever day and owners are current when the delay
/// elapses.
fn schedule_record_reload(ctx: &ClientContext) {
    let debouncer = ctx.record_reload.clone();
    let ctx = ctx.clone();
    debouncer.call(async move {
        let (date, owners) = ctx
            .state
            .read(|s| (s.selected_date(), s.active_owner_ids()))
            .await;
        if let Err(e) = load_records_for_date(&ctx, date, owners).await {
            tracing::warn!(%date, error = %e, "Debounced record reload failed");
        }
    });
}
