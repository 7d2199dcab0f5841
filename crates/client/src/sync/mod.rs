//! Live synchronisation between the document store and [`AppState`].
//!
//! Every loader opens its subscription slot, starts a live query scoped by
//! owner and date, and hands the stream to
//! [`spawn_listener`](crate::subscription::spawn_listener), which writes
//! each snapshot into the state.
//!
//! [`AppState`]: crate::state::AppState

pub mod calendar;
pub mod coach;
pub mod pinned;
pub mod records;

use trainlog_core::roles::Role;
use trainlog_core::session::Session;

use crate::context::ClientContext;
use crate::error::ClientResult;

/// Open the subscriptions a freshly established session needs.
pub async fn start_session_sync(ctx: &ClientContext, session: &Session) -> ClientResult<()> {
    let (date, year, month) = ctx
        .state
        .read(|s| (s.selected_date(), s.calendar.year, s.calendar.month))
        .await;

    match session.role {
        Role::Student => {
            let owners = vec![session.user_id.clone()];
            records::load_records_for_date(ctx, date, owners.clone()).await?;
            pinned::load_pinned_exercises(ctx, &session.user_id).await?;
            calendar::load_calendar_month(ctx, year, month, owners).await?;
        }
        Role::Coach => {
            coach::load_students(ctx).await?;
            let owners = ctx.state.read(|s| s.selected_students.clone()).await;
            records::load_records_for_date(ctx, date, owners.clone()).await?;
            calendar::load_calendar_month(ctx, year, month, owners.clone()).await?;
            coach::load_coach_pinned_memos(ctx, owners).await?;
        }
    }
    tracing::info!(user_id = %session.user_id, role = %session.role, "Session sync started");
    Ok(())
}
