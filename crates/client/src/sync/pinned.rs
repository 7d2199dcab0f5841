//! Pinned memos of a single owner.

use trainlog_store::repositories::PinnedMemoRepo;

use crate::context::ClientContext;
use crate::error::ClientResult;
use crate::state::StateField;
use crate::subscription::{spawn_listener, SlotKey};

/// Subscribe to the pinned memos of `owner_id`, newest first.
pub async fn load_pinned_exercises(ctx: &ClientContext, owner_id: &str) -> ClientResult<()> {
    let store = ctx.store()?;
    let guard = ctx.subscriptions.open(SlotKey::PinnedMemos);
    tracing::debug!(owner_id, generation = guard.generation(), "Loading pinned memos");

    let stream = store.listen(PinnedMemoRepo::for_owner_query(owner_id));
    spawn_listener(
        ctx.state.clone(),
        &ctx.subscriptions,
        guard,
        StateField::PinnedMemos,
        stream,
        PinnedMemoRepo::decode_snapshot,
        |state, memos| state.pinned_memos = memos,
    );
    Ok(())
}
