//! Session identity: login, remembered logins, registration and logout.
//!
//! - [`password`] -- Argon2id hashing plus the legacy plain-password check.
//! - [`migration`] -- one-time copy of legacy local records into the store.

pub mod migration;
pub mod password;

pub use migration::{migrate_local_storage_to_store, MigrationReport};

use trainlog_core::error::CoreError;
use trainlog_core::roles::Role;
use trainlog_core::session::{validate_user_id, Credential, SavedLogin, Session};
use trainlog_core::util::today;
use trainlog_store::models::user::StoredUser;
use trainlog_store::repositories::UserRepo;

use crate::context::ClientContext;
use crate::error::{ClientError, ClientResult};
use crate::state::StateField;
use crate::storage::SAVED_LOGIN_KEY;
use crate::sync::start_session_sync;

use self::password::{
    hash_password, matches_stored, validate_password_strength, MIN_PASSWORD_LENGTH,
};

// ---------------------------------------------------------------------------
// Login / logout
// ---------------------------------------------------------------------------

/// Authenticate against the `users` collection and start the session.
///
/// A legacy plain password is replaced by its Argon2 hash on success. With
/// `remember` the session is written to local storage, otherwise any saved
/// login is cleared.
pub async fn login(
    ctx: &ClientContext,
    user_id: &str,
    password: &str,
    remember: bool,
) -> ClientResult<Session> {
    let user_id = user_id.trim();
    let store = ctx.store()?;

    let user = UserRepo::find(store.as_ref(), user_id)
        .await?
        .ok_or(ClientError::InvalidCredentials)?;
    if !matches_stored(password, &user.password)? {
        tracing::info!(user_id, "Login rejected");
        return Err(ClientError::InvalidCredentials);
    }

    let mut stored = user.password.clone();
    if !Credential::from_stored(&stored).is_hashed() {
        let hash = hash_password(password)?;
        match UserRepo::update_password(store.as_ref(), user_id, &hash).await {
            Ok(()) => {
                tracing::info!(user_id, "Upgraded legacy password to argon2");
                stored = hash;
            }
            Err(e) => tracing::warn!(user_id, error = %e, "Password upgrade failed"),
        }
    }

    let session = session_for(&user, &stored);
    if remember {
        save_login(ctx, &session).await?;
    } else {
        clear_saved_login(ctx).await?;
    }
    establish(ctx, session).await
}

/// Restore the remembered login, if it still matches the store.
///
/// A saved login whose user is gone or whose password changed is cleared
/// and `None` is returned.
pub async fn restore_saved_login(ctx: &ClientContext) -> ClientResult<Option<Session>> {
    let Some(saved) = load_saved_login(ctx).await? else {
        return Ok(None);
    };
    let store = ctx.store()?;

    let user = UserRepo::find(store.as_ref(), &saved.user_id).await?;
    let Some(user) = user.filter(|u| saved.credential.matches_stored(&u.password)) else {
        tracing::info!(user_id = %saved.user_id, "Saved login no longer valid");
        clear_saved_login(ctx).await?;
        return Ok(None);
    };

    let session = session_for(&user, &user.password);
    establish(ctx, session).await.map(Some)
}

/// End the session: stop every subscription and pending reload, reset the
/// state and forget the saved login.
pub async fn logout(ctx: &ClientContext) -> ClientResult<()> {
    let user_id = ctx.session().await.ok().map(|s| s.user_id);
    ctx.subscriptions.cancel_all();
    ctx.record_reload.cancel();
    ctx.state
        .update(StateField::Session, |s| s.reset_session(today()))
        .await;
    clear_saved_login(ctx).await?;
    tracing::info!(user_id = user_id.as_deref().unwrap_or_default(), "Logged out");
    Ok(())
}

/// Create an account. The password is stored as an Argon2 hash.
pub async fn register_user(
    ctx: &ClientContext,
    user_id: &str,
    display_name: &str,
    password: &str,
    role: Role,
) -> ClientResult<StoredUser> {
    validate_user_id(user_id)?;
    if display_name.trim().is_empty() {
        return Err(CoreError::Validation("Display name cannot be empty".into()).into());
    }
    validate_password_strength(password, MIN_PASSWORD_LENGTH).map_err(CoreError::Validation)?;

    let store = ctx.store()?;
    let user = StoredUser {
        user_id: user_id.to_string(),
        display_name: display_name.trim().to_string(),
        role,
        password: hash_password(password)?,
    };
    if !UserRepo::create(store.as_ref(), &user).await? {
        return Err(CoreError::Conflict(format!("User id '{user_id}' is already taken")).into());
    }
    tracing::info!(user_id, %role, "User registered");
    Ok(user)
}

// ---------------------------------------------------------------------------
// Remembered login
// ---------------------------------------------------------------------------

pub async fn save_login(ctx: &ClientContext, session: &Session) -> ClientResult<()> {
    let json = serde_json::to_string(&session.to_saved_login())
        .map_err(|e| ClientError::Storage(e.to_string()))?;
    ctx.storage.set(SAVED_LOGIN_KEY, &json).await
}

/// The saved login, if any. An unreadable entry is removed.
pub async fn load_saved_login(ctx: &ClientContext) -> ClientResult<Option<SavedLogin>> {
    let Some(raw) = ctx.storage.get(SAVED_LOGIN_KEY).await? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(saved) => Ok(Some(saved)),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable saved login");
            ctx.storage.remove(SAVED_LOGIN_KEY).await?;
            Ok(None)
        }
    }
}

pub async fn clear_saved_login(ctx: &ClientContext) -> ClientResult<()> {
    ctx.storage.remove(SAVED_LOGIN_KEY).await
}

// ---- private helpers ----

fn session_for(user: &StoredUser, stored_password: &str) -> Session {
    Session {
        user_id: user.user_id.clone(),
        display_name: user.display_name.clone(),
        role: user.role,
        credential: Credential::from_stored(stored_password),
    }
}

/// Install the session, migrate legacy data once, and open the session's
/// subscriptions.
async fn establish(ctx: &ClientContext, session: Session) -> ClientResult<Session> {
    ctx.subscriptions.cancel_all();
    ctx.state
        .update(StateField::Session, |s| {
            s.reset_session(today());
            s.session = Some(session.clone());
        })
        .await;
    tracing::info!(user_id = %session.user_id, role = %session.role, "Logged in");

    if session.role == Role::Student {
        if let Err(e) = migrate_local_storage_to_store(ctx, &session.user_id).await {
            tracing::warn!(user_id = %session.user_id, error = %e, "Legacy migration failed");
        }
    }

    start_session_sync(ctx, &session).await?;
    Ok(session)
}
