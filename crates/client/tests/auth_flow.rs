mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use common::*;
use trainlog_client::auth::password::hash_password;
use trainlog_client::auth::{self, migrate_local_storage_to_store, MigrationReport};
use trainlog_client::storage::{
    FileStorage, LocalStorage, MemoryStorage, LEGACY_RECORDS_KEY, MIGRATION_MARKER_KEY,
    SAVED_LOGIN_KEY,
};
use trainlog_client::subscription::SlotKey;
use trainlog_client::ClientError;
use trainlog_core::error::CoreError;
use trainlog_core::record::{RawSet, TrainingRecord};
use trainlog_core::roles::Role;
use trainlog_core::session::ARGON2_PREFIX;
use trainlog_store::repositories::{RecordRepo, UserRepo};
use trainlog_store::MemoryStore;

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_sets_session_and_opens_subscriptions() {
    let (ctx, _store) = seeded_context().await;
    let session = auth::login(&ctx, OTHER_STUDENT, OTHER_PASSWORD, false).await.unwrap();

    assert_eq!(session.role, Role::Student);
    assert_eq!(ctx.session().await.unwrap().user_id, OTHER_STUDENT);
    assert!(ctx.subscriptions.is_active(SlotKey::Records));
    assert!(ctx.subscriptions.is_active(SlotKey::PinnedMemos));
    assert!(ctx.subscriptions.is_active(SlotKey::CalendarMonth));
    assert!(!ctx.subscriptions.is_active(SlotKey::Students));
}

#[tokio::test]
async fn coach_login_opens_the_roster() {
    let (ctx, _store) = seeded_context().await;
    auth::login(&ctx, COACH, COACH_PASSWORD, false).await.unwrap();
    assert!(ctx.subscriptions.is_active(SlotKey::Students));
    wait_for(&ctx, |s| s.students.len() == 2).await;
}

#[tokio::test]
async fn wrong_password_and_unknown_user_are_rejected_alike() {
    let (ctx, _store) = seeded_context().await;
    assert_matches!(
        auth::login(&ctx, OTHER_STUDENT, "nope", false).await,
        Err(ClientError::InvalidCredentials)
    );
    assert_matches!(
        auth::login(&ctx, "ghost", "nope", false).await,
        Err(ClientError::InvalidCredentials)
    );
    assert!(ctx.session().await.is_err());
}

#[tokio::test]
async fn legacy_plain_password_is_upgraded_on_login() {
    let (ctx, store) = seeded_context().await;
    let session = auth::login(&ctx, STUDENT, STUDENT_PASSWORD, false).await.unwrap();
    assert!(session.credential.is_hashed());

    let stored = UserRepo::find(&store, STUDENT).await.unwrap().unwrap();
    assert!(stored.password.starts_with(ARGON2_PREFIX));

    // The same password keeps working against the hash.
    auth::logout(&ctx).await.unwrap();
    auth::login(&ctx, STUDENT, STUDENT_PASSWORD, false).await.unwrap();
}

// ---------------------------------------------------------------------------
// Remembered login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn saved_login_restores_the_session_on_next_start() {
    let store = MemoryStore::new();
    seed_users(&store).await;
    let storage: Arc<dyn LocalStorage> = Arc::new(MemoryStorage::new());

    let first = context_with(Arc::new(store.clone()), storage.clone());
    auth::login(&first, OTHER_STUDENT, OTHER_PASSWORD, true).await.unwrap();
    assert!(storage.get(SAVED_LOGIN_KEY).await.unwrap().is_some());

    let second = context_with(Arc::new(store.clone()), storage.clone());
    let restored = auth::restore_saved_login(&second).await.unwrap().unwrap();
    assert_eq!(restored.user_id, OTHER_STUDENT);
    assert!(second.subscriptions.is_active(SlotKey::Records));
}

#[tokio::test]
async fn saved_login_is_rejected_after_password_change() {
    let store = MemoryStore::new();
    seed_users(&store).await;
    let storage: Arc<dyn LocalStorage> = Arc::new(MemoryStorage::new());

    let ctx = context_with(Arc::new(store.clone()), storage.clone());
    auth::login(&ctx, OTHER_STUDENT, OTHER_PASSWORD, true).await.unwrap();

    let new_hash = hash_password("new-password").unwrap();
    UserRepo::update_password(&store, OTHER_STUDENT, &new_hash).await.unwrap();

    let next = context_with(Arc::new(store), storage.clone());
    assert!(auth::restore_saved_login(&next).await.unwrap().is_none());
    assert!(next.session().await.is_err());
    assert!(storage.get(SAVED_LOGIN_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn login_without_remember_forgets_a_previous_save() {
    let (ctx, _store) = seeded_context().await;
    auth::login(&ctx, OTHER_STUDENT, OTHER_PASSWORD, true).await.unwrap();
    auth::login(&ctx, OTHER_STUDENT, OTHER_PASSWORD, false).await.unwrap();
    assert!(auth::load_saved_login(&ctx).await.unwrap().is_none());
}

#[tokio::test]
async fn unreadable_saved_login_is_discarded() {
    let (ctx, _store) = seeded_context().await;
    ctx.storage.set(SAVED_LOGIN_KEY, "{not json").await.unwrap();
    assert!(auth::load_saved_login(&ctx).await.unwrap().is_none());
    assert!(ctx.storage.get(SAVED_LOGIN_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn logout_cancels_everything_and_forgets_the_login() {
    let (ctx, _store) = seeded_context().await;
    auth::login(&ctx, COACH, COACH_PASSWORD, true).await.unwrap();
    assert!(ctx.subscriptions.active_count() > 0);

    auth::logout(&ctx).await.unwrap();
    assert_eq!(ctx.subscriptions.active_count(), 0);
    assert!(ctx.session().await.is_err());
    assert!(ctx.state.read(|s| s.students.is_empty()).await);
    assert!(auth::load_saved_login(&ctx).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_hashes_and_refuses_duplicates() {
    let (ctx, store) = seeded_context().await;
    let user = auth::register_user(&ctx, "cy", "Cy", "pull-up", Role::Student).await.unwrap();
    assert!(user.password.starts_with(ARGON2_PREFIX));
    assert!(UserRepo::find(&store, "cy").await.unwrap().is_some());

    assert_matches!(
        auth::register_user(&ctx, "cy", "Cy again", "pull-up", Role::Student).await,
        Err(ClientError::Core(CoreError::Conflict(_)))
    );
    assert_matches!(
        auth::register_user(&ctx, "dee", "Dee", "abc", Role::Student).await,
        Err(ClientError::Core(CoreError::Validation(_)))
    );
    assert_matches!(
        auth::register_user(&ctx, "bad id", "X", "abcd", Role::Student).await,
        Err(ClientError::Core(CoreError::Validation(_)))
    );
}

// ---------------------------------------------------------------------------
// Legacy migration
// ---------------------------------------------------------------------------

const LEGACY: &str = r#"{
    "2024-05-01": { "sets": [{ "exerciseName": "Squat", "weight": "80", "reps": 5 }], "memo": "old" },
    "2024-05-02": { "sets": [{ "name": "Bench", "weight": 60, "reps": 8 }, { "weight": 10 }] },
    "2024-05-03": { "sets": [{ "exercise": "Row", "weight": 40, "reps": 10 }] },
    "not-a-date": { "sets": [] }
}"#;

#[tokio::test]
async fn migration_copies_legacy_records_once() {
    let (ctx, store) = seeded_context().await;
    ctx.storage.set(LEGACY_RECORDS_KEY, LEGACY).await.unwrap();

    // The store already has a record for the 3rd; it must survive.
    let mut existing = TrainingRecord::new(STUDENT, day(3));
    existing.add_set(&RawSet::new("Deadlift", 120.0, 3)).unwrap();
    RecordRepo::save(&store, &existing).await.unwrap();

    let report = migrate_local_storage_to_store(&ctx, STUDENT).await.unwrap();
    assert_eq!(report.migrated, 2);
    assert_eq!(report.skipped_existing, 1);
    assert_eq!(report.skipped_invalid, 1);
    assert_eq!(report.dropped_sets, 1);
    let marker = ctx.storage.get(MIGRATION_MARKER_KEY).await.unwrap().unwrap();
    assert!(marker.contains(STUDENT));

    let first = RecordRepo::find(&store, STUDENT, day(1)).await.unwrap().unwrap();
    assert_eq!(first.sets[0].exercise, "Squat");
    assert_eq!(first.memo, "old");
    let third = RecordRepo::find(&store, STUDENT, day(3)).await.unwrap().unwrap();
    assert_eq!(third.sets[0].exercise, "Deadlift");

    let count = store.count(RecordRepo::COLLECTION).await;
    let again = migrate_local_storage_to_store(&ctx, STUDENT).await.unwrap();
    assert!(again.already_migrated);
    assert_eq!(again.claimed_by.as_deref(), Some(STUDENT));
    assert_eq!(again.migrated, 0);
    assert_eq!(store.count(RecordRepo::COLLECTION).await, count);
}

#[tokio::test]
async fn migration_without_legacy_data_is_a_no_op() {
    let (ctx, store) = seeded_context().await;
    let report = migrate_local_storage_to_store(&ctx, STUDENT).await.unwrap();
    assert_eq!(report, MigrationReport::default());
    assert_eq!(store.count(RecordRepo::COLLECTION).await, 0);
}

#[tokio::test]
async fn failed_migration_leaves_no_marker() {
    let (ctx, store) = seeded_context().await;
    ctx.storage.set(LEGACY_RECORDS_KEY, LEGACY).await.unwrap();
    store.set_offline(true);

    assert_matches!(
        migrate_local_storage_to_store(&ctx, STUDENT).await,
        Err(ClientError::Store(_))
    );
    assert!(ctx.storage.get(MIGRATION_MARKER_KEY).await.unwrap().is_none());

    store.set_offline(false);
    let report = migrate_local_storage_to_store(&ctx, STUDENT).await.unwrap();
    assert_eq!(report.migrated, 3);
}

#[tokio::test]
async fn student_login_runs_the_migration() {
    let (ctx, store) = seeded_context().await;
    ctx.storage.set(LEGACY_RECORDS_KEY, LEGACY).await.unwrap();
    auth::login(&ctx, STUDENT, STUDENT_PASSWORD, false).await.unwrap();
    assert_eq!(store.count(RecordRepo::COLLECTION).await, 3);
}

#[tokio::test]
async fn legacy_records_go_only_to_the_first_student_on_the_device() {
    let (ctx, store) = seeded_context().await;
    ctx.storage.set(LEGACY_RECORDS_KEY, LEGACY).await.unwrap();

    auth::login(&ctx, STUDENT, STUDENT_PASSWORD, false).await.unwrap();
    auth::logout(&ctx).await.unwrap();
    auth::login(&ctx, OTHER_STUDENT, OTHER_PASSWORD, false).await.unwrap();

    assert!(RecordRepo::find(&store, STUDENT, day(1)).await.unwrap().is_some());
    assert!(RecordRepo::find(&store, OTHER_STUDENT, day(1)).await.unwrap().is_none());
    assert_eq!(store.count(RecordRepo::COLLECTION).await, 3);

    let report = migrate_local_storage_to_store(&ctx, OTHER_STUDENT).await.unwrap();
    assert!(report.already_migrated);
    assert_eq!(report.claimed_by.as_deref(), Some(STUDENT));
}

#[tokio::test]
async fn migration_works_for_owner_ids_outside_ascii() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::new();
    let ctx = context_with(Arc::new(store.clone()), Arc::new(FileStorage::new(dir.path())));
    ctx.storage.set(LEGACY_RECORDS_KEY, LEGACY).await.unwrap();

    let report = migrate_local_storage_to_store(&ctx, "zoë").await.unwrap();
    assert_eq!(report.migrated, 3);
    assert!(RecordRepo::find(&store, "zoë", day(1)).await.unwrap().is_some());

    let again = migrate_local_storage_to_store(&ctx, "zoë").await.unwrap();
    assert!(again.already_migrated);
}
