use prep_core::model::{AuthSession, ExamSelection, Percent, ProgressState, Subject};
use prep_core::time::fixed_now;
use storage::repository::{KeyValueStore, Storage, StorageError, StoreKey};
use storage::sqlite::SqliteStore;

#[tokio::test]
async fn sqlite_roundtrip_persists_records() {
    let storage = Storage::sqlite("sqlite:file:memdb_records?mode=memory&cache=shared")
        .await
        .expect("connect");

    let mut progress = ProgressState::default();
    progress.record_completion(
        fixed_now().date_naive(),
        Subject::Science,
        Percent::new(64).unwrap(),
        8,
    );
    storage.progress.save(&progress).await.unwrap();

    let mut selection = ExamSelection::default();
    selection.set("neet", "NEET", "green");
    storage.exam_selection.save(&selection).await.unwrap();

    assert_eq!(storage.progress.load().await.unwrap(), Some(progress));
    assert_eq!(storage.exam_selection.load().await.unwrap(), Some(selection));
    assert!(storage.auth.load().await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_put_overwrites_and_remove_is_idempotent() {
    let store = SqliteStore::connect("sqlite:file:memdb_overwrite?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");
    // Running migrations twice is a no-op.
    store.migrate().await.expect("migrate again");

    store.put(StoreKey::Auth, "first").await.unwrap();
    store.put(StoreKey::Auth, "second").await.unwrap();
    assert_eq!(
        store.get(StoreKey::Auth).await.unwrap().as_deref(),
        Some("second")
    );

    store.remove(StoreKey::Auth).await.unwrap();
    store.remove(StoreKey::Auth).await.unwrap();
    assert!(store.get(StoreKey::Auth).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_surfaces_corrupt_records() {
    let store = SqliteStore::connect("sqlite:file:memdb_corrupt?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");
    store.put(StoreKey::Auth, "[1, 2").await.unwrap();

    let storage = Storage::from_store(std::sync::Arc::new(store));
    let err = storage.auth.load().await.unwrap_err();
    assert!(matches!(err, StorageError::Serialization(_)));

    storage.auth.save(&AuthSession::bypass()).await.unwrap();
    assert_eq!(storage.auth.load().await.unwrap(), Some(AuthSession::bypass()));
}
