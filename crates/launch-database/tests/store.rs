//! SqliteStore against a real database file.

use chrono::{DateTime, TimeZone, Utc};
use launch_database::{AsyncDatabase, SqliteStore};
use launch_sync_core::{
    ChangeKind, IncomingSet, LaunchRecord, LaunchStore, SubscriberStore, Synchronizer,
};
use std::sync::Arc;
use tempfile::tempdir;

fn t(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
}

async fn open_store(dir: &tempfile::TempDir) -> SqliteStore {
    let db = AsyncDatabase::open(&dir.path().join("launches.sqlite"))
        .await
        .unwrap();
    SqliteStore::new(db)
}

#[tokio::test]
async fn synchronize_leaves_store_equal_to_incoming() {
    let dir = tempdir().unwrap();
    let store = Arc::new(open_store(&dir).await);

    for record in [
        LaunchRecord::new("1", "Alpha", t(3, 10), "Go"),
        LaunchRecord::new("2", "Beta", t(4, 10), "Go"),
        LaunchRecord::new("3", "Gamma", t(5, 10), "Go"),
    ] {
        store.insert(&record).await.unwrap();
    }

    let feed = vec![
        LaunchRecord::new("1", "Alpha", t(3, 10), "Scrubbed"),
        LaunchRecord::new("3", "Gamma", t(6, 8), "Go"),
        LaunchRecord::new("4", "Delta", t(7, 9), "TBD"),
    ];
    let existing = store.read_all().await.unwrap();
    let outcome = Synchronizer::new(store.clone())
        .synchronize(&IncomingSet::try_from(feed.clone()).unwrap(), &existing)
        .await;

    assert!(outcome.is_clean());
    let kinds: Vec<_> = outcome.events.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ChangeKind::StatusChanged,
            ChangeKind::Rescheduled,
            ChangeKind::New,
            ChangeKind::Postponed
        ]
    );
    assert_eq!(store.read_all().await.unwrap(), feed);
}

#[tokio::test]
async fn snapshot_survives_reopen() {
    let dir = tempdir().unwrap();
    let record = LaunchRecord::new("1", "Alpha", t(3, 10), "Go");
    {
        let store = open_store(&dir).await;
        store.insert(&record).await.unwrap();
        store.database().clone().close().await.unwrap();
    }

    let store = open_store(&dir).await;
    assert_eq!(store.read_all().await.unwrap(), vec![record]);
}

#[tokio::test]
async fn subscriber_lifecycle() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir).await;

    let delta = store
        .reconcile_subscribers(&["a@example.com".to_string()])
        .await
        .unwrap();
    assert_eq!(delta.added, 1);
    assert!(store.list_subscribers().await.unwrap()[0].is_new);

    store.mark_all_existing().await.unwrap();
    store
        .reconcile_subscribers(&["a@example.com".to_string(), "b@example.com".to_string()])
        .await
        .unwrap();

    let subscribers = store.list_subscribers().await.unwrap();
    assert_eq!(subscribers.len(), 2);
    assert!(!subscribers[0].is_new);
    assert!(subscribers[1].is_new);

    store.reconcile_subscribers(&[]).await.unwrap();
    assert_eq!(store.counts().await.unwrap(), (0, 0));
}
