//! Applies a classification to the launch store.
//!
//! Writes are best-effort: each mutation is attempted regardless of earlier
//! failures, and failures are collected in the [`SyncOutcome`]. A rerun
//! retries whatever did not land, because the next classification diffs
//! against whatever the store actually holds.

use crate::classifier::{classify, Classification, IncomingSet, Mutation};
use crate::traits::LaunchStore;
use crate::types::{ChangeEvent, LaunchRecord};
use crate::StoreError;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A store write that did not land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationFailure {
    pub mutation: Mutation,
    pub error: StoreError,
}

/// Result of one synchronization pass.
#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    pub events: Vec<ChangeEvent>,
    /// Writes that succeeded.
    pub applied: usize,
    pub failures: Vec<MutationFailure>,
}

impl SyncOutcome {
    /// True when every write landed, i.e. the store now equals the incoming set.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Keeps the launch store equal to the incoming feed.
#[derive(Clone)]
pub struct Synchronizer {
    store: Arc<dyn LaunchStore>,
}

impl Synchronizer {
    pub fn new(store: Arc<dyn LaunchStore>) -> Self {
        Self { store }
    }

    /// Classify `incoming` against `existing` and write the difference.
    pub async fn synchronize(
        &self,
        incoming: &IncomingSet,
        existing: &[LaunchRecord],
    ) -> SyncOutcome {
        let classification = classify(incoming, existing);
        self.apply(classification).await
    }

    /// Write the mutations implied by `classification`.
    pub async fn apply(&self, classification: Classification) -> SyncOutcome {
        let mutations = classification.mutations();
        let mut outcome = SyncOutcome {
            events: classification.events,
            ..Default::default()
        };

        for mutation in mutations {
            match self.write(&mutation).await {
                Ok(()) => {
                    debug!(launch_id = %mutation.launch_id(), op = mutation.verb(), "Launch written");
                    outcome.applied += 1;
                }
                Err(error) => {
                    warn!(
                        launch_id = %mutation.launch_id(),
                        op = mutation.verb(),
                        error = %error,
                        "Launch write failed, continuing"
                    );
                    outcome.failures.push(MutationFailure { mutation, error });
                }
            }
        }

        info!(
            events = outcome.events.len(),
            applied = outcome.applied,
            failed = outcome.failures.len(),
            "Launch store synchronized"
        );
        outcome
    }

    async fn write(&self, mutation: &Mutation) -> Result<(), StoreError> {
        match mutation {
            Mutation::Insert(record) => self.store.insert(record).await,
            Mutation::Update(record) => self.store.update(record).await,
            Mutation::Delete(id) => self.store.delete(id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryLaunchStore;
    use crate::types::ChangeKind;
    use chrono::{DateTime, TimeZone, Utc};

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, hour, 0, 0).unwrap()
    }

    fn incoming(records: Vec<LaunchRecord>) -> IncomingSet {
        IncomingSet::try_from(records).unwrap()
    }

    #[tokio::test]
    async fn synchronize_same_set_writes_nothing() {
        let records = vec![LaunchRecord::new("1", "Alpha", t(9), "Go")];
        let store = Arc::new(MemoryLaunchStore::with_records(records.clone()));
        let sync = Synchronizer::new(store.clone());

        let outcome = sync.synchronize(&incoming(records.clone()), &records).await;

        assert!(outcome.events.is_empty());
        assert_eq!(outcome.applied, 0);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn synchronize_heals_store_to_incoming() {
        let existing = vec![
            LaunchRecord::new("1", "Alpha", t(9), "Go"),
            LaunchRecord::new("2", "Beta", t(10), "Go"),
            LaunchRecord::new("3", "Gamma", t(11), "Go"),
        ];
        let feed = vec![
            LaunchRecord::new("1", "Alpha", t(12), "Go"),
            LaunchRecord::new("3", "Gamma Renamed", t(11), "Go"),
            LaunchRecord::new("4", "Delta", t(13), "TBD"),
        ];
        let store = Arc::new(MemoryLaunchStore::with_records(existing.clone()));
        let sync = Synchronizer::new(store.clone());

        let outcome = sync.synchronize(&incoming(feed.clone()), &existing).await;

        assert!(outcome.is_clean());
        assert_eq!(outcome.applied, 4);
        let mut expected = feed;
        expected.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(store.snapshot(), expected);
    }

    #[tokio::test]
    async fn failed_write_does_not_block_others() {
        let existing = vec![
            LaunchRecord::new("1", "Alpha", t(9), "Go"),
            LaunchRecord::new("2", "Beta", t(10), "Go"),
        ];
        let feed = vec![
            LaunchRecord::new("1", "Alpha", t(9), "Hold"),
            LaunchRecord::new("2", "Beta", t(10), "Hold"),
            LaunchRecord::new("3", "Gamma", t(11), "Go"),
        ];
        let store = Arc::new(MemoryLaunchStore::with_records(existing.clone()).fail_on("1"));
        let sync = Synchronizer::new(store.clone());

        let outcome = sync.synchronize(&incoming(feed), &existing).await;

        assert_eq!(outcome.events.len(), 3);
        assert_eq!(outcome.applied, 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].mutation.launch_id().as_str(), "1");

        let stored = store.snapshot();
        assert_eq!(stored[0].status, "Go");
        assert_eq!(stored[1].status, "Hold");
        assert_eq!(stored[2].id.as_str(), "3");
    }

    #[tokio::test]
    async fn rerun_after_failure_retries_the_missed_write() {
        let existing = vec![LaunchRecord::new("1", "Alpha", t(9), "Go")];
        let feed = incoming(vec![LaunchRecord::new("1", "Alpha", t(9), "Hold")]);
        let store = Arc::new(MemoryLaunchStore::with_records(existing.clone()).fail_on("1"));
        let sync = Synchronizer::new(store.clone());

        let first = sync.synchronize(&feed, &existing).await;
        assert!(!first.is_clean());

        store.clear_failures();
        let baseline = store.read_all().await.unwrap();
        let second = sync.synchronize(&feed, &baseline).await;

        assert!(second.is_clean());
        assert_eq!(second.events[0].kind, ChangeKind::StatusChanged);
        assert_eq!(store.snapshot(), feed.into_records());
    }
}
