//! In-memory collaborators.
//!
//! Useful for tests and for exercising the pipeline without SQLite, HTTP or
//! a mail server. Failure injection (`fail_on`) lets tests drive the
//! per-record and per-recipient error paths.

use crate::router::{MessageKind, OutgoingMessage};
use crate::traits::{
    FeedSource, LaunchStore, Notifier, SubscriberDelta, SubscriberStore, SubscriptionSource,
};
use crate::types::{LaunchId, LaunchRecord, Subscriber};
use crate::{FetchError, SendError, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Launch store backed by a `BTreeMap`, ordered by id.
#[derive(Debug, Default)]
pub struct MemoryLaunchStore {
    records: Mutex<BTreeMap<LaunchId, LaunchRecord>>,
    failing: Mutex<HashSet<LaunchId>>,
    writes: Mutex<usize>,
}

impl MemoryLaunchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = LaunchRecord>) -> Self {
        let store = Self::default();
        {
            let mut map = lock(&store.records);
            for record in records {
                map.insert(record.id.clone(), record);
            }
        }
        store
    }

    /// Make every write touching `id` fail.
    pub fn fail_on(self, id: impl Into<LaunchId>) -> Self {
        lock(&self.failing).insert(id.into());
        self
    }

    pub fn clear_failures(&self) {
        lock(&self.failing).clear();
    }

    /// Current contents, ordered by id.
    pub fn snapshot(&self) -> Vec<LaunchRecord> {
        lock(&self.records).values().cloned().collect()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        *lock(&self.writes)
    }

    fn check(&self, id: &LaunchId) -> Result<(), StoreError> {
        if lock(&self.failing).contains(id) {
            return Err(StoreError::new(format!("injected failure for launch {id}")));
        }
        Ok(())
    }

    fn count_write(&self) {
        *lock(&self.writes) += 1;
    }
}

#[async_trait]
impl LaunchStore for MemoryLaunchStore {
    async fn read_all(&self) -> Result<Vec<LaunchRecord>, StoreError> {
        Ok(self.snapshot())
    }

    async fn insert(&self, record: &LaunchRecord) -> Result<(), StoreError> {
        self.check(&record.id)?;
        let mut records = lock(&self.records);
        if records.contains_key(&record.id) {
            return Err(StoreError::new(format!("launch {} already stored", record.id)));
        }
        records.insert(record.id.clone(), record.clone());
        drop(records);
        self.count_write();
        Ok(())
    }

    async fn update(&self, record: &LaunchRecord) -> Result<(), StoreError> {
        self.check(&record.id)?;
        let mut records = lock(&self.records);
        match records.get_mut(&record.id) {
            Some(stored) => *stored = record.clone(),
            None => return Err(StoreError::new(format!("launch {} not found", record.id))),
        }
        drop(records);
        self.count_write();
        Ok(())
    }

    async fn delete(&self, id: &LaunchId) -> Result<(), StoreError> {
        self.check(id)?;
        if lock(&self.records).remove(id).is_none() {
            return Err(StoreError::new(format!("launch {id} not found")));
        }
        self.count_write();
        Ok(())
    }
}

/// Subscriber table backed by a `BTreeMap`, ordered by address.
#[derive(Debug, Default)]
pub struct MemorySubscriberStore {
    subscribers: Mutex<BTreeMap<String, bool>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl MemorySubscriberStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscribers(subscribers: impl IntoIterator<Item = Subscriber>) -> Self {
        let store = Self::default();
        lock(&store.subscribers).extend(subscribers.into_iter().map(|s| (s.email, s.is_new)));
        store
    }

    /// Make `reconcile_subscribers` fail until [`clear_failures`](Self::clear_failures).
    pub fn failing_reconcile(self) -> Self {
        lock(&self.failing).insert("reconcile");
        self
    }

    /// Make `list_subscribers` fail until [`clear_failures`](Self::clear_failures).
    pub fn failing_list(self) -> Self {
        lock(&self.failing).insert("list");
        self
    }

    pub fn clear_failures(&self) {
        lock(&self.failing).clear();
    }

    fn check(&self, operation: &'static str) -> Result<(), StoreError> {
        if lock(&self.failing).contains(operation) {
            return Err(StoreError::new(format!("injected {operation} failure")));
        }
        Ok(())
    }

    pub fn snapshot(&self) -> Vec<Subscriber> {
        lock(&self.subscribers)
            .iter()
            .map(|(email, is_new)| Subscriber::new(email.clone(), *is_new))
            .collect()
    }
}

#[async_trait]
impl SubscriberStore for MemorySubscriberStore {
    async fn list_subscribers(&self) -> Result<Vec<Subscriber>, StoreError> {
        self.check("list")?;
        Ok(self.snapshot())
    }

    async fn reconcile_subscribers(
        &self,
        addresses: &[String],
    ) -> Result<SubscriberDelta, StoreError> {
        self.check("reconcile")?;
        let wanted: HashSet<&str> = addresses.iter().map(String::as_str).collect();
        let mut subscribers = lock(&self.subscribers);
        let before = subscribers.len();
        subscribers.retain(|email, _| wanted.contains(email.as_str()));
        let removed = before - subscribers.len();

        let mut added = 0;
        for address in &wanted {
            if !subscribers.contains_key(*address) {
                subscribers.insert((*address).to_string(), true);
                added += 1;
            }
        }
        Ok(SubscriberDelta { added, removed })
    }

    async fn mark_all_existing(&self) -> Result<usize, StoreError> {
        let mut cleared = 0;
        for is_new in lock(&self.subscribers).values_mut() {
            if *is_new {
                *is_new = false;
                cleared += 1;
            }
        }
        Ok(cleared)
    }
}

/// Feed that returns a fixed record set, or a fixed error.
///
/// Records every instant it was asked for.
#[derive(Debug, Clone)]
pub struct StaticFeed {
    result: Result<Vec<LaunchRecord>, FetchError>,
    requested: Arc<Mutex<Vec<DateTime<Utc>>>>,
}

impl StaticFeed {
    pub fn new(records: Vec<LaunchRecord>) -> Self {
        Self {
            result: Ok(records),
            requested: Arc::default(),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            result: Err(FetchError::new(message)),
            requested: Arc::default(),
        }
    }

    pub fn requested(&self) -> Vec<DateTime<Utc>> {
        lock(&self.requested).clone()
    }
}

#[async_trait]
impl FeedSource for StaticFeed {
    async fn fetch_current_window(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<LaunchRecord>, FetchError> {
        lock(&self.requested).push(now);
        self.result.clone()
    }
}

/// Subscription source with a fixed address list.
#[derive(Debug, Clone, Default)]
pub struct StaticSubscriptions {
    addresses: Vec<String>,
    failures_left: Arc<AtomicUsize>,
}

impl StaticSubscriptions {
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            addresses: addresses.into_iter().map(Into::into).collect(),
            failures_left: Arc::default(),
        }
    }

    /// Fail the next `times` reads, then serve the list.
    pub fn failing_first(self, times: usize) -> Self {
        self.failures_left.store(times, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl SubscriptionSource for StaticSubscriptions {
    async fn current_addresses(&self) -> Result<Vec<String>, FetchError> {
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(FetchError::new("subscription list unavailable"));
        }
        Ok(self.addresses.clone())
    }
}

/// A delivery captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub recipient: String,
    pub kind: MessageKind,
}

/// Notifier that records deliveries instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    deliveries: Mutex<Vec<Delivery>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `recipient` fail.
    pub fn fail_on(self, recipient: impl Into<String>) -> Self {
        lock(&self.failing).insert(recipient.into());
        self
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        lock(&self.deliveries).clone()
    }

    /// Recipients of messages of `kind`, in send order.
    pub fn recipients_of(&self, kind: MessageKind) -> Vec<String> {
        lock(&self.deliveries)
            .iter()
            .filter(|d| d.kind == kind)
            .map(|d| d.recipient.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient: &str, message: &OutgoingMessage) -> Result<(), SendError> {
        if lock(&self.failing).contains(recipient) {
            return Err(SendError::new(format!("injected failure for {recipient}")));
        }
        lock(&self.deliveries).push(Delivery {
            recipient: recipient.to_string(),
            kind: message.kind,
        });
        Ok(())
    }
}
