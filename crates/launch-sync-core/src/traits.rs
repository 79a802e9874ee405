//! Collaborator seams.
//!
//! The core never talks to HTTP, SQLite or a mail server directly. Each of
//! those sits behind one of these traits and is injected into a
//! [`RunContext`](crate::RunContext) at construction.

use crate::router::OutgoingMessage;
use crate::types::{LaunchId, LaunchRecord, Subscriber};
use crate::{FetchError, SendError, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Supplies the full record set for the window that follows `now`.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_current_window(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<LaunchRecord>, FetchError>;
}

/// The persisted launch snapshot.
///
/// Every write is independent: a failed insert for one launch must not
/// affect writes for any other.
#[async_trait]
pub trait LaunchStore: Send + Sync {
    /// Every stored launch.
    async fn read_all(&self) -> Result<Vec<LaunchRecord>, StoreError>;

    /// Insert a launch that is not stored yet.
    async fn insert(&self, record: &LaunchRecord) -> Result<(), StoreError>;

    /// Overwrite name, instant and status of a stored launch.
    async fn update(&self, record: &LaunchRecord) -> Result<(), StoreError>;

    /// Remove a stored launch.
    async fn delete(&self, id: &LaunchId) -> Result<(), StoreError>;
}

/// Counts from a subscriber reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscriberDelta {
    pub added: usize,
    pub removed: usize,
}

/// The persisted subscriber table.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    async fn list_subscribers(&self) -> Result<Vec<Subscriber>, StoreError>;

    /// Hard-sync the table to `addresses`: unseen addresses are inserted with
    /// `is_new = true`, addresses not listed are deleted, the rest keep their flag.
    async fn reconcile_subscribers(&self, addresses: &[String])
        -> Result<SubscriberDelta, StoreError>;

    /// Clear every `is_new` flag. Returns how many flags were cleared.
    async fn mark_all_existing(&self) -> Result<usize, StoreError>;
}

/// Source of truth for who should be subscribed.
#[async_trait]
pub trait SubscriptionSource: Send + Sync {
    async fn current_addresses(&self) -> Result<Vec<String>, FetchError>;
}

/// Renders and transmits a routed message to a single recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: &str, message: &OutgoingMessage) -> Result<(), SendError>;
}
