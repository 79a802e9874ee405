//! # Launch Sync Core
//!
//! Reconciles the upcoming-launch feed against the persisted snapshot,
//! classifies what changed, and decides who hears about it.
//!
//! ## Principles
//!
//! - **Classification is pure** - [`classify`] reads two sets and writes nothing
//! - **One event per identifier** - each launch id yields at most one [`ChangeEvent`] per run
//! - **The store heals itself** - after a clean run the snapshot equals the incoming set
//! - **Partial progress beats no progress** - a failed record or recipient is reported, never fatal
//! - **Only a feed failure halts a run** - nothing is mutated when the feed cannot be read
//!
//! ## Architecture
//!
//! ```text
//! FeedSource ──▶ IncomingSet ──▶ classify ◀── LaunchStore::read_all
//!                                   │
//!                     ┌─────────────┴─────────────┐
//!                     ▼                           ▼
//!               Synchronizer                AudienceRouter ◀── SubscriberStore
//!             (insert/update/delete)              │
//!                                                 ▼
//!                                              Notifier
//! ```
//!
//! ## Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use launch_sync_core::{classify, ChangeKind, IncomingSet, LaunchRecord};
//!
//! let t0 = Utc.with_ymd_and_hms(2025, 3, 3, 14, 0, 0).unwrap();
//! let existing = vec![LaunchRecord::new("1", "Alpha", t0, "Go")];
//! let incoming = IncomingSet::try_from(vec![
//!     LaunchRecord::new("1", "Alpha", t0, "Scrubbed"),
//!     LaunchRecord::new("2", "Beta", t0, "Go"),
//! ])
//! .unwrap();
//!
//! let classification = classify(&incoming, &existing);
//! let kinds: Vec<_> = classification.events.iter().map(|e| e.kind).collect();
//! assert_eq!(kinds, vec![ChangeKind::StatusChanged, ChangeKind::New]);
//! ```
//!
//! ## Crate Structure
//!
//! - [`types`] - launch records, change events, subscribers
//! - [`classifier`] - incoming set construction and the pure diff
//! - [`synchronizer`] - applies a classification to a [`LaunchStore`]
//! - [`router`] - splits recipients into update/welcome/broadcast audiences
//! - [`traits`] - collaborator seams (feed, stores, notifier)
//! - [`memory`] - in-memory collaborators for tests and dry runs
//! - [`pipeline`] - one run, start to finish

pub mod classifier;
mod error;
pub mod memory;
pub mod pipeline;
pub mod router;
pub mod synchronizer;
pub mod traits;
pub mod types;

pub use classifier::{classify, Classification, IncomingSet, Mutation};
pub use error::{FetchError, SendError, StoreError, SyncError, SyncResult};
pub use pipeline::{DeliveryFailure, RunContext, RunMode, RunReport};
pub use router::{AudienceRouter, MessageBody, MessageKind, OutgoingMessage, RoutingPlan};
pub use synchronizer::{MutationFailure, SyncOutcome, Synchronizer};
pub use traits::{
    FeedSource, LaunchStore, Notifier, SubscriberDelta, SubscriberStore, SubscriptionSource,
};
pub use types::{ChangeEvent, ChangeKind, DuplicatePolicy, LaunchId, LaunchRecord, Subscriber};
