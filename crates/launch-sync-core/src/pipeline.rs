//! One reconciliation run, start to finish.
//!
//! ```text
//! fetch ─▶ dedupe ─▶ read snapshot ─▶ read addresses ─▶ reconcile ─▶ list subscribers
//!                                                                          │
//!                clear new flags ◀── deliver ◀── route ◀── synchronize ◀───┘
//! ```
//!
//! Only reads can abort the run, and all of them happen before the first
//! launch write. From there on every failure is collected in the
//! [`RunReport`].

use crate::classifier::{classify, IncomingSet};
use crate::router::{AudienceRouter, MessageKind, OutgoingMessage};
use crate::synchronizer::{MutationFailure, Synchronizer};
use crate::traits::{FeedSource, LaunchStore, Notifier, SubscriberStore, SubscriptionSource};
use crate::types::{ChangeEvent, DuplicatePolicy};
use crate::{SendError, StoreError, SyncError, SyncResult};
use chrono::{DateTime, Datelike, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Whether a run writes anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Mutate the store, reconcile subscribers, send.
    #[default]
    Live,
    /// Classify and route against current state; write nothing.
    DryRun,
}

/// A recipient that did not get its message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub recipient: String,
    pub kind: MessageKind,
    pub error: SendError,
}

/// What a run did.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub events: Vec<ChangeEvent>,
    pub store_failures: Vec<MutationFailure>,
    pub delivered: usize,
    pub delivery_failures: Vec<DeliveryFailure>,
    pub subscribers_added: usize,
    pub subscribers_removed: usize,
    /// Reconciliation failed; the run routed to the table as it was.
    pub subscriber_failure: Option<StoreError>,
    /// Messages routed this run, by kind.
    pub messages: Vec<MessageKind>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.store_failures.is_empty()
            && self.delivery_failures.is_empty()
            && self.subscriber_failure.is_none()
    }
}

/// Everything a run needs, injected at construction.
#[derive(Clone)]
pub struct RunContext {
    pub feed: Arc<dyn FeedSource>,
    pub launches: Arc<dyn LaunchStore>,
    pub subscribers: Arc<dyn SubscriberStore>,
    pub subscriptions: Arc<dyn SubscriptionSource>,
    pub notifier: Arc<dyn Notifier>,
    pub router: AudienceRouter,
    pub duplicate_policy: DuplicatePolicy,
}

impl RunContext {
    /// Run one reconciliation as of `now`.
    ///
    /// The feed window and the router's weekday both come from this one
    /// instant.
    pub async fn run_once(&self, now: DateTime<Utc>, mode: RunMode) -> SyncResult<RunReport> {
        let today = now.weekday();
        info!(?mode, %now, %today, "Starting launch reconciliation");

        let fetched = self.feed.fetch_current_window(now).await.map_err(|e| {
            error!(error = %e, "Feed fetch failed, aborting run");
            SyncError::from(e)
        })?;
        let incoming = IncomingSet::from_records(fetched, self.duplicate_policy)?;
        let existing = self
            .launches
            .read_all()
            .await
            .map_err(SyncError::Snapshot)?;
        info!(incoming = incoming.len(), existing = existing.len(), "Loaded launch sets");

        let mut report = RunReport::default();

        // Every abort below comes before the first launch write, so a failed
        // run leaves the baseline for the next one to diff against.
        if mode == RunMode::Live {
            let addresses = self
                .subscriptions
                .current_addresses()
                .await
                .map_err(|e| {
                    error!(error = %e, "Subscription list unavailable, aborting run");
                    SyncError::SubscriptionList(e)
                })?;
            match self.subscribers.reconcile_subscribers(&addresses).await {
                Ok(delta) => {
                    report.subscribers_added = delta.added;
                    report.subscribers_removed = delta.removed;
                }
                Err(e) => {
                    warn!(error = %e, "Subscriber reconciliation failed, routing to stored subscribers");
                    report.subscriber_failure = Some(e);
                }
            }
        }
        let subscribers = self
            .subscribers
            .list_subscribers()
            .await
            .map_err(SyncError::Subscribers)?;

        match mode {
            RunMode::Live => {
                let outcome = Synchronizer::new(self.launches.clone())
                    .synchronize(&incoming, &existing)
                    .await;
                report.events = outcome.events;
                report.store_failures = outcome.failures;
            }
            RunMode::DryRun => {
                report.events = classify(&incoming, &existing).events;
            }
        }

        let plan = self
            .router
            .route(&report.events, incoming.records(), &subscribers, today);

        for message in plan.messages() {
            report.messages.push(message.kind);
            self.deliver(message, &mut report).await;
        }

        if mode == RunMode::Live {
            match self.subscribers.mark_all_existing().await {
                Ok(cleared) => info!(cleared, "Cleared new-subscriber flags"),
                // Flags stay set; the next run welcomes these addresses again.
                Err(e) => warn!(error = %e, "Failed to clear new-subscriber flags"),
            }
        }

        info!(
            events = report.events.len(),
            store_failures = report.store_failures.len(),
            subscriber_failure = report.subscriber_failure.is_some(),
            delivered = report.delivered,
            delivery_failures = report.delivery_failures.len(),
            "Launch reconciliation finished"
        );
        Ok(report)
    }

    async fn deliver(&self, message: &OutgoingMessage, report: &mut RunReport) {
        for recipient in &message.recipients {
            match self.notifier.send(recipient, message).await {
                Ok(()) => report.delivered += 1,
                Err(error) => {
                    warn!(recipient = %recipient, kind = message.kind.as_str(), error = %error, "Delivery failed, continuing");
                    report.delivery_failures.push(DeliveryFailure {
                        recipient: recipient.clone(),
                        kind: message.kind,
                        error,
                    });
                }
            }
        }
    }
}
