//! Audience routing.
//!
//! Decides which subscribers get which summary:
//!
//! | Situation                  | Existing subscribers | New subscribers |
//! |----------------------------|----------------------|-----------------|
//! | broadcast day              | broadcast            | broadcast       |
//! | changes detected           | update (the diff)    | welcome         |
//! | nothing changed            | -                    | welcome         |
//!
//! New subscribers never get the diff: they were not on the previous baseline.

use crate::types::{ChangeEvent, LaunchRecord, Subscriber};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which of the three messages this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Change summary for existing subscribers.
    Update,
    /// Full window for subscribers added this run.
    Welcome,
    /// Full window for everyone on the broadcast day.
    Broadcast,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Welcome => "welcome",
            Self::Broadcast => "broadcast",
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            Self::Update => "Rocket Launch Updates For Next Week",
            Self::Welcome => "Welcome! Upcoming Rocket Launches",
            Self::Broadcast => "Upcoming Rocket Launches",
        }
    }
}

/// Content handed to the notifier; rendering is the notifier's business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Changes(Vec<ChangeEvent>),
    Window(Vec<LaunchRecord>),
}

/// One routed message and its recipients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub kind: MessageKind,
    pub recipients: Vec<String>,
    pub body: MessageBody,
}

impl OutgoingMessage {
    pub fn subject(&self) -> &'static str {
        self.kind.subject()
    }
}

/// Output of [`AudienceRouter::route`]. Each slot is `None` when nobody should get it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingPlan {
    pub update: Option<OutgoingMessage>,
    pub welcome: Option<OutgoingMessage>,
    pub broadcast: Option<OutgoingMessage>,
}

impl RoutingPlan {
    pub fn messages(&self) -> impl Iterator<Item = &OutgoingMessage> {
        self.broadcast
            .iter()
            .chain(self.update.iter())
            .chain(self.welcome.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.messages().next().is_none()
    }
}

/// Routes change events and the incoming window to subscriber audiences.
#[derive(Debug, Clone, Copy)]
pub struct AudienceRouter {
    broadcast_day: Weekday,
}

impl AudienceRouter {
    pub fn new(broadcast_day: Weekday) -> Self {
        Self { broadcast_day }
    }

    pub fn broadcast_day(&self) -> Weekday {
        self.broadcast_day
    }

    /// Build the routing plan for a run happening on `today`.
    pub fn route(
        &self,
        events: &[ChangeEvent],
        incoming: &[LaunchRecord],
        subscribers: &[Subscriber],
        today: Weekday,
    ) -> RoutingPlan {
        let mut plan = RoutingPlan::default();
        if subscribers.is_empty() {
            return plan;
        }

        if today == self.broadcast_day {
            debug!(recipients = subscribers.len(), "Broadcast day, skipping change routing");
            plan.broadcast = Some(OutgoingMessage {
                kind: MessageKind::Broadcast,
                recipients: subscribers.iter().map(|s| s.email.clone()).collect(),
                body: MessageBody::Window(sorted_window(incoming)),
            });
            return plan;
        }

        let (new, existing): (Vec<&Subscriber>, Vec<&Subscriber>) =
            subscribers.iter().partition(|s| s.is_new);

        if !events.is_empty() && !existing.is_empty() {
            let mut changes = events.to_vec();
            changes.sort_by(ChangeEvent::display_cmp);
            plan.update = Some(OutgoingMessage {
                kind: MessageKind::Update,
                recipients: existing.iter().map(|s| s.email.clone()).collect(),
                body: MessageBody::Changes(changes),
            });
        }

        if !new.is_empty() {
            plan.welcome = Some(OutgoingMessage {
                kind: MessageKind::Welcome,
                recipients: new.iter().map(|s| s.email.clone()).collect(),
                body: MessageBody::Window(sorted_window(incoming)),
            });
        }

        debug!(
            new = new.len(),
            existing = existing.len(),
            update = plan.update.is_some(),
            welcome = plan.welcome.is_some(),
            "Routed audiences"
        );
        plan
    }
}

fn sorted_window(incoming: &[LaunchRecord]) -> Vec<LaunchRecord> {
    let mut window = incoming.to_vec();
    window.sort_by(LaunchRecord::schedule_cmp);
    window
}
