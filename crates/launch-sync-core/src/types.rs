//! Core types for launch reconciliation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Stable launch identifier assigned by the feed.
///
/// The only join key between runs; every other field may change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaunchId(String);

impl LaunchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LaunchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LaunchId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for LaunchId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A scheduled launch as seen by the feed or held in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRecord {
    pub id: LaunchId,
    pub name: String,
    /// Scheduled instant ("no earlier than"), always UTC.
    pub net: DateTime<Utc>,
    /// Status label from the feed vocabulary, compared case-sensitively.
    pub status: String,
}

impl LaunchRecord {
    pub fn new(
        id: impl Into<LaunchId>,
        name: impl Into<String>,
        net: DateTime<Utc>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            net,
            status: status.into(),
        }
    }

    /// Ordering used wherever launches are listed: by instant, then name.
    pub fn schedule_cmp(&self, other: &Self) -> Ordering {
        self.net
            .cmp(&other.net)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// How a launch changed between the snapshot and the incoming set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Identifier not present in the snapshot.
    New,
    /// Scheduled instant differs. Wins over a status change.
    Rescheduled,
    /// Same instant, different status label.
    StatusChanged,
    /// Present in the snapshot, missing from the feed.
    Postponed,
}

impl ChangeKind {
    /// Order in which change groups are presented.
    pub const DISPLAY_ORDER: [ChangeKind; 4] = [
        ChangeKind::New,
        ChangeKind::Rescheduled,
        ChangeKind::StatusChanged,
        ChangeKind::Postponed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Rescheduled => "rescheduled",
            Self::StatusChanged => "status_changed",
            Self::Postponed => "postponed",
        }
    }

    /// Heading shown to subscribers for this group of changes.
    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "🆕 New Launches",
            Self::Rescheduled => "🕒 Rescheduled Launches",
            Self::StatusChanged => "❓ Updated Launch Status",
            Self::Postponed => "🚫 Postponed/Canceled Launches",
        }
    }

    fn display_rank(&self) -> usize {
        match self {
            Self::New => 0,
            Self::Rescheduled => 1,
            Self::StatusChanged => 2,
            Self::Postponed => 3,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "rescheduled" => Ok(Self::Rescheduled),
            "status_changed" => Ok(Self::StatusChanged),
            "postponed" => Ok(Self::Postponed),
            other => Err(format!("unknown change kind: {other}")),
        }
    }
}

/// A classified launch.
///
/// `record` carries the incoming values, except for `Postponed` where the
/// feed has nothing and the snapshot values are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub record: LaunchRecord,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, record: LaunchRecord) -> Self {
        Self { kind, record }
    }

    pub fn id(&self) -> &LaunchId {
        &self.record.id
    }

    /// Deterministic presentation order: kind, then instant, then name.
    pub fn display_cmp(&self, other: &Self) -> Ordering {
        self.kind
            .display_rank()
            .cmp(&other.kind.display_rank())
            .then_with(|| self.record.schedule_cmp(&other.record))
    }
}

/// A notification recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub email: String,
    /// Set on the run the address first appears, cleared once that run has routed.
    pub is_new: bool,
}

impl Subscriber {
    pub fn new(email: impl Into<String>, is_new: bool) -> Self {
        Self {
            email: email.into(),
            is_new,
        }
    }
}

/// What to do when the feed lists the same identifier more than once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Refuse the whole incoming set.
    #[default]
    Reject,
    /// Keep the last occurrence, at the position of the first.
    LastSeen,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, hour, 0, 0).unwrap()
    }

    #[test]
    fn change_kind_str_roundtrip() {
        for kind in ChangeKind::DISPLAY_ORDER {
            assert_eq!(kind.as_str().parse::<ChangeKind>().unwrap(), kind);
        }
        assert!("STATUS_CHANGE".parse::<ChangeKind>().is_err());
    }

    #[test]
    fn every_kind_has_a_distinct_label() {
        let labels: std::collections::HashSet<_> =
            ChangeKind::DISPLAY_ORDER.iter().map(|k| k.label()).collect();
        assert_eq!(labels.len(), 4);
    }

    #[test]
    fn display_cmp_orders_by_kind_then_time_then_name() {
        let mut events = vec![
            ChangeEvent::new(ChangeKind::Postponed, LaunchRecord::new("a", "A", at(1), "Go")),
            ChangeEvent::new(ChangeKind::New, LaunchRecord::new("b", "Zeta", at(5), "Go")),
            ChangeEvent::new(ChangeKind::New, LaunchRecord::new("c", "Beta", at(5), "Go")),
            ChangeEvent::new(ChangeKind::New, LaunchRecord::new("d", "Omega", at(2), "Go")),
        ];
        events.sort_by(ChangeEvent::display_cmp);

        let ids: Vec<_> = events.iter().map(|e| e.id().as_str()).collect();
        assert_eq!(ids, vec!["d", "c", "b", "a"]);
    }
}
