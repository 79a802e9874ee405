//! Change classification.
//!
//! [`classify`] diffs the incoming feed against the snapshot and produces
//! one [`ChangeEvent`] per changed identifier plus the store mutations that
//! bring the snapshot in line with the feed. It touches nothing.

use crate::types::{ChangeEvent, ChangeKind, DuplicatePolicy, LaunchId, LaunchRecord};
use crate::{SyncError, SyncResult};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// The feed's records with identifiers guaranteed unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingSet {
    records: Vec<LaunchRecord>,
}

impl IncomingSet {
    /// Build an incoming set, resolving duplicate identifiers per `policy`.
    pub fn from_records(records: Vec<LaunchRecord>, policy: DuplicatePolicy) -> SyncResult<Self> {
        let mut positions: HashMap<LaunchId, usize> = HashMap::with_capacity(records.len());
        let mut unique: Vec<LaunchRecord> = Vec::with_capacity(records.len());

        for record in records {
            match positions.get(&record.id) {
                None => {
                    positions.insert(record.id.clone(), unique.len());
                    unique.push(record);
                }
                Some(&position) => match policy {
                    DuplicatePolicy::Reject => {
                        return Err(SyncError::DuplicateLaunch(record.id));
                    }
                    DuplicatePolicy::LastSeen => {
                        warn!(launch_id = %record.id, "Duplicate launch in feed, keeping last occurrence");
                        unique[position] = record;
                    }
                },
            }
        }

        Ok(Self { records: unique })
    }

    pub fn records(&self) -> &[LaunchRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<LaunchRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &LaunchId) -> bool {
        self.records.iter().any(|r| &r.id == id)
    }
}

impl TryFrom<Vec<LaunchRecord>> for IncomingSet {
    type Error = SyncError;

    fn try_from(records: Vec<LaunchRecord>) -> Result<Self, Self::Error> {
        Self::from_records(records, DuplicatePolicy::Reject)
    }
}

/// A single store write needed to heal the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Insert(LaunchRecord),
    Update(LaunchRecord),
    Delete(LaunchId),
}

impl Mutation {
    pub fn launch_id(&self) -> &LaunchId {
        match self {
            Self::Insert(record) | Self::Update(record) => &record.id,
            Self::Delete(id) => id,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
        }
    }
}

/// Output of [`classify`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Change events: incoming order first, then postponed launches in snapshot order.
    pub events: Vec<ChangeEvent>,
    /// Launches whose only difference is the display name. Written back, never announced.
    pub refreshed: Vec<LaunchRecord>,
}

impl Classification {
    /// No events and nothing to refresh.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.refreshed.is_empty()
    }

    /// Store writes that make the snapshot equal the incoming set.
    pub fn mutations(&self) -> Vec<Mutation> {
        let mut mutations: Vec<Mutation> = self
            .events
            .iter()
            .map(|event| match event.kind {
                ChangeKind::New => Mutation::Insert(event.record.clone()),
                ChangeKind::Rescheduled | ChangeKind::StatusChanged => {
                    Mutation::Update(event.record.clone())
                }
                ChangeKind::Postponed => Mutation::Delete(event.record.id.clone()),
            })
            .collect();
        mutations.extend(self.refreshed.iter().cloned().map(Mutation::Update));
        mutations
    }

    /// Number of events of `kind`.
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }
}

/// Diff `incoming` against the `existing` snapshot.
///
/// Instant and status comparisons are exact. A launch whose instant changed
/// is `Rescheduled` even if its status changed too.
pub fn classify(incoming: &IncomingSet, existing: &[LaunchRecord]) -> Classification {
    let existing_by_id: HashMap<&LaunchId, &LaunchRecord> =
        existing.iter().map(|r| (&r.id, r)).collect();
    let mut classification = Classification::default();

    for record in incoming.records() {
        let Some(previous) = existing_by_id.get(&record.id) else {
            classification
                .events
                .push(ChangeEvent::new(ChangeKind::New, record.clone()));
            continue;
        };

        if previous.net != record.net {
            classification
                .events
                .push(ChangeEvent::new(ChangeKind::Rescheduled, record.clone()));
        } else if previous.status != record.status {
            classification
                .events
                .push(ChangeEvent::new(ChangeKind::StatusChanged, record.clone()));
        } else if previous.name != record.name {
            classification.refreshed.push(record.clone());
        }
    }

    let incoming_ids: HashSet<&LaunchId> = incoming.records().iter().map(|r| &r.id).collect();
    let mut seen: HashSet<&LaunchId> = HashSet::new();
    for previous in existing {
        if !incoming_ids.contains(&previous.id) && seen.insert(&previous.id) {
            classification
                .events
                .push(ChangeEvent::new(ChangeKind::Postponed, previous.clone()));
        }
    }

    debug!(
        incoming = incoming.len(),
        existing = existing.len(),
        events = classification.events.len(),
        refreshed = classification.refreshed.len(),
        "Classified launches"
    );

    classification
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn t(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
    }

    fn launch(id: &str, name: &str, net: DateTime<Utc>, status: &str) -> LaunchRecord {
        LaunchRecord::new(id, name, net, status)
    }

    fn incoming(records: Vec<LaunchRecord>) -> IncomingSet {
        IncomingSet::try_from(records).unwrap()
    }

    fn kinds(classification: &Classification) -> Vec<(String, ChangeKind)> {
        classification
            .events
            .iter()
            .map(|e| (e.id().to_string(), e.kind))
            .collect()
    }

    #[test]
    fn identical_sets_produce_nothing() {
        let records = vec![
            launch("1", "Alpha", t(3, 10), "Go"),
            launch("2", "Beta", t(4, 11), "TBD"),
        ];
        let classification = classify(&incoming(records.clone()), &records);

        assert!(classification.is_empty());
        assert!(classification.mutations().is_empty());
    }

    #[test]
    fn status_change_and_new_launch() {
        let existing = vec![launch("1", "Alpha", t(3, 10), "Go")];
        let feed = incoming(vec![
            launch("1", "Alpha", t(3, 10), "Scrubbed"),
            launch("2", "Beta", t(4, 12), "Go"),
        ]);

        let classification = classify(&feed, &existing);

        assert_eq!(
            kinds(&classification),
            vec![
                ("1".to_string(), ChangeKind::StatusChanged),
                ("2".to_string(), ChangeKind::New)
            ]
        );
        assert_eq!(classification.events[0].record.status, "Scrubbed");
    }

    #[test]
    fn missing_launch_is_postponed_with_snapshot_values() {
        let existing = vec![launch("1", "Alpha", t(3, 10), "Go")];
        let classification = classify(&IncomingSet::default(), &existing);

        assert_eq!(classification.events.len(), 1);
        assert_eq!(classification.events[0].kind, ChangeKind::Postponed);
        assert_eq!(classification.events[0].record, existing[0]);
        assert_eq!(
            classification.mutations(),
            vec![Mutation::Delete(LaunchId::new("1"))]
        );
    }

    #[test]
    fn reschedule_takes_precedence_over_status() {
        let existing = vec![launch("1", "Alpha", t(3, 10), "Go")];
        let feed = incoming(vec![launch("1", "Alpha", t(5, 10), "Hold")]);

        let classification = classify(&feed, &existing);

        assert_eq!(classification.events.len(), 1);
        assert_eq!(classification.events[0].kind, ChangeKind::Rescheduled);
        assert_eq!(classification.count(ChangeKind::StatusChanged), 0);
        assert_eq!(classification.events[0].record.net, t(5, 10));
    }

    #[test]
    fn status_comparison_is_case_sensitive() {
        let existing = vec![launch("1", "Alpha", t(3, 10), "Go")];
        let feed = incoming(vec![launch("1", "Alpha", t(3, 10), "GO")]);

        assert_eq!(
            classify(&feed, &existing).count(ChangeKind::StatusChanged),
            1
        );
    }

    #[test]
    fn one_second_shift_counts_as_reschedule() {
        let existing = vec![launch("1", "Alpha", t(3, 10), "Go")];
        let shifted = t(3, 10) + chrono::Duration::seconds(1);
        let feed = incoming(vec![launch("1", "Alpha", shifted, "Go")]);

        assert_eq!(classify(&feed, &existing).count(ChangeKind::Rescheduled), 1);
    }

    #[test]
    fn rename_only_is_refreshed_silently() {
        let existing = vec![launch("1", "Alpha", t(3, 10), "Go")];
        let feed = incoming(vec![launch("1", "Alpha Block 2", t(3, 10), "Go")]);

        let classification = classify(&feed, &existing);

        assert!(classification.events.is_empty());
        assert_eq!(classification.refreshed.len(), 1);
        assert_eq!(
            classification.mutations(),
            vec![Mutation::Update(launch("1", "Alpha Block 2", t(3, 10), "Go"))]
        );
    }

    #[test]
    fn every_identifier_lands_in_exactly_one_bucket() {
        let existing = vec![
            launch("same", "S", t(3, 1), "Go"),
            launch("moved", "M", t(3, 2), "Go"),
            launch("status", "St", t(3, 3), "Go"),
            launch("gone", "G", t(3, 4), "Go"),
        ];
        let feed = incoming(vec![
            launch("same", "S", t(3, 1), "Go"),
            launch("moved", "M", t(4, 2), "Go"),
            launch("status", "St", t(3, 3), "Hold"),
            launch("fresh", "F", t(3, 5), "TBD"),
        ]);

        let classification = classify(&feed, &existing);

        let mut ids: Vec<_> = classification.events.iter().map(|e| e.id().as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["fresh", "gone", "moved", "status"]);
        for kind in ChangeKind::DISPLAY_ORDER {
            assert_eq!(classification.count(kind), 1, "{kind}");
        }
    }

    #[test]
    fn mutations_follow_event_kinds() {
        let existing = vec![
            launch("1", "A", t(3, 1), "Go"),
            launch("2", "B", t(3, 2), "Go"),
        ];
        let feed = incoming(vec![
            launch("1", "A", t(3, 1), "Hold"),
            launch("3", "C", t(3, 3), "Go"),
        ]);

        let verbs: Vec<_> = classify(&feed, &existing)
            .mutations()
            .iter()
            .map(|m| (m.verb(), m.launch_id().to_string()))
            .collect();

        assert_eq!(
            verbs,
            vec![
                ("update", "1".to_string()),
                ("insert", "3".to_string()),
                ("delete", "2".to_string())
            ]
        );
    }

    #[test]
    fn reject_policy_refuses_duplicates() {
        let result = IncomingSet::from_records(
            vec![
                launch("1", "A", t(3, 1), "Go"),
                launch("1", "A", t(3, 2), "Go"),
            ],
            DuplicatePolicy::Reject,
        );

        match result {
            Err(SyncError::DuplicateLaunch(id)) => assert_eq!(id.as_str(), "1"),
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn last_seen_policy_keeps_last_value_at_first_position() {
        let set = IncomingSet::from_records(
            vec![
                launch("1", "A", t(3, 1), "Go"),
                launch("2", "B", t(3, 2), "Go"),
                launch("1", "A", t(3, 9), "Hold"),
            ],
            DuplicatePolicy::LastSeen,
        )
        .unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.records()[0], launch("1", "A", t(3, 9), "Hold"));
        assert_eq!(set.records()[1].id.as_str(), "2");
    }
}
