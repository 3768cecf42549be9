// ── Alarm deduplicator ──
//
// Accumulated alarms keyed by identity, in arrival order. Every operation
// returns a new set so a published snapshot is never mutated in place.
//
// Dismissed ids are remembered until they fall behind the alarm window:
// the look-back overlap re-fetches recent alerts and a dismissed alarm must
// not come back on the next tick.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::model::{Alarm, AlarmId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlarmSet {
    alarms: IndexMap<AlarmId, Alarm>,
    dismissed: IndexMap<AlarmId, DateTime<Utc>>,
}

impl AlarmSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append alarms whose identity is not present yet, duplicates within
    /// `incoming` included. Existing order is kept.
    pub fn ingest(&self, incoming: impl IntoIterator<Item = Alarm>) -> AlarmSet {
        let mut next = self.clone();
        for alarm in incoming {
            if next.dismissed.contains_key(&alarm.id) {
                continue;
            }
            next.alarms.entry(alarm.id.clone()).or_insert(alarm);
        }
        next
    }

    /// Set without `id`. Unknown ids leave the set unchanged.
    pub fn dismiss(&self, id: &AlarmId) -> AlarmSet {
        let mut next = self.clone();
        if let Some(alarm) = next.alarms.shift_remove(id) {
            next.dismissed.insert(alarm.id, alarm.timestamp);
        }
        next
    }

    /// Forget dismissals of alarms older than `before`; they can no longer
    /// be re-fetched.
    pub fn prune_dismissed(&self, before: DateTime<Utc>) -> AlarmSet {
        let mut next = self.clone();
        next.dismissed.retain(|_, timestamp| *timestamp >= before);
        next
    }

    pub fn get(&self, id: &AlarmId) -> Option<&Alarm> {
        self.alarms.get(id)
    }

    pub fn contains(&self, id: &AlarmId) -> bool {
        self.alarms.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    /// Alarms in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Alarm> {
        self.alarms.values()
    }

    /// Alarms newest first, the order operators read them in.
    pub fn newest_first(&self) -> Vec<&Alarm> {
        let mut alarms: Vec<_> = self.alarms.values().collect();
        alarms.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        alarms
    }
}

impl Serialize for AlarmSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.alarms.values())
    }
}

impl FromIterator<Alarm> for AlarmSet {
    fn from_iter<I: IntoIterator<Item = Alarm>>(iter: I) -> Self {
        AlarmSet::new().ingest(iter)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{Coordinates, UnitId};

    fn alarm(device: u64, secs: i64) -> Alarm {
        let timestamp = DateTime::from_timestamp(secs, 0).unwrap();
        Alarm {
            id: AlarmId::new(UnitId(device), timestamp),
            device_id: UnitId(device),
            timestamp,
            alarm_type: "Overspeed".into(),
            message: format!("alarm {device}/{secs}"),
            location: Coordinates { lat: 0.0, lng: 0.0 },
            source_id: None,
        }
    }

    fn ids(set: &AlarmSet) -> Vec<&str> {
        set.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn duplicates_within_one_batch_collapse() {
        let set = AlarmSet::new().ingest([alarm(7, 100), alarm(7, 100)]);
        assert_eq!(ids(&set), vec!["7-100"]);
    }

    #[test]
    fn ingest_is_idempotent() {
        let batch = vec![alarm(1, 10), alarm(2, 20)];
        let once = AlarmSet::new().ingest(batch.clone());
        let twice = once.ingest(batch);
        assert_eq!(once, twice);
    }

    #[test]
    fn ingest_keeps_first_copy_and_order() {
        let mut first = alarm(1, 10);
        first.message = "first".into();
        let mut replay = alarm(1, 10);
        replay.message = "replay".into();

        let set = AlarmSet::new()
            .ingest([first, alarm(2, 20)])
            .ingest([alarm(3, 5), replay]);

        assert_eq!(ids(&set), vec!["1-10", "2-20", "3-5"]);
        assert_eq!(set.get(&AlarmId::from("1-10")).unwrap().message, "first");
    }

    #[test]
    fn dismiss_removes_only_target() {
        let set: AlarmSet = [alarm(1, 10), alarm(2, 20)].into_iter().collect();
        let after = set.dismiss(&AlarmId::from("1-10"));

        assert_eq!(ids(&after), vec!["2-20"]);
        assert_eq!(set.len(), 2, "original snapshot untouched");
    }

    #[test]
    fn dismissed_alarm_is_not_refetched() {
        let set = AlarmSet::new()
            .ingest([alarm(1, 10)])
            .dismiss(&AlarmId::from("1-10"))
            .ingest([alarm(1, 10)]);
        assert!(set.is_empty());
    }

    #[test]
    fn pruned_dismissal_no_longer_blocks() {
        let cutoff = DateTime::from_timestamp(60, 0).unwrap();
        let set = AlarmSet::new()
            .ingest([alarm(1, 10)])
            .dismiss(&AlarmId::from("1-10"))
            .prune_dismissed(cutoff)
            .ingest([alarm(1, 10)]);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn newest_first_sorts_by_timestamp() {
        let set = AlarmSet::new().ingest([alarm(1, 10), alarm(2, 30), alarm(3, 20)]);
        let order: Vec<_> = set.newest_first().into_iter().map(|a| a.id.as_str()).collect();
        assert_eq!(order, vec!["2-30", "3-20", "1-10"]);
    }
}
