//! Append-only event log for interactions and engagement samples
//!
//! Exclusively owns Event and EngagementSample storage. Rolling-window
//! consumers (governor, metrics, advisor) read it; only ingestion appends.

use super::types::{EngagementSample, InteractionEvent, InteractionKind};
use std::collections::HashSet;

/// Rejected at the ingestion boundary; never affects existing state
#[derive(Debug)]
pub enum InvalidEvent {
    FutureTimestamp { timestamp: i64, now: i64 },
    MalformedRecord(String),
}

impl std::fmt::Display for InvalidEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidEvent::FutureTimestamp { timestamp, now } => {
                write!(f, "event timestamp {} is in the future (now: {})", timestamp, now)
            }
            InvalidEvent::MalformedRecord(detail) => write!(f, "malformed record: {}", detail),
        }
    }
}

impl std::error::Error for InvalidEvent {}

/// Append-only store, ordered by timestamp ascending
///
/// Events older than the retention window are evicted on append (amortized:
/// the scan only runs when the oldest entry has actually expired).
pub struct EventLog {
    events: Vec<InteractionEvent>,
    seen_ids: HashSet<String>,
    samples: Vec<EngagementSample>,
    seen_sample_timestamps: HashSet<i64>,
    event_retention_secs: i64,
    sample_retention_secs: i64,
}

impl EventLog {
    pub fn new(event_retention_secs: i64, sample_retention_secs: i64) -> Self {
        Self {
            events: Vec::new(),
            seen_ids: HashSet::new(),
            samples: Vec::new(),
            seen_sample_timestamps: HashSet::new(),
            event_retention_secs,
            sample_retention_secs,
        }
    }

    /// Append an interaction event
    ///
    /// Returns `Ok(false)` for a duplicate id (idempotent no-op). Fails only
    /// on future-dated timestamps; volume never causes rejection.
    pub fn append(&mut self, event: InteractionEvent, now: i64) -> Result<bool, InvalidEvent> {
        if event.timestamp > now {
            return Err(InvalidEvent::FutureTimestamp {
                timestamp: event.timestamp,
                now,
            });
        }
        if self.seen_ids.contains(&event.id) {
            return Ok(false);
        }

        self.seen_ids.insert(event.id.clone());
        let at = self
            .events
            .partition_point(|e| e.timestamp <= event.timestamp);
        self.events.insert(at, event);

        self.evict_expired(now);
        Ok(true)
    }

    /// Record an engagement sample, idempotent on timestamp
    pub fn add_sample(&mut self, sample: EngagementSample, now: i64) -> Result<bool, InvalidEvent> {
        if sample.timestamp > now {
            return Err(InvalidEvent::FutureTimestamp {
                timestamp: sample.timestamp,
                now,
            });
        }
        if self.seen_sample_timestamps.contains(&sample.timestamp) {
            return Ok(false);
        }

        self.seen_sample_timestamps.insert(sample.timestamp);
        let at = self
            .samples
            .partition_point(|s| s.timestamp <= sample.timestamp);
        self.samples.insert(at, sample);

        self.evict_expired(now);
        Ok(true)
    }

    /// Lazy, restartable iterator over events at or after `since`, ordered by
    /// timestamp ascending, optionally filtered by kind
    pub fn interactions(
        &self,
        kind: Option<InteractionKind>,
        since: i64,
    ) -> impl Iterator<Item = &InteractionEvent> + '_ {
        let start = self.events.partition_point(|e| e.timestamp < since);
        self.events[start..]
            .iter()
            .filter(move |e| kind.map_or(true, |k| e.kind == k))
    }

    /// Count events of `kind` with timestamp in `(after, until]`
    ///
    /// The half-open bound is the rolling-window contract: "last hour" at
    /// time t means `(t - 1h, t]`.
    pub fn count_between(&self, kind: InteractionKind, after: i64, until: i64) -> u32 {
        self.slice_between(after, until)
            .iter()
            .filter(|e| e.kind == kind)
            .count() as u32
    }

    /// Count events of any of `kinds` with timestamp in `(after, until]`
    pub fn count_between_any(
        &self,
        kinds: &[InteractionKind],
        after: i64,
        until: i64,
    ) -> u32 {
        self.slice_between(after, until)
            .iter()
            .filter(|e| kinds.contains(&e.kind))
            .count() as u32
    }

    fn slice_between(&self, after: i64, until: i64) -> &[InteractionEvent] {
        let lo = self.events.partition_point(|e| e.timestamp <= after);
        let hi = self.events.partition_point(|e| e.timestamp <= until);
        &self.events[lo..hi]
    }

    /// Timestamp of the most recent story at or before `until`
    pub fn last_story_before(&self, until: i64) -> Option<i64> {
        let hi = self.events.partition_point(|e| e.timestamp <= until);
        self.events[..hi]
            .iter()
            .rev()
            .find(|e| e.kind == InteractionKind::Story)
            .map(|e| e.timestamp)
    }

    /// All retained samples, timestamp ascending
    pub fn samples(&self) -> &[EngagementSample] {
        &self.samples
    }

    /// All retained events, timestamp ascending
    pub fn events(&self) -> &[InteractionEvent] {
        &self.events
    }

    /// Most recent sample at or before `now`
    pub fn latest_sample_at(&self, now: i64) -> Option<&EngagementSample> {
        let hi = self.samples.partition_point(|s| s.timestamp <= now);
        self.samples[..hi].last()
    }

    fn evict_expired(&mut self, now: i64) {
        let event_cutoff = now - self.event_retention_secs;
        if self.events.first().map_or(false, |e| e.timestamp < event_cutoff) {
            let split = self.events.partition_point(|e| e.timestamp < event_cutoff);
            for evicted in self.events.drain(..split) {
                self.seen_ids.remove(&evicted.id);
            }
        }

        let sample_cutoff = now - self.sample_retention_secs;
        if self.samples.first().map_or(false, |s| s.timestamp < sample_cutoff) {
            let split = self.samples.partition_point(|s| s.timestamp < sample_cutoff);
            for evicted in self.samples.drain(..split) {
                self.seen_sample_timestamps.remove(&evicted.timestamp);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_event(id: &str, kind: InteractionKind, timestamp: i64) -> InteractionEvent {
        InteractionEvent {
            id: id.to_string(),
            kind,
            timestamp,
            actor: "growth_account".to_string(),
        }
    }

    fn make_sample(timestamp: i64, followers: u64) -> EngagementSample {
        EngagementSample {
            timestamp,
            follower_count: followers,
            impressions: 500,
            engagement_rate: 4.2,
        }
    }

    #[test]
    fn test_duplicate_id_is_noop() {
        let mut log = EventLog::new(7 * 86_400, 28 * 86_400);
        let now = 100_000;

        assert!(log.append(make_event("e1", InteractionKind::Like, 1000), now).unwrap());
        assert!(!log.append(make_event("e1", InteractionKind::Like, 1000), now).unwrap());

        assert_eq!(log.events().len(), 1);
    }

    #[test]
    fn test_future_timestamp_rejected() {
        let mut log = EventLog::new(7 * 86_400, 28 * 86_400);
        let now = 1000;

        let result = log.append(make_event("e1", InteractionKind::Like, 2000), now);
        assert!(matches!(result, Err(InvalidEvent::FutureTimestamp { .. })));
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_out_of_order_append_keeps_ascending_order() {
        let mut log = EventLog::new(7 * 86_400, 28 * 86_400);
        let now = 100_000;

        log.append(make_event("e2", InteractionKind::Like, 2000), now).unwrap();
        log.append(make_event("e1", InteractionKind::Like, 1000), now).unwrap();
        log.append(make_event("e3", InteractionKind::Comment, 1500), now).unwrap();

        let timestamps: Vec<i64> = log.interactions(None, 0).map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![1000, 1500, 2000]);
    }

    #[test]
    fn test_query_filters_kind_and_since() {
        let mut log = EventLog::new(7 * 86_400, 28 * 86_400);
        let now = 100_000;

        log.append(make_event("e1", InteractionKind::Like, 1000), now).unwrap();
        log.append(make_event("e2", InteractionKind::Comment, 2000), now).unwrap();
        log.append(make_event("e3", InteractionKind::Like, 3000), now).unwrap();

        let likes: Vec<&InteractionEvent> = log
            .interactions(Some(InteractionKind::Like), 2000)
            .collect();
        assert_eq!(likes.len(), 1);
        assert_eq!(likes[0].id, "e3");

        // Restartable: a second pass yields the same sequence
        let again: Vec<&InteractionEvent> = log
            .interactions(Some(InteractionKind::Like), 2000)
            .collect();
        assert_eq!(again.len(), 1);
    }

    #[test]
    fn test_count_between_is_half_open() {
        let mut log = EventLog::new(7 * 86_400, 28 * 86_400);
        let now = 100_000;

        log.append(make_event("e1", InteractionKind::Like, 1000), now).unwrap();
        log.append(make_event("e2", InteractionKind::Like, 2000), now).unwrap();

        // (1000, 2000]: excludes the event at 1000, includes the one at 2000
        assert_eq!(log.count_between(InteractionKind::Like, 1000, 2000), 1);
        assert_eq!(log.count_between(InteractionKind::Like, 999, 2000), 2);
        assert_eq!(log.count_between(InteractionKind::Like, 2000, 3000), 0);
    }

    #[test]
    fn test_eviction_honors_retention() {
        let mut log = EventLog::new(86_400, 28 * 86_400);
        let day = 86_400;

        log.append(make_event("old", InteractionKind::Like, 1000), 2000).unwrap();
        // Appending two days later evicts the first event
        log.append(make_event("new", InteractionKind::Like, 2 * day + 500), 2 * day + 500)
            .unwrap();

        assert_eq!(log.events().len(), 1);
        assert_eq!(log.events()[0].id, "new");

        // The evicted id is forgotten, so a very old duplicate is evicted
        // again rather than accumulating
        log.append(make_event("old", InteractionKind::Like, 1000), 2 * day + 600).unwrap();
        assert_eq!(log.events().len(), 1);
    }

    #[test]
    fn test_sample_idempotent_on_timestamp() {
        let mut log = EventLog::new(7 * 86_400, 28 * 86_400);
        let now = 100_000;

        assert!(log.add_sample(make_sample(5000, 1200), now).unwrap());
        assert!(!log.add_sample(make_sample(5000, 9999), now).unwrap());

        assert_eq!(log.samples().len(), 1);
        assert_eq!(log.samples()[0].follower_count, 1200);
    }

    #[test]
    fn test_last_story_before() {
        let mut log = EventLog::new(7 * 86_400, 28 * 86_400);
        let now = 100_000;

        log.append(make_event("s1", InteractionKind::Story, 1000), now).unwrap();
        log.append(make_event("l1", InteractionKind::Like, 2000), now).unwrap();
        log.append(make_event("s2", InteractionKind::Story, 3000), now).unwrap();

        assert_eq!(log.last_story_before(2500), Some(1000));
        assert_eq!(log.last_story_before(3000), Some(3000));
        assert_eq!(log.last_story_before(500), None);
    }

    #[test]
    fn test_latest_sample_at() {
        let mut log = EventLog::new(7 * 86_400, 28 * 86_400);
        let now = 100_000;

        log.add_sample(make_sample(1000, 1100), now).unwrap();
        log.add_sample(make_sample(2000, 1150), now).unwrap();

        assert_eq!(log.latest_sample_at(1500).unwrap().follower_count, 1100);
        assert_eq!(log.latest_sample_at(2000).unwrap().follower_count, 1150);
        assert!(log.latest_sample_at(500).is_none());
    }
}
