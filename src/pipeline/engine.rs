//! Growth engine: orchestration layer over log, governor, advisor and alerts
//!
//! Owns the event log and every component state with a single writer each:
//! the governor classifies against the log, the advisor owns the recommended
//! window set, the emitter owns the alert list. Shared across tasks as
//! `Arc<Mutex<GrowthEngine>>`; holding the lock across
//! classify-then-append in `commit_interaction` is what serializes the one
//! correctness-critical section (two concurrent commits for the same kind
//! can never both observe counts below the ceiling).

use super::advisor::ScheduleAdvisor;
use super::alerts::AlertEmitter;
use super::config::CoreConfig;
use super::event_log::{EventLog, InvalidEvent};
use super::governor::RateGovernor;
use super::metrics::{InsufficientData, MetricsAggregator};
use super::playbook::{self, HashtagGroup};
use super::types::{
    Alert, EngagementSample, HeadlineMetrics, InteractionEvent, InteractionKind, RateDecision,
    RateWindowSnapshot, RecommendedWindow,
};
use chrono::Weekday;

pub struct GrowthEngine {
    log: EventLog,
    governor: RateGovernor,
    advisor: ScheduleAdvisor,
    emitter: AlertEmitter,
    aggregator: MetricsAggregator,
    windows: Vec<RecommendedWindow>,
    config: CoreConfig,
}

impl GrowthEngine {
    /// Build an engine from a validated configuration
    pub fn new(config: CoreConfig) -> Self {
        Self {
            log: EventLog::new(config.event_retention_secs, config.sample_retention_secs),
            governor: RateGovernor::new(config.clone()),
            advisor: ScheduleAdvisor::new(&config),
            emitter: AlertEmitter::new(config.alert_cooldown_secs, config.max_alerts),
            aggregator: MetricsAggregator::new(config.metrics_trailing_secs),
            windows: Vec::new(),
            config,
        }
    }

    /// Ingest an externally-observed interaction event
    ///
    /// Idempotent on the event id; a duplicate is a no-op, not an error.
    pub fn ingest_event(
        &mut self,
        event: InteractionEvent,
        now: i64,
    ) -> Result<bool, InvalidEvent> {
        self.log.append(event, now)
    }

    /// Ingest an engagement sample, alerting on follower milestones
    pub fn ingest_sample(
        &mut self,
        sample: EngagementSample,
        now: i64,
    ) -> Result<bool, InvalidEvent> {
        let previous = self.log.latest_sample_at(now).map(|s| s.follower_count);
        let current = sample.follower_count;

        let added = self.log.add_sample(sample, now)?;
        if added {
            self.emitter.observe_follower_count(
                previous,
                current,
                self.config.milestone_step,
                now,
            );
        }
        Ok(added)
    }

    /// Classify a prospective interaction and, unless blocked, commit it
    ///
    /// This is the serialized check-then-act path: callers must reach it
    /// through the engine lock. The event is appended on `Allowed` and
    /// `Warn`, never on `Blocked`. The decision also feeds the alert
    /// emitter.
    pub fn commit_interaction(
        &mut self,
        kind: InteractionKind,
        id: &str,
        actor: &str,
        proposed_ts: i64,
        now: i64,
    ) -> Result<RateDecision, InvalidEvent> {
        if proposed_ts > now {
            return Err(InvalidEvent::FutureTimestamp {
                timestamp: proposed_ts,
                now,
            });
        }

        let decision = self.governor.classify(&self.log, kind, proposed_ts);
        self.emitter.observe_decision(kind, &decision, now);

        if !decision.is_blocked() {
            self.log.append(
                InteractionEvent {
                    id: id.to_string(),
                    kind,
                    timestamp: proposed_ts,
                    actor: actor.to_string(),
                },
                now,
            )?;
        }

        Ok(decision)
    }

    /// Recompute recommended windows from the full sample history
    ///
    /// The advisor computes into a fresh set which is swapped in whole; an
    /// interrupted refresh leaves the previous valid set untouched. Newly
    /// imminent windows produce info alerts.
    pub fn refresh_schedule(&mut self, now: i64) {
        let fresh = self.advisor.recompute(self.log.samples());
        self.windows = fresh;
        self.emitter.observe_windows(
            &self.windows,
            now,
            self.config.alert_lead_secs,
            self.config.utc_offset_secs,
        );
    }

    // Read-only presentation queries

    pub fn get_metrics(&self, now: i64) -> Result<HeadlineMetrics, InsufficientData> {
        self.aggregator.compute(&self.log, now)
    }

    pub fn get_alerts(&self, limit: usize) -> Vec<Alert> {
        self.emitter.recent(limit)
    }

    pub fn get_recommended_windows(&self, weekday: Weekday) -> Vec<RecommendedWindow> {
        self.windows
            .iter()
            .filter(|w| w.weekday == weekday)
            .cloned()
            .collect()
    }

    pub fn all_recommended_windows(&self) -> &[RecommendedWindow] {
        &self.windows
    }

    pub fn get_rate_status(&self, kind: InteractionKind, now: i64) -> Vec<RateWindowSnapshot> {
        self.governor.rate_status(&self.log, kind, now)
    }

    pub fn get_content_plan(&self, weekday: Weekday) -> &'static [&'static str] {
        playbook::content_plan(weekday)
    }

    pub fn hashtag_groups(&self) -> [HashtagGroup; 4] {
        playbook::hashtag_groups()
    }

    /// Clone of the retained log for snapshot persistence
    pub fn snapshot(&self) -> (Vec<InteractionEvent>, Vec<EngagementSample>) {
        (self.log.events().to_vec(), self.log.samples().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::AlertKind;

    fn engine() -> GrowthEngine {
        let config = CoreConfig::default();
        config.validate().unwrap();
        GrowthEngine::new(config)
    }

    fn sample(ts: i64, followers: u64) -> EngagementSample {
        EngagementSample {
            timestamp: ts,
            follower_count: followers,
            impressions: 500,
            engagement_rate: 4.5,
        }
    }

    #[test]
    fn test_commit_appends_on_allowed_and_warn() {
        let mut engine = engine();
        let base = 1_000_000;

        for i in 0..60 {
            let ts = base + i * 30;
            let decision = engine
                .commit_interaction(InteractionKind::Like, &format!("l{}", i), "acct", ts, ts)
                .unwrap();
            assert!(!decision.is_blocked(), "commit {} blocked: {:?}", i, decision);
        }

        // All 60 landed in the log
        assert_eq!(engine.snapshot().0.len(), 60);
    }

    #[test]
    fn test_commit_does_not_append_on_blocked() {
        let mut engine = engine();
        let base = 1_000_000;

        for i in 0..60 {
            let ts = base + i * 30;
            engine
                .commit_interaction(InteractionKind::Like, &format!("l{}", i), "acct", ts, ts)
                .unwrap();
        }

        let ts = base + 60 * 30;
        let decision = engine
            .commit_interaction(InteractionKind::Like, "l60", "acct", ts, ts)
            .unwrap();

        assert!(decision.is_blocked());
        assert_eq!(engine.snapshot().0.len(), 60);

        // The blocked decision surfaced as a warning alert
        let alerts = engine.get_alerts(5);
        assert!(alerts.iter().any(|a| a.kind == AlertKind::Warning
            && a.message.contains("like limit reached")));
    }

    #[test]
    fn test_commit_rejects_future_timestamp() {
        let mut engine = engine();

        let result =
            engine.commit_interaction(InteractionKind::Like, "l1", "acct", 2000, 1000);
        assert!(result.is_err());
        assert!(engine.snapshot().0.is_empty());
    }

    #[test]
    fn test_ingest_sample_milestone_alert() {
        let mut engine = engine();
        let base = 1_000_000;

        engine.ingest_sample(sample(base, 1195), base).unwrap();
        engine.ingest_sample(sample(base + 600, 1204), base + 600).unwrap();

        let alerts = engine.get_alerts(5);
        assert!(alerts
            .iter()
            .any(|a| a.kind == AlertKind::Success && a.message.contains("1200")));
    }

    #[test]
    fn test_duplicate_sample_does_not_realert() {
        let mut engine = engine();
        let base = 1_000_000;

        engine.ingest_sample(sample(base, 1195), base).unwrap();
        engine.ingest_sample(sample(base + 600, 1204), base + 600).unwrap();
        // Same tick delivered twice
        assert!(!engine
            .ingest_sample(sample(base + 600, 1204), base + 700)
            .unwrap());

        let milestone_count = engine
            .get_alerts(10)
            .iter()
            .filter(|a| a.kind == AlertKind::Success)
            .count();
        assert_eq!(milestone_count, 1);
    }

    #[test]
    fn test_refresh_schedule_replaces_windows() {
        let mut engine = engine();
        let base = 1_704_326_400; // Thursday 00:00 UTC

        for week in 0..4 {
            let ts = base + week * 7 * 86_400 + 13 * 3600;
            engine.ingest_sample(sample(ts, 1200 + week as u64), ts).unwrap();
        }

        let now = base + 4 * 7 * 86_400;
        engine.refresh_schedule(now);

        let thursday = engine.get_recommended_windows(Weekday::Thu);
        assert!(!thursday.is_empty());
        assert_eq!(thursday[0].start_minute, 13 * 60);

        // Idempotent: refreshing again yields the same set
        let before = engine.all_recommended_windows().to_vec();
        engine.refresh_schedule(now);
        assert_eq!(engine.all_recommended_windows(), &before[..]);
    }

    #[test]
    fn test_rate_status_is_side_effect_free() {
        let mut engine = engine();
        let base = 1_000_000;

        engine
            .commit_interaction(InteractionKind::Like, "l1", "acct", base, base)
            .unwrap();

        let status_a = engine.get_rate_status(InteractionKind::Like, base + 10);
        let status_b = engine.get_rate_status(InteractionKind::Like, base + 10);
        assert_eq!(status_a, status_b);
        assert_eq!(status_a[0].used, 1);
    }

    #[test]
    fn test_playbook_queries() {
        let engine = engine();

        assert_eq!(engine.get_content_plan(Weekday::Mon).len(), 2);
        assert_eq!(engine.hashtag_groups().len(), 4);
    }
}
