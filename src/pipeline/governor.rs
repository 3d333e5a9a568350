//! Interaction-rate governor with rolling per-kind ceilings
//!
//! Windows are rolling, not fixed buckets: "last hour" at time t means
//! `(t - 1h, t]`, recomputed from the event log on every call. Counts for a
//! prospective action therefore never suffer bucket-reset boundary artifacts.
//!
//! classify() alone is a pure read. A caller that intends to append on a
//! permissive decision must do so through `GrowthEngine::commit_interaction`,
//! which holds the engine lock across classify-then-append; an unsynchronized
//! check-then-act pair can exceed a ceiling under concurrency.

use super::config::CoreConfig;
use super::event_log::EventLog;
use super::types::{
    BlockReason, InteractionKind, RateDecision, RateScope, RateWindowSnapshot, RateWindowSpan,
};

/// Kinds that count toward the cross-kind daily organic-interaction budget
const BUDGET_KINDS: [InteractionKind; 2] = [InteractionKind::Like, InteractionKind::Comment];

pub struct RateGovernor {
    config: CoreConfig,
}

impl RateGovernor {
    pub fn new(config: CoreConfig) -> Self {
        Self { config }
    }

    /// Classify a prospective interaction against every active window
    ///
    /// Evaluation order: story minimum gap (blocks independent of counts),
    /// then hourly ceiling, daily ceiling, and the daily budget. The first
    /// exceeded ceiling blocks; otherwise the first window whose next count
    /// lands in the warn band warns; otherwise the action is allowed.
    pub fn classify(
        &self,
        log: &EventLog,
        kind: InteractionKind,
        proposed_ts: i64,
    ) -> RateDecision {
        if kind == InteractionKind::Story {
            if let Some(last_story) = log.last_story_before(proposed_ts) {
                if proposed_ts - last_story < self.config.story_min_gap_secs {
                    return RateDecision::Blocked(BlockReason::StoryGap {
                        last_story,
                        required_gap_secs: self.config.story_min_gap_secs,
                    });
                }
            }
        }

        let snapshots = self.active_windows(log, kind, proposed_ts);

        for snapshot in &snapshots {
            if snapshot.used + 1 > snapshot.ceiling {
                return RateDecision::Blocked(BlockReason::CeilingReached(*snapshot));
            }
        }

        for snapshot in &snapshots {
            if self.in_warn_band(snapshot.used + 1, snapshot.ceiling) {
                return RateDecision::Warn(*snapshot);
            }
        }

        RateDecision::Allowed
    }

    /// Side-effect-free status of every window covering `kind` at `now`
    pub fn rate_status(
        &self,
        log: &EventLog,
        kind: InteractionKind,
        now: i64,
    ) -> Vec<RateWindowSnapshot> {
        self.active_windows(log, kind, now)
    }

    fn active_windows(
        &self,
        log: &EventLog,
        kind: InteractionKind,
        at: i64,
    ) -> Vec<RateWindowSnapshot> {
        let ceilings = self.config.ceilings_for(kind);
        let mut snapshots = Vec::new();

        if let Some(ceiling) = ceilings.hourly {
            snapshots.push(self.kind_window(log, kind, at, RateWindowSpan::Hourly, ceiling));
        }
        if let Some(ceiling) = ceilings.daily {
            snapshots.push(self.kind_window(log, kind, at, RateWindowSpan::Daily, ceiling));
        }

        if BUDGET_KINDS.contains(&kind) {
            if let Some(ceiling) = self.config.daily_interaction_budget {
                let span = RateWindowSpan::Daily;
                let used = log.count_between_any(&BUDGET_KINDS, at - span.duration_secs(), at);
                snapshots.push(RateWindowSnapshot {
                    scope: RateScope::DailyBudget,
                    span,
                    used,
                    ceiling,
                });
            }
        }

        snapshots
    }

    fn kind_window(
        &self,
        log: &EventLog,
        kind: InteractionKind,
        at: i64,
        span: RateWindowSpan,
        ceiling: u32,
    ) -> RateWindowSnapshot {
        let used = log.count_between(kind, at - span.duration_secs(), at);
        RateWindowSnapshot {
            scope: RateScope::Kind(kind),
            span,
            used,
            ceiling,
        }
    }

    fn in_warn_band(&self, next_count: u32, ceiling: u32) -> bool {
        next_count as f64 > ceiling as f64 * (1.0 - self.config.warn_margin)
    }
}
