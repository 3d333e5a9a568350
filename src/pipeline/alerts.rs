//! Alert emission with cooldown-based deduplication
//!
//! Converts governor decisions, schedule refreshes and follower milestones
//! into dashboard alert records. An identical (kind, message) pair is not
//! re-emitted within the cooldown window, so repeated classify calls against
//! a saturated limit produce one alert, not a storm.

use super::types::{
    Alert, AlertKind, BlockReason, InteractionKind, RateDecision, RecommendedWindow,
};
use chrono::{Datelike, Timelike};
use std::collections::{HashMap, VecDeque};

pub struct AlertEmitter {
    alerts: VecDeque<Alert>,
    last_emitted: HashMap<(AlertKind, String), i64>,
    cooldown_secs: i64,
    max_alerts: usize,
}

impl AlertEmitter {
    pub fn new(cooldown_secs: i64, max_alerts: usize) -> Self {
        Self {
            alerts: VecDeque::new(),
            last_emitted: HashMap::new(),
            cooldown_secs,
            max_alerts,
        }
    }

    /// Store an alert unless the identical (kind, message) fired within the
    /// cooldown window. Returns whether the alert was stored.
    pub fn emit(&mut self, kind: AlertKind, message: String, now: i64) -> bool {
        let key = (kind, message.clone());
        if let Some(last) = self.last_emitted.get(&key) {
            if now - last < self.cooldown_secs {
                return false;
            }
        }

        self.last_emitted.insert(key, now);
        let cooldown = self.cooldown_secs;
        self.last_emitted.retain(|_, t| now - *t < cooldown);

        self.alerts.push_back(Alert {
            kind,
            message,
            created_at: now,
        });
        while self.alerts.len() > self.max_alerts {
            self.alerts.pop_front();
        }
        true
    }

    /// Translate a governor decision into an alert, if it warrants one
    pub fn observe_decision(
        &mut self,
        kind: InteractionKind,
        decision: &RateDecision,
        now: i64,
    ) {
        match decision {
            RateDecision::Allowed => {}
            RateDecision::Warn(snapshot) => {
                let message = format!(
                    "{} count close to the {} limit of {}",
                    snapshot.scope.label(),
                    snapshot.span.as_str(),
                    snapshot.ceiling
                );
                self.emit(AlertKind::Warning, message, now);
            }
            RateDecision::Blocked(BlockReason::CeilingReached(snapshot)) => {
                let message = format!(
                    "{} limit reached: {} per {}",
                    snapshot.scope.label(),
                    snapshot.ceiling,
                    snapshot.span.as_str()
                );
                self.emit(AlertKind::Warning, message, now);
            }
            RateDecision::Blocked(BlockReason::StoryGap {
                required_gap_secs, ..
            }) => {
                let message = format!(
                    "{} blocked: minimum {}m gap between stories",
                    kind.as_str(),
                    required_gap_secs / 60
                );
                self.emit(AlertKind::Warning, message, now);
            }
        }
    }

    /// Emit an info alert for any recommended window starting within
    /// `lead_secs` of now (local time per the configured offset)
    pub fn observe_windows(
        &mut self,
        windows: &[RecommendedWindow],
        now: i64,
        lead_secs: i64,
        utc_offset_secs: i32,
    ) {
        let local_ts = now + utc_offset_secs as i64;
        let Some(dt) = chrono::DateTime::from_timestamp(local_ts, 0) else {
            return;
        };
        let weekday = dt.weekday();
        let now_minute = (dt.time().num_seconds_from_midnight() / 60) as i64;
        let lead_minutes = lead_secs / 60;

        for window in windows {
            if window.weekday != weekday {
                continue;
            }
            let until_start = window.start_minute as i64 - now_minute;
            if until_start >= 0 && until_start <= lead_minutes {
                let message = format!("best time to post soon: {}", window.time_range());
                self.emit(AlertKind::Info, message, now);
            }
        }
    }

    /// Emit a success alert when the follower count crosses a milestone
    pub fn observe_follower_count(
        &mut self,
        previous: Option<u64>,
        current: u64,
        milestone_step: u64,
        now: i64,
    ) {
        let Some(previous) = previous else {
            return;
        };
        if milestone_step == 0 || current <= previous {
            return;
        }

        if current / milestone_step > previous / milestone_step {
            let milestone = (current / milestone_step) * milestone_step;
            let message = format!("Reached {} followers!", milestone);
            self.emit(AlertKind::Success, message, now);
        }
    }

    /// Most recent alerts, newest first
    pub fn recent(&self, limit: usize) -> Vec<Alert> {
        self.alerts.iter().rev().take(limit).cloned().collect()
    }
}
