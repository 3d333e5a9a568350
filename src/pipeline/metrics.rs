//! Headline metrics computed as read-only rolling aggregates
//!
//! Everything here is a pure read over the event log; `now` is an explicit
//! parameter so trend figures are deterministic and testable. When the
//! trailing window holds no samples the caller gets `InsufficientData`, never
//! a fabricated zero.

use super::event_log::EventLog;
use super::types::{EngagementSample, HeadlineMetrics};

/// Returned instead of misleading defaults when the trailing window is empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsufficientData {
    pub window_secs: i64,
}

impl std::fmt::Display for InsufficientData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "no engagement samples within the trailing {}s window",
            self.window_secs
        )
    }
}

impl std::error::Error for InsufficientData {}

const DAY_SECS: i64 = 86_400;
const WEEK_SECS: i64 = 7 * DAY_SECS;

pub struct MetricsAggregator {
    trailing_secs: i64,
}

impl MetricsAggregator {
    pub fn new(trailing_secs: i64) -> Self {
        Self { trailing_secs }
    }

    /// Compute headline metrics at `now`
    ///
    /// Deltas come back as `None` when their baseline period has no samples;
    /// the presentation layer decides the display fallback.
    pub fn compute(&self, log: &EventLog, now: i64) -> Result<HeadlineMetrics, InsufficientData> {
        let trailing = collect_between(log, now - self.trailing_secs, now);
        if trailing.is_empty() {
            return Err(InsufficientData {
                window_secs: self.trailing_secs,
            });
        }

        // Non-empty trailing window guarantees a latest sample
        let followers = trailing[trailing.len() - 1].follower_count;

        let (follower_delta_7d, follower_pct_7d) = match log.latest_sample_at(now - WEEK_SECS) {
            Some(baseline) => {
                let delta = followers as i64 - baseline.follower_count as i64;
                let pct = if baseline.follower_count > 0 {
                    Some(delta as f64 / baseline.follower_count as f64 * 100.0)
                } else {
                    None
                };
                (Some(delta), pct)
            }
            None => (None, None),
        };

        let engagement_rate_avg = mean_rate(&trailing);

        let previous = collect_between(log, now - 2 * self.trailing_secs, now - self.trailing_secs);
        let engagement_delta_1d = if previous.is_empty() {
            None
        } else {
            Some(engagement_rate_avg - mean_rate(&previous))
        };

        let daily_reach = collect_between(log, now - DAY_SECS, now)
            .iter()
            .map(|s| s.impressions)
            .sum();

        let conversions = log.latest_sample_at(now - DAY_SECS).map(|baseline| {
            followers.saturating_sub(baseline.follower_count)
        });

        Ok(HeadlineMetrics {
            followers,
            follower_delta_7d,
            follower_pct_7d,
            engagement_rate_avg,
            engagement_delta_1d,
            daily_reach,
            conversions,
        })
    }
}

fn collect_between(log: &EventLog, after: i64, until: i64) -> Vec<EngagementSample> {
    log.samples()
        .iter()
        .filter(|s| s.timestamp > after && s.timestamp <= until)
        .cloned()
        .collect()
}

fn mean_rate(samples: &[EngagementSample]) -> f64 {
    samples.iter().map(|s| s.engagement_rate).sum::<f64>() / samples.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ts: i64, followers: u64, impressions: u64, rate: f64) -> EngagementSample {
        EngagementSample {
            timestamp: ts,
            follower_count: followers,
            impressions,
            engagement_rate: rate,
        }
    }

    fn log_with(samples: Vec<EngagementSample>, now: i64) -> EventLog {
        let mut log = EventLog::new(7 * DAY_SECS, 28 * DAY_SECS);
        for s in samples {
            log.add_sample(s, now).unwrap();
        }
        log
    }

    #[test]
    fn test_empty_trailing_window_is_insufficient_data() {
        let now = 100 * DAY_SECS;
        let log = log_with(vec![], now);
        let aggregator = MetricsAggregator::new(DAY_SECS);

        let result = aggregator.compute(&log, now);
        assert_eq!(result, Err(InsufficientData { window_secs: DAY_SECS }));
    }

    #[test]
    fn test_stale_samples_outside_trailing_window_are_insufficient() {
        let now = 100 * DAY_SECS;
        // Only sample is three days old
        let log = log_with(vec![sample(now - 3 * DAY_SECS, 1100, 500, 4.0)], now);
        let aggregator = MetricsAggregator::new(DAY_SECS);

        assert!(aggregator.compute(&log, now).is_err());
    }

    #[test]
    fn test_headline_metrics_with_full_history() {
        let now = 100 * DAY_SECS;
        let log = log_with(
            vec![
                sample(now - 8 * DAY_SECS, 1100, 400, 4.0), // 7d baseline
                sample(now - 30 * 3600, 1222, 900, 4.2),    // previous-day period
                sample(now - 3600, 1230, 2000, 4.6),
                sample(now - 600, 1234, 567, 5.0),
            ],
            now,
        );
        let aggregator = MetricsAggregator::new(DAY_SECS);

        let metrics = aggregator.compute(&log, now).unwrap();

        assert_eq!(metrics.followers, 1234);
        assert_eq!(metrics.follower_delta_7d, Some(134));
        assert!((metrics.follower_pct_7d.unwrap() - 134.0 / 1100.0 * 100.0).abs() < 1e-9);
        assert!((metrics.engagement_rate_avg - 4.8).abs() < 1e-9);
        assert!((metrics.engagement_delta_1d.unwrap() - (4.8 - 4.2)).abs() < 1e-9);
        assert_eq!(metrics.daily_reach, 2567);
        assert_eq!(metrics.conversions, Some(12)); // 1234 - 1222
    }

    #[test]
    fn test_missing_baselines_are_none_not_zero() {
        let now = 100 * DAY_SECS;
        let log = log_with(vec![sample(now - 600, 1234, 567, 5.0)], now);
        let aggregator = MetricsAggregator::new(DAY_SECS);

        let metrics = aggregator.compute(&log, now).unwrap();

        assert_eq!(metrics.follower_delta_7d, None);
        assert_eq!(metrics.follower_pct_7d, None);
        assert_eq!(metrics.engagement_delta_1d, None);
        assert_eq!(metrics.conversions, None);
    }

    #[test]
    fn test_follower_drop_yields_zero_conversions() {
        let now = 100 * DAY_SECS;
        let log = log_with(
            vec![
                sample(now - 30 * 3600, 1250, 500, 4.0),
                sample(now - 600, 1240, 500, 4.0),
            ],
            now,
        );
        let aggregator = MetricsAggregator::new(DAY_SECS);

        let metrics = aggregator.compute(&log, now).unwrap();
        assert_eq!(metrics.conversions, Some(0));
    }
}
