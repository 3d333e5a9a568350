//! Posting-schedule advisor built on a time-of-week engagement heat map
//!
//! Buckets engagement samples into fixed sub-day intervals per weekday,
//! ranks buckets by mean engagement rate, merges adjacent winners into
//! contiguous windows and keeps the top K per weekday. Recomputation is
//! idempotent and fully replaces prior results; the same sample set always
//! yields the same output.

use super::config::CoreConfig;
use super::playbook;
use super::types::{EngagementSample, RecommendedWindow};
use chrono::{Datelike, Timelike, Weekday};
use std::collections::HashMap;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Default, Clone, Copy)]
struct BucketAccumulator {
    count: usize,
    rate_sum: f64,
    impressions: u64,
}

#[derive(Debug, Clone, Copy)]
struct RankedBucket {
    index: i64,
    mean_rate: f64,
    rate_sum: f64,
    count: usize,
    impressions: u64,
}

pub struct ScheduleAdvisor {
    bucket_secs: i64,
    min_samples: usize,
    top_k: usize,
    utc_offset_secs: i32,
    fallback: Vec<RecommendedWindow>,
}

impl ScheduleAdvisor {
    pub fn new(config: &CoreConfig) -> Self {
        let fallback = if config.use_fallback_windows {
            playbook::default_posting_windows()
        } else {
            Vec::new()
        };

        Self {
            bucket_secs: config.bucket_secs,
            min_samples: config.min_bucket_samples,
            top_k: config.top_k,
            utc_offset_secs: config.utc_offset_secs,
            fallback,
        }
    }

    /// Recompute recommended windows from the full sample history
    ///
    /// Pure: the caller swaps the returned set in atomically, so an
    /// interrupted refresh never replaces the previous valid result.
    /// Output ordering: weekday Mon..Sun, then score descending.
    pub fn recompute(&self, samples: &[EngagementSample]) -> Vec<RecommendedWindow> {
        let mut heat_map: HashMap<(usize, i64), BucketAccumulator> = HashMap::new();

        for sample in samples {
            let local_ts = sample.timestamp + self.utc_offset_secs as i64;
            let Some(dt) = chrono::DateTime::from_timestamp(local_ts, 0) else {
                continue;
            };
            let weekday_index = dt.weekday().num_days_from_monday() as usize;
            let bucket_index = dt.time().num_seconds_from_midnight() as i64 / self.bucket_secs;

            let acc = heat_map.entry((weekday_index, bucket_index)).or_default();
            acc.count += 1;
            acc.rate_sum += sample.engagement_rate;
            acc.impressions += sample.impressions;
        }

        let mut windows = Vec::new();
        for (weekday_index, weekday) in WEEKDAYS.iter().enumerate() {
            let ranked = self.rank_buckets(&heat_map, weekday_index);
            let merged = self.merge_top_buckets(*weekday, &ranked);

            if merged.is_empty() {
                windows.extend(
                    self.fallback
                        .iter()
                        .filter(|w| w.weekday == *weekday)
                        .cloned(),
                );
            } else {
                windows.extend(merged);
            }
        }

        windows
    }

    /// Buckets with enough samples, best first
    fn rank_buckets(
        &self,
        heat_map: &HashMap<(usize, i64), BucketAccumulator>,
        weekday_index: usize,
    ) -> Vec<RankedBucket> {
        let mut ranked: Vec<RankedBucket> = heat_map
            .iter()
            .filter(|((day, _), acc)| *day == weekday_index && acc.count >= self.min_samples)
            .map(|((_, index), acc)| RankedBucket {
                index: *index,
                mean_rate: acc.rate_sum / acc.count as f64,
                rate_sum: acc.rate_sum,
                count: acc.count,
                impressions: acc.impressions,
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.mean_rate
                .total_cmp(&a.mean_rate)
                .then(b.impressions.cmp(&a.impressions))
                .then(a.index.cmp(&b.index))
        });
        ranked
    }

    /// Merge adjacent top-K buckets into contiguous windows, keep the top K
    fn merge_top_buckets(
        &self,
        weekday: Weekday,
        ranked: &[RankedBucket],
    ) -> Vec<RecommendedWindow> {
        let mut selected: Vec<RankedBucket> =
            ranked.iter().take(self.top_k).copied().collect();
        selected.sort_by_key(|b| b.index);

        let mut merged: Vec<RecommendedWindow> = Vec::new();
        let mut run: Vec<RankedBucket> = Vec::new();

        for bucket in selected {
            if run.last().map_or(false, |prev| bucket.index == prev.index + 1) {
                run.push(bucket);
            } else {
                if !run.is_empty() {
                    merged.push(self.window_from_run(weekday, &run));
                }
                run = vec![bucket];
            }
        }
        if !run.is_empty() {
            merged.push(self.window_from_run(weekday, &run));
        }

        merged.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.start_minute.cmp(&b.start_minute))
        });
        merged.truncate(self.top_k);
        merged
    }

    fn window_from_run(&self, weekday: Weekday, run: &[RankedBucket]) -> RecommendedWindow {
        let total_count: usize = run.iter().map(|b| b.count).sum();
        let total_rate: f64 = run.iter().map(|b| b.rate_sum).sum();
        let bucket_minutes = (self.bucket_secs / 60) as u32;

        RecommendedWindow {
            weekday,
            start_minute: run[0].index as u32 * bucket_minutes,
            end_minute: (run[run.len() - 1].index as u32 + 1) * bucket_minutes,
            score: total_rate / total_count as f64,
        }
    }
}
