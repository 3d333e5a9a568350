//! Engine configuration, supplied at process start and immutable thereafter

use super::types::InteractionKind;
use std::collections::HashMap;
use std::env;

/// Per-kind interaction ceilings
///
/// `None` means the kind is unbounded for that span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindCeilings {
    pub hourly: Option<u32>,
    pub daily: Option<u32>,
}

/// Invalid configuration detected at startup; fatal, the process must not
/// start with a partially-valid config.
#[derive(Debug)]
pub enum ConfigError {
    ZeroCeiling(InteractionKind),
    ZeroDailyBudget,
    InvalidBucket(i64),
    InvalidWarnMargin(f64),
    ZeroTopK,
    InvalidRetention(i64),
    InvalidSampleRetention(i64),
    InvalidTrailingWindow(i64),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroCeiling(kind) => {
                write!(f, "ceiling for {} must be positive", kind.as_str())
            }
            ConfigError::ZeroDailyBudget => write!(f, "daily interaction budget must be positive"),
            ConfigError::InvalidBucket(secs) => {
                write!(f, "schedule bucket {}s must evenly divide 24h", secs)
            }
            ConfigError::InvalidWarnMargin(m) => {
                write!(f, "warn margin {} must be within (0, 1)", m)
            }
            ConfigError::ZeroTopK => write!(f, "top_k must be positive"),
            ConfigError::InvalidRetention(secs) => {
                write!(f, "event retention {}s must cover 24h and stay within 7 days", secs)
            }
            ConfigError::InvalidSampleRetention(secs) => {
                write!(f, "sample retention {}s must cover at least 24h", secs)
            }
            ConfigError::InvalidTrailingWindow(secs) => {
                write!(f, "metrics trailing window {}s must be positive", secs)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Engine configuration: rate ceilings, scheduling, alerting, retention
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Per-kind hourly/daily ceilings
    pub ceilings: HashMap<InteractionKind, KindCeilings>,

    /// Cross-kind daily budget for organic interactions (likes + comments)
    pub daily_interaction_budget: Option<u32>,

    /// Mandatory minimum gap between two stories (seconds)
    pub story_min_gap_secs: i64,

    /// Fraction of a ceiling that counts as the warn band (0.10 = top 10%)
    pub warn_margin: f64,

    /// Minimum elapsed time before an identical alert may be re-emitted
    pub alert_cooldown_secs: i64,

    /// Lead time for "best time to post soon" alerts
    pub alert_lead_secs: i64,

    /// Display window: most recent N alerts retained
    pub max_alerts: usize,

    /// Follower milestones are multiples of this step
    pub milestone_step: u64,

    /// Sub-day bucket size for the engagement heat map (seconds)
    pub bucket_secs: i64,

    /// Buckets with fewer samples than this are excluded from ranking
    pub min_bucket_samples: usize,

    /// Recommended windows returned per weekday
    pub top_k: usize,

    /// Offset applied before weekday/time-of-day bucketing (seconds east of UTC)
    pub utc_offset_secs: i32,

    /// Interaction events older than this are evicted (at most 7 days)
    pub event_retention_secs: i64,

    /// Engagement samples older than this are evicted
    pub sample_retention_secs: i64,

    /// Trailing window for headline engagement metrics
    pub metrics_trailing_secs: i64,

    /// Serve playbook posting windows for weekdays without sample coverage
    pub use_fallback_windows: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        let mut ceilings = HashMap::new();
        ceilings.insert(
            InteractionKind::Like,
            KindCeilings { hourly: Some(60), daily: None },
        );
        ceilings.insert(
            InteractionKind::Comment,
            KindCeilings { hourly: Some(5), daily: None },
        );
        ceilings.insert(
            InteractionKind::Reel,
            KindCeilings { hourly: None, daily: Some(8) },
        );
        ceilings.insert(
            InteractionKind::Story,
            KindCeilings { hourly: None, daily: Some(2) },
        );
        ceilings.insert(InteractionKind::Post, KindCeilings::default());

        Self {
            ceilings,
            daily_interaction_budget: Some(200),
            story_min_gap_secs: 2 * 60 * 60,
            warn_margin: 0.10,
            alert_cooldown_secs: 30 * 60,
            alert_lead_secs: 60 * 60,
            max_alerts: 50,
            milestone_step: 100,
            bucket_secs: 60 * 60,
            min_bucket_samples: 3,
            top_k: 3,
            utc_offset_secs: 0,
            event_retention_secs: 7 * 24 * 60 * 60,
            sample_retention_secs: 28 * 24 * 60 * 60,
            metrics_trailing_secs: 24 * 60 * 60,
            use_fallback_windows: true,
        }
    }
}

impl CoreConfig {
    /// Defaults overridden from environment variables
    ///
    /// Recognized variables (all optional):
    /// - `GRAMFLOW_LIKES_PER_HOUR`, `GRAMFLOW_COMMENTS_PER_HOUR`
    /// - `GRAMFLOW_REELS_PER_DAY`, `GRAMFLOW_STORIES_PER_DAY`
    /// - `GRAMFLOW_DAILY_BUDGET`, `GRAMFLOW_STORY_GAP_SECS`
    /// - `GRAMFLOW_ALERT_COOLDOWN_SECS`, `GRAMFLOW_BUCKET_SECS`
    /// - `GRAMFLOW_TOP_K`, `GRAMFLOW_RETENTION_SECS`, `GRAMFLOW_UTC_OFFSET_SECS`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = env_u32("GRAMFLOW_LIKES_PER_HOUR") {
            config.set_hourly(InteractionKind::Like, v);
        }
        if let Some(v) = env_u32("GRAMFLOW_COMMENTS_PER_HOUR") {
            config.set_hourly(InteractionKind::Comment, v);
        }
        if let Some(v) = env_u32("GRAMFLOW_REELS_PER_DAY") {
            config.set_daily(InteractionKind::Reel, v);
        }
        if let Some(v) = env_u32("GRAMFLOW_STORIES_PER_DAY") {
            config.set_daily(InteractionKind::Story, v);
        }
        if let Some(v) = env_u32("GRAMFLOW_DAILY_BUDGET") {
            config.daily_interaction_budget = Some(v);
        }
        if let Some(v) = env_i64("GRAMFLOW_STORY_GAP_SECS") {
            config.story_min_gap_secs = v;
        }
        if let Some(v) = env_i64("GRAMFLOW_ALERT_COOLDOWN_SECS") {
            config.alert_cooldown_secs = v;
        }
        if let Some(v) = env_i64("GRAMFLOW_BUCKET_SECS") {
            config.bucket_secs = v;
        }
        if let Some(v) = env_u32("GRAMFLOW_TOP_K") {
            config.top_k = v as usize;
        }
        if let Some(v) = env_i64("GRAMFLOW_RETENTION_SECS") {
            config.event_retention_secs = v;
        }
        if let Some(v) = env_i64("GRAMFLOW_UTC_OFFSET_SECS") {
            config.utc_offset_secs = v as i32;
        }

        config
    }

    fn set_hourly(&mut self, kind: InteractionKind, ceiling: u32) {
        self.ceilings.entry(kind).or_default().hourly = Some(ceiling);
    }

    fn set_daily(&mut self, kind: InteractionKind, ceiling: u32) {
        self.ceilings.entry(kind).or_default().daily = Some(ceiling);
    }

    pub fn ceilings_for(&self, kind: InteractionKind) -> KindCeilings {
        self.ceilings.get(&kind).copied().unwrap_or_default()
    }

    /// Validate the configuration; any error is fatal at startup
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (kind, ceilings) in &self.ceilings {
            if ceilings.hourly == Some(0) || ceilings.daily == Some(0) {
                return Err(ConfigError::ZeroCeiling(*kind));
            }
        }
        if self.daily_interaction_budget == Some(0) {
            return Err(ConfigError::ZeroDailyBudget);
        }
        if self.bucket_secs <= 0 || 86_400 % self.bucket_secs != 0 {
            return Err(ConfigError::InvalidBucket(self.bucket_secs));
        }
        if self.warn_margin <= 0.0 || self.warn_margin >= 1.0 {
            return Err(ConfigError::InvalidWarnMargin(self.warn_margin));
        }
        if self.top_k == 0 {
            return Err(ConfigError::ZeroTopK);
        }
        if self.event_retention_secs < 86_400 || self.event_retention_secs > 7 * 86_400 {
            return Err(ConfigError::InvalidRetention(self.event_retention_secs));
        }
        if self.sample_retention_secs < 86_400 {
            return Err(ConfigError::InvalidSampleRetention(self.sample_retention_secs));
        }
        if self.metrics_trailing_secs <= 0 {
            return Err(ConfigError::InvalidTrailingWindow(self.metrics_trailing_secs));
        }
        Ok(())
    }
}

fn env_u32(key: &str) -> Option<u32> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

fn env_i64(key: &str) -> Option<i64> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}
