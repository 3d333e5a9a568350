pub mod collector;
pub mod config;
pub mod persistence;
pub mod pipeline;

pub use config::Config;
pub use pipeline::{
    Alert, AlertKind, CoreConfig, EngagementSample, GrowthEngine, HeadlineMetrics, IngestMessage,
    InteractionEvent, InteractionKind, RateDecision, RecommendedWindow,
};

/// Helper to get current Unix timestamp
pub fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
