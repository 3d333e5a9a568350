//! # Interaction-Rate Governor and Content-Scheduling Advisor
//!
//! In-memory core behind the growth dashboard:
//! - Appends interaction events and engagement samples to a retained log
//!   (no raw event ever reaches disk except via operator snapshots)
//! - Classifies prospective interactions against rolling per-kind ceilings
//! - Aggregates the sample history into a time-of-week heat map and ranks
//!   posting windows per weekday
//! - Converts threshold crossings, imminent windows and follower milestones
//!   into deduplicated alerts
//! - Computes headline metrics for the presentation layer
//!
//! ## Architecture
//!
//! ```text
//! IngestMessage (collector feed)
//!     ↓
//! GrowthEngine::{ingest_event, ingest_sample, commit_interaction}
//!     ↓
//! EventLog (rolling retention) → {RateGovernor, MetricsAggregator, ScheduleAdvisor}
//!     ↓
//! AlertEmitter → DashboardStore (read-only presentation tables)
//! ```
//!
//! The engine is shared as `Arc<Mutex<GrowthEngine>>`. Classify-then-append
//! runs under a single lock acquisition; every presentation query is a pure
//! read over immutable snapshots.
//!
//! ## Module Organization
//!
//! - `types` - Core data structures (events, samples, decisions, alerts)
//! - `config` - Engine configuration and startup validation
//! - `event_log` - Append-only event/sample store with retention
//! - `governor` - Rolling-window rate classification
//! - `advisor` - Heat-map bucketing and window recommendation
//! - `alerts` - Alert emission with cooldown deduplication
//! - `metrics` - Headline metric aggregation
//! - `playbook` - Static content calendar, hashtags, fallback windows
//! - `engine` - Orchestration and the presentation query surface
//! - `db` - Dashboard store trait and SQLite implementation
//! - `ingestion` - Channel ingestion and the unified flush loop

pub mod advisor;
pub mod alerts;
pub mod config;
pub mod db;
pub mod engine;
pub mod event_log;
pub mod governor;
pub mod ingestion;
pub mod metrics;
pub mod playbook;
pub mod types;

// Re-export commonly used types
pub use config::{ConfigError, CoreConfig, KindCeilings};
pub use db::{DashboardStore, SqliteDashboardStore, StoreError};
pub use engine::GrowthEngine;
pub use event_log::{EventLog, InvalidEvent};
pub use ingestion::IngestMessage;
pub use metrics::InsufficientData;
pub use types::{
    Alert, AlertKind, BlockReason, EngagementSample, HeadlineMetrics, InteractionEvent,
    InteractionKind, RateDecision, RateScope, RateWindowSnapshot, RateWindowSpan,
    RecommendedWindow,
};
