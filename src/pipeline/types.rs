//! Core data structures shared across the engine

use serde::{Deserialize, Serialize};

/// Interaction kinds tracked by the rate governor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionKind {
    #[serde(rename = "LIKE")]
    Like,
    #[serde(rename = "COMMENT")]
    Comment,
    #[serde(rename = "STORY")]
    Story,
    #[serde(rename = "REEL")]
    Reel,
    #[serde(rename = "POST")]
    Post,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Like => "like",
            InteractionKind::Comment => "comment",
            InteractionKind::Story => "story",
            InteractionKind::Reel => "reel",
            InteractionKind::Post => "post",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "like" => Some(InteractionKind::Like),
            "comment" => Some(InteractionKind::Comment),
            "story" => Some(InteractionKind::Story),
            "reel" => Some(InteractionKind::Reel),
            "post" => Some(InteractionKind::Post),
            _ => None,
        }
    }

    pub fn all() -> [InteractionKind; 5] {
        [
            InteractionKind::Like,
            InteractionKind::Comment,
            InteractionKind::Story,
            InteractionKind::Reel,
            InteractionKind::Post,
        ]
    }
}

/// A single interaction performed (or observed) on the platform
///
/// Immutable once appended to the event log. `id` is the platform-side
/// identifier used for idempotent ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub id: String,
    pub kind: InteractionKind,
    pub timestamp: i64,
    pub actor: String,
}

impl InteractionEvent {
    /// Parse an InteractionEvent from a JSONL line
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// One engagement snapshot delivered by the platform poller
///
/// Exactly one per ingestion tick; `timestamp` doubles as the identity for
/// idempotent ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementSample {
    pub timestamp: i64,
    pub follower_count: u64,
    pub impressions: u64,
    pub engagement_rate: f64,
}

/// Rolling window spans the governor enforces ceilings over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateWindowSpan {
    Hourly,
    Daily,
}

impl RateWindowSpan {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateWindowSpan::Hourly => "1h",
            RateWindowSpan::Daily => "24h",
        }
    }

    pub fn duration_secs(&self) -> i64 {
        match self {
            RateWindowSpan::Hourly => 60 * 60,
            RateWindowSpan::Daily => 24 * 60 * 60,
        }
    }
}

/// What a rate window guards: a single interaction kind, or the cross-kind
/// daily organic-interaction budget (likes + comments)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateScope {
    Kind(InteractionKind),
    DailyBudget,
}

impl RateScope {
    pub fn label(&self) -> &'static str {
        match self {
            RateScope::Kind(kind) => kind.as_str(),
            RateScope::DailyBudget => "organic interactions",
        }
    }
}

/// Read-only view of one rolling rate window at a point in time
///
/// `used` may legally exceed `ceiling`: the overshoot is the signal that
/// triggers a Blocked classification, not a storage invariant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateWindowSnapshot {
    pub scope: RateScope,
    pub span: RateWindowSpan,
    pub used: u32,
    pub ceiling: u32,
}

/// Why a prospective interaction was refused
#[derive(Debug, Clone, PartialEq)]
pub enum BlockReason {
    CeilingReached(RateWindowSnapshot),
    StoryGap {
        last_story: i64,
        required_gap_secs: i64,
    },
}

/// Outcome of classifying a prospective interaction
///
/// A first-class value consumers branch on; `Blocked` is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum RateDecision {
    Allowed,
    Warn(RateWindowSnapshot),
    Blocked(BlockReason),
}

impl RateDecision {
    pub fn is_blocked(&self) -> bool {
        matches!(self, RateDecision::Blocked(_))
    }
}

/// Alert severity shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Success,
    Warning,
    Info,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Success => "success",
            AlertKind::Warning => "warning",
            AlertKind::Info => "info",
        }
    }
}

/// A single alert record, created by the emitter only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
    pub created_at: i64,
}

/// One recommended posting window for a weekday
///
/// Minutes are local minutes-of-day after the configured UTC offset is
/// applied. Fallback windows served without sample backing carry score 0.0.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendedWindow {
    pub weekday: chrono::Weekday,
    pub start_minute: u32,
    pub end_minute: u32,
    pub score: f64,
}

impl RecommendedWindow {
    /// Format as "HH:MM - HH:MM" for display and logs
    pub fn time_range(&self) -> String {
        format!(
            "{:02}:{:02} - {:02}:{:02}",
            self.start_minute / 60,
            self.start_minute % 60,
            self.end_minute / 60,
            self.end_minute % 60
        )
    }
}

/// Headline metrics computed for the dashboard
///
/// Deltas are `None` when the comparison baseline is missing so the
/// presentation layer can render an explicit "no data" state instead of a
/// misleading zero.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlineMetrics {
    pub followers: u64,
    pub follower_delta_7d: Option<i64>,
    pub follower_pct_7d: Option<f64>,
    pub engagement_rate_avg: f64,
    pub engagement_delta_1d: Option<f64>,
    pub daily_reach: u64,
    pub conversions: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interaction_jsonl() {
        let line = r#"{"id":"evt_9f2c","kind":"LIKE","timestamp":1754000000,"actor":"perros_con_estilo"}"#;

        let event = InteractionEvent::from_jsonl(line).unwrap();
        assert_eq!(event.id, "evt_9f2c");
        assert_eq!(event.kind, InteractionKind::Like);
        assert_eq!(event.timestamp, 1754000000);
        assert_eq!(event.actor, "perros_con_estilo");
    }

    #[test]
    fn test_parse_unknown_kind_rejected() {
        let line = r#"{"id":"evt_1","kind":"FOLLOW","timestamp":1754000000,"actor":"a"}"#;
        assert!(InteractionEvent::from_jsonl(line).is_err());
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in InteractionKind::all() {
            assert_eq!(InteractionKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(InteractionKind::from_str("follow"), None);
    }

    #[test]
    fn test_window_time_range_format() {
        let window = RecommendedWindow {
            weekday: chrono::Weekday::Thu,
            start_minute: 13 * 60,
            end_minute: 14 * 60,
            score: 5.2,
        };
        assert_eq!(window.time_range(), "13:00 - 14:00");
    }
}
