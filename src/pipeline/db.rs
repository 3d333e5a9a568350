//! Dashboard store trait and SQLite implementation
//!
//! The presentation layer reads from these tables only; the core never
//! reads them back. Alert writes are idempotent across flushes (the
//! ingestion loop re-flushes the recent alert window), window writes replace
//! the whole set.

use super::types::{Alert, HeadlineMetrics, RecommendedWindow};
use async_trait::async_trait;
use chrono::Weekday;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Database(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "IO error: {}", e),
            StoreError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

/// Write side of the presentation boundary
#[async_trait]
pub trait DashboardStore: Send + Sync {
    /// Persist alerts; re-writing an already-stored alert is a no-op
    async fn write_alerts(&self, alerts: Vec<Alert>) -> Result<(), StoreError>;

    /// Persist one headline-metrics snapshot captured at `captured_at`
    async fn write_metrics_snapshot(
        &self,
        captured_at: i64,
        metrics: &HeadlineMetrics,
    ) -> Result<(), StoreError>;

    /// Replace the full recommended-window set
    async fn replace_windows(&self, windows: Vec<RecommendedWindow>) -> Result<(), StoreError>;
}

/// SQLite-backed dashboard store (WAL mode, idempotent schema)
pub struct SqliteDashboardStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDashboardStore {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS alerts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL,
                message TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                UNIQUE(kind, message, created_at)
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_alerts_created ON alerts(created_at DESC)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS metric_snapshots (
                captured_at INTEGER PRIMARY KEY,
                followers INTEGER NOT NULL,
                follower_delta_7d INTEGER,
                follower_pct_7d REAL,
                engagement_rate_avg REAL NOT NULL,
                engagement_delta_1d REAL,
                daily_reach INTEGER NOT NULL,
                conversions INTEGER
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS recommended_windows (
                weekday INTEGER NOT NULL,
                start_minute INTEGER NOT NULL,
                end_minute INTEGER NOT NULL,
                score REAL NOT NULL,
                PRIMARY KEY(weekday, start_minute)
            )",
            [],
        )?;

        log::info!("✅ Dashboard store initialized with WAL mode");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

#[async_trait]
impl DashboardStore for SqliteDashboardStore {
    async fn write_alerts(&self, alerts: Vec<Alert>) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        for alert in alerts {
            conn.execute(
                "INSERT OR IGNORE INTO alerts (kind, message, created_at) VALUES (?1, ?2, ?3)",
                params![alert.kind.as_str(), alert.message, alert.created_at],
            )?;
        }
        Ok(())
    }

    async fn write_metrics_snapshot(
        &self,
        captured_at: i64,
        metrics: &HeadlineMetrics,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO metric_snapshots
             (captured_at, followers, follower_delta_7d, follower_pct_7d,
              engagement_rate_avg, engagement_delta_1d, daily_reach, conversions)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                captured_at,
                metrics.followers as i64,
                metrics.follower_delta_7d,
                metrics.follower_pct_7d,
                metrics.engagement_rate_avg,
                metrics.engagement_delta_1d,
                metrics.daily_reach as i64,
                metrics.conversions.map(|c| c as i64),
            ],
        )?;
        Ok(())
    }

    async fn replace_windows(&self, windows: Vec<RecommendedWindow>) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM recommended_windows", [])?;
        for window in windows {
            tx.execute(
                "INSERT OR REPLACE INTO recommended_windows
                 (weekday, start_minute, end_minute, score)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    weekday_number(window.weekday),
                    window.start_minute,
                    window.end_minute,
                    window.score,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}

fn weekday_number(weekday: Weekday) -> u32 {
    weekday.num_days_from_monday()
}
