//! Async channel ingestion and unified flush loop
//!
//! Receives wire records from collectors via a bounded mpsc channel, feeds
//! the shared engine, and on a periodic tick refreshes the schedule and
//! flushes alerts, metrics and windows to the dashboard store. Lock scope is
//! tight: once per message and once per flush, released before any database
//! write.

use super::db::DashboardStore;
use super::engine::GrowthEngine;
use super::types::{EngagementSample, InteractionEvent};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};

/// Wire record accepted at the ingestion boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IngestMessage {
    Interaction(InteractionEvent),
    Sample(EngagementSample),
}

impl IngestMessage {
    /// Parse one JSONL line from a collector feed
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Run ingestion until the channel closes
///
/// Main loop:
/// 1. Receive records from collectors and apply them to the engine; a bad
///    record is logged and skipped, never blocks the stream
/// 2. On each flush tick: refresh the schedule, then write recent alerts,
///    a metrics snapshot and the recommended windows to the store
/// 3. On channel close: final flush, then return
pub async fn start_ingestion(
    mut rx: mpsc::Receiver<IngestMessage>,
    engine: Arc<Mutex<GrowthEngine>>,
    store: Arc<dyn DashboardStore>,
    flush_interval_ms: u64,
    alert_flush_limit: usize,
) {
    log::info!("🚀 Starting ingestion (flush interval: {}ms)", flush_interval_ms);

    let mut flush_timer = interval(Duration::from_millis(flush_interval_ms));
    let mut record_count = 0u64;
    let mut last_log_time = std::time::Instant::now();

    loop {
        tokio::select! {
            Some(message) = rx.recv() => {
                let now = chrono::Utc::now().timestamp();
                apply_message(&engine, message, now);
                record_count += 1;

                if last_log_time.elapsed().as_secs() >= 10 {
                    let per_sec = record_count as f64 / last_log_time.elapsed().as_secs_f64();
                    log::info!("📊 Ingestion rate: {:.1} records/sec", per_sec);
                    last_log_time = std::time::Instant::now();
                    record_count = 0;
                }
            }

            _ = flush_timer.tick() => {
                let now = chrono::Utc::now().timestamp();
                let flush_start = std::time::Instant::now();

                flush_once(&engine, &store, now, alert_flush_limit).await;

                log::debug!(
                    "✅ Flush complete | channel: {} queued | {}ms",
                    rx.len(),
                    flush_start.elapsed().as_millis()
                );
            }

            else => {
                log::warn!("⚠️  Ingestion channel closed, performing final flush");
                let now = chrono::Utc::now().timestamp();
                flush_once(&engine, &store, now, alert_flush_limit).await;
                break;
            }
        }
    }

    log::info!("✅ Ingestion stopped");
}

fn apply_message(engine: &Arc<Mutex<GrowthEngine>>, message: IngestMessage, now: i64) {
    let mut engine_guard = engine.lock().unwrap();
    let result = match message {
        IngestMessage::Interaction(event) => engine_guard.ingest_event(event, now),
        IngestMessage::Sample(sample) => engine_guard.ingest_sample(sample, now),
    };

    match result {
        Ok(true) => {}
        Ok(false) => log::debug!("Duplicate record ignored"),
        // One bad record never blocks the stream
        Err(e) => log::warn!("⚠️  Record rejected: {}", e),
    }
}

async fn flush_once(
    engine: &Arc<Mutex<GrowthEngine>>,
    store: &Arc<dyn DashboardStore>,
    now: i64,
    alert_flush_limit: usize,
) {
    // 1. Lock once: refresh the schedule and snapshot everything to write
    let (alerts, metrics, windows) = {
        let mut engine_guard = engine.lock().unwrap();
        engine_guard.refresh_schedule(now);
        (
            engine_guard.get_alerts(alert_flush_limit),
            engine_guard.get_metrics(now),
            engine_guard.all_recommended_windows().to_vec(),
        )
    }; // Lock released before database writes

    // 2. Database writes with the engine unlocked
    if !alerts.is_empty() {
        if let Err(e) = store.write_alerts(alerts).await {
            log::error!("❌ Failed to write alerts: {}", e);
        }
    }

    match metrics {
        Ok(metrics) => {
            if let Err(e) = store.write_metrics_snapshot(now, &metrics).await {
                log::error!("❌ Failed to write metrics snapshot: {}", e);
            }
        }
        // A display state, not a failure: the dashboard shows "no data"
        Err(e) => log::debug!("Metrics snapshot skipped: {}", e),
    }

    if let Err(e) = store.replace_windows(windows).await {
        log::error!("❌ Failed to write recommended windows: {}", e);
    }
}
