use {
    crate::pipeline::{EngagementSample, GrowthEngine, InteractionEvent},
    serde::{Deserialize, Serialize},
    std::{fs, path::Path, time::Duration},
    tokio::time::interval,
};

/// Persistence configuration
pub struct PersistenceConfig {
    pub file_path: String,
    pub autosave_interval: Duration,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            file_path: "events.json".to_string(),
            autosave_interval: Duration::from_secs(60),
        }
    }
}

/// Snapshot of the retained log for persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSnapshot {
    pub events: Vec<InteractionEvent>,
    pub samples: Vec<EngagementSample>,
    pub timestamp: i64,
}

/// Save a log snapshot to a JSON file
pub fn save_snapshot(
    events: &[InteractionEvent],
    samples: &[EngagementSample],
    file_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = LogSnapshot {
        events: events.to_vec(),
        samples: samples.to_vec(),
        timestamp: crate::current_timestamp(),
    };

    let json = serde_json::to_string_pretty(&snapshot)?;
    fs::write(file_path, json)?;

    log::debug!(
        "Saved {} events and {} samples to {}",
        events.len(),
        samples.len(),
        file_path
    );
    Ok(())
}

/// Load a log snapshot from a JSON file
pub fn load_snapshot(
    file_path: &str,
) -> Result<(Vec<InteractionEvent>, Vec<EngagementSample>), Box<dyn std::error::Error>> {
    if !Path::new(file_path).exists() {
        log::info!("No existing snapshot file found: {}", file_path);
        return Ok((Vec::new(), Vec::new()));
    }

    let json = fs::read_to_string(file_path)?;
    let snapshot: LogSnapshot = serde_json::from_str(&json)?;

    log::info!(
        "Loaded {} events and {} samples from {}",
        snapshot.events.len(),
        snapshot.samples.len(),
        file_path
    );
    Ok((snapshot.events, snapshot.samples))
}

/// Background task that periodically saves a log snapshot
pub async fn persistence_task(
    engine: std::sync::Arc<std::sync::Mutex<GrowthEngine>>,
    config: PersistenceConfig,
) {
    let mut interval_timer = interval(config.autosave_interval);

    loop {
        interval_timer.tick().await;

        let (events, samples) = {
            let engine_guard = engine.lock().unwrap();
            engine_guard.snapshot()
        };

        if let Err(e) = save_snapshot(&events, &samples, &config.file_path) {
            log::warn!("Failed to save snapshot: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::InteractionKind;
    use tempfile::tempdir;

    #[test]
    fn test_snapshot_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.json");
        let path_str = path.to_str().unwrap();

        let events = vec![InteractionEvent {
            id: "e1".to_string(),
            kind: InteractionKind::Reel,
            timestamp: 1_754_000_000,
            actor: "growth_account".to_string(),
        }];
        let samples = vec![EngagementSample {
            timestamp: 1_754_000_060,
            follower_count: 1234,
            impressions: 2567,
            engagement_rate: 4.8,
        }];

        save_snapshot(&events, &samples, path_str).unwrap();
        let (loaded_events, loaded_samples) = load_snapshot(path_str).unwrap();

        assert_eq!(loaded_events.len(), 1);
        assert_eq!(loaded_events[0].id, "e1");
        assert_eq!(loaded_events[0].kind, InteractionKind::Reel);
        assert_eq!(loaded_samples.len(), 1);
        assert_eq!(loaded_samples[0].follower_count, 1234);
    }

    #[test]
    fn test_missing_snapshot_is_empty() {
        let (events, samples) = load_snapshot("/nonexistent/events.json").unwrap();
        assert!(events.is_empty());
        assert!(samples.is_empty());
    }
}
