//! Production runtime: feed collector + ingestion loop + dashboard store

use gramflow::collector;
use gramflow::config::Config;
use gramflow::persistence::{self, PersistenceConfig};
use gramflow::pipeline::{
    CoreConfig, DashboardStore, GrowthEngine, IngestMessage, SqliteDashboardStore,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();

    let mut builder = if config.rust_log.is_some() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
    } else {
        env_logger::Builder::from_default_env()
    };
    builder.target(env_logger::Target::Stderr).init();

    let core_config = CoreConfig::from_env();
    // Invalid configuration is fatal: never start with partial limits
    if let Err(e) = core_config.validate() {
        log::error!("❌ Invalid configuration: {}", e);
        return Err(Box::new(e) as Box<dyn std::error::Error>);
    }

    log::info!("🚀 Starting gramflow...");
    log::info!("📊 Configuration:");
    log::info!("   Feed: {}", config.feed_path);
    log::info!("   Database: {}", config.db_path);
    log::info!("   Snapshot: {}", config.snapshot_path);
    log::info!("   Flush interval: {}ms", config.flush_interval_ms);

    let store: Arc<dyn DashboardStore> = Arc::new(SqliteDashboardStore::new(&config.db_path)?);

    let engine = Arc::new(Mutex::new(GrowthEngine::new(core_config)));

    // Restore the retained log from the previous run (if any)
    if let Ok((events, samples)) = persistence::load_snapshot(&config.snapshot_path) {
        let now = gramflow::current_timestamp();
        let mut engine_guard = engine.lock().unwrap();
        let mut restored = 0usize;
        for event in events {
            if engine_guard.ingest_event(event, now).is_ok() {
                restored += 1;
            }
        }
        for sample in samples {
            if engine_guard.ingest_sample(sample, now).is_ok() {
                restored += 1;
            }
        }
        log::info!("Restored {} records from snapshot", restored);
    }

    // Bounded channel for collector records (backpressure handling)
    let (tx, rx) = mpsc::channel::<IngestMessage>(config.channel_buffer);

    let feed_path = PathBuf::from(&config.feed_path);
    tokio::spawn(async move {
        collector::collector_task(feed_path, tx).await;
    });

    let engine_for_persistence = engine.clone();
    let persistence_config = PersistenceConfig {
        file_path: config.snapshot_path.clone(),
        autosave_interval: std::time::Duration::from_secs(config.autosave_interval_secs),
    };
    tokio::spawn(async move {
        persistence::persistence_task(engine_for_persistence, persistence_config).await;
    });

    log::info!("✅ Pipeline configured, starting ingestion...");

    let ingestion_engine = engine.clone();
    tokio::select! {
        _ = gramflow::pipeline::ingestion::start_ingestion(
            rx,
            ingestion_engine,
            store,
            config.flush_interval_ms,
            50,
        ) => {
            log::info!("Ingestion loop exited");
        }
        _ = tokio::signal::ctrl_c() => {
            log::info!("Shutdown signal received");
        }
    }

    // Final snapshot before exit
    let (events, samples) = {
        let engine_guard = engine.lock().unwrap();
        engine_guard.snapshot()
    };
    if let Err(e) = persistence::save_snapshot(&events, &samples, &config.snapshot_path) {
        log::warn!("Failed to save final snapshot: {}", e);
    }

    log::info!("✅ Shutdown complete");
    Ok(())
}
