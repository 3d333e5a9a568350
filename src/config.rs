use std::env;

/// Runtime configuration loaded from environment variables
///
/// Core rate/schedule settings live in `pipeline::CoreConfig`; this covers
/// the process-level wiring only.
pub struct Config {
    pub feed_path: String,
    pub db_path: String,
    pub snapshot_path: String,
    pub channel_buffer: usize,
    pub flush_interval_ms: u64,
    pub autosave_interval_secs: u64,
    pub rust_log: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `GRAMFLOW_FEED_PATH` (default: feed.jsonl)
    /// - `GRAMFLOW_DB_PATH` (default: gramflow.db)
    /// - `GRAMFLOW_SNAPSHOT_PATH` (default: events.json)
    /// - `GRAMFLOW_CHANNEL_BUFFER` (default: 1000)
    /// - `GRAMFLOW_FLUSH_INTERVAL_MS` (default: 5000)
    /// - `GRAMFLOW_AUTOSAVE_SECS` (default: 60)
    pub fn from_env() -> Self {
        Self {
            feed_path: env::var("GRAMFLOW_FEED_PATH")
                .unwrap_or_else(|_| "feed.jsonl".to_string()),

            db_path: env::var("GRAMFLOW_DB_PATH").unwrap_or_else(|_| "gramflow.db".to_string()),

            snapshot_path: env::var("GRAMFLOW_SNAPSHOT_PATH")
                .unwrap_or_else(|_| "events.json".to_string()),

            channel_buffer: env::var("GRAMFLOW_CHANNEL_BUFFER")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1_000),

            flush_interval_ms: env::var("GRAMFLOW_FLUSH_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5_000),

            autosave_interval_secs: env::var("GRAMFLOW_AUTOSAVE_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),

            rust_log: env::var("RUST_LOG").ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        env::remove_var("GRAMFLOW_FEED_PATH");
        env::remove_var("GRAMFLOW_DB_PATH");
        env::remove_var("GRAMFLOW_CHANNEL_BUFFER");

        let config = Config::from_env();

        assert_eq!(config.feed_path, "feed.jsonl");
        assert_eq!(config.db_path, "gramflow.db");
        assert_eq!(config.channel_buffer, 1_000);
        assert_eq!(config.flush_interval_ms, 5_000);
    }
}
