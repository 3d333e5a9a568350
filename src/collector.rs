//! JSONL feed collector with file rotation detection
//!
//! The platform poller appends interaction events and engagement samples as
//! JSONL to a feed file; this tails it and forwards parsed records to the
//! ingestion channel. A malformed line is logged and skipped, never stops
//! the feed.

use crate::pipeline::{IngestMessage, InvalidEvent};
use std::io::SeekFrom;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::sleep;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

pub struct FeedTailer {
    path: PathBuf,
    file: Option<BufReader<File>>,
    inode: Option<u64>,
    poll_interval: Duration,
}

impl FeedTailer {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            file: None,
            inode: None,
            poll_interval: Duration::from_millis(100),
        }
    }

    /// Start tailing the feed (seeks to end)
    pub async fn start(&mut self) -> std::io::Result<()> {
        let file = File::open(&self.path).await?;

        #[cfg(unix)]
        {
            let metadata = file.metadata().await?;
            self.inode = Some(metadata.ino());
        }

        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::End(0)).await?;
        self.file = Some(reader);

        log::info!("📖 Started tailing feed: {}", self.path.display());
        Ok(())
    }

    /// Read the next non-empty line, waiting if necessary
    pub async fn read_line(&mut self) -> std::io::Result<Option<String>> {
        loop {
            if self.detect_rotation().await? {
                log::info!("🔄 Feed rotation detected, reopening: {}", self.path.display());
                self.start().await?;
            }

            if let Some(ref mut reader) = self.file {
                let mut line = String::new();
                match reader.read_line(&mut line).await? {
                    0 => {
                        sleep(self.poll_interval).await;
                        continue;
                    }
                    _ => {
                        if !line.trim().is_empty() {
                            return Ok(Some(line.trim().to_string()));
                        }
                        continue;
                    }
                }
            } else {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Feed not opened",
                ));
            }
        }
    }

    /// Detect whether the feed file was rotated (inode changed)
    async fn detect_rotation(&self) -> std::io::Result<bool> {
        #[cfg(unix)]
        {
            let metadata = tokio::fs::metadata(&self.path).await?;
            let current_inode = metadata.ino();
            Ok(self.inode.map_or(false, |old| old != current_inode))
        }

        #[cfg(not(unix))]
        {
            if let Some(ref file) = self.file {
                let current_pos = file.get_ref().stream_position().await?;
                let metadata = tokio::fs::metadata(&self.path).await?;
                Ok(metadata.len() < current_pos)
            } else {
                Ok(false)
            }
        }
    }
}

/// Tail the feed file and forward parsed records to the ingestion channel
///
/// Runs until the channel is closed on the receiving side.
pub async fn collector_task(path: PathBuf, tx: mpsc::Sender<IngestMessage>) {
    let mut tailer = FeedTailer::new(path.clone());

    if let Err(e) = tailer.start().await {
        log::error!("❌ Cannot open feed {}: {}", path.display(), e);
        return;
    }

    loop {
        match tailer.read_line().await {
            Ok(Some(line)) => match IngestMessage::from_jsonl(&line) {
                Ok(message) => {
                    if tx.send(message).await.is_err() {
                        log::warn!("Ingestion channel closed, stopping collector");
                        break;
                    }
                }
                Err(e) => {
                    // Per-record isolation: skip the line, keep the feed alive
                    let rejected = InvalidEvent::MalformedRecord(e.to_string());
                    log::warn!("⚠️  Skipping feed line: {}", rejected);
                }
            },
            Ok(None) => continue,
            Err(e) => {
                log::error!("❌ Feed read error: {}", e);
                sleep(Duration::from_secs(1)).await;
            }
        }
    }
}
