//! Fix source - injected asynchronous stream of raw GPS fixes
//!
//! The engine never talks to a platform location SDK directly; it consumes
//! a `FixSource`, and each subscription is an independent bounded channel.
//! Dropping the receiver ends the subscription.

use crate::domain::types::{epoch_ms, RawFix};
use anyhow::Context;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

/// Why a subscription could not be opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location services unavailable")]
    Unavailable,
}

/// Stream of raw fixes for one subscription
pub type FixStream = mpsc::Receiver<RawFix>;

/// Asynchronous source of location fixes.
///
/// Fixes arrive at irregular intervals, best-effort; an implementation that
/// delivers nothing is valid (the route simply does not grow).
#[async_trait]
pub trait FixSource: Send + Sync {
    async fn subscribe(&self) -> Result<FixStream, LocationError>;
}

/// Replays coordinates from a JSONL file (one fix per line) at a fixed
/// interval. Timestamps are stamped at send time so the replayed walk looks
/// live to the engine; the file's own timestamps are ignored.
pub struct ReplayFixSource {
    path: PathBuf,
    interval: Duration,
}

impl ReplayFixSource {
    pub fn new(path: &str, interval_ms: u64) -> Self {
        info!(path = %path, interval_ms = %interval_ms, "replay_source_initialized");
        Self { path: PathBuf::from(path), interval: Duration::from_millis(interval_ms) }
    }

    fn load(&self) -> anyhow::Result<Vec<RawFix>> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read replay file {}", self.path.display()))?;

        let mut fixes = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fix: RawFix = serde_json::from_str(line).with_context(|| {
                format!("invalid fix on line {} of {}", idx + 1, self.path.display())
            })?;
            fixes.push(fix);
        }
        Ok(fixes)
    }
}

#[async_trait]
impl FixSource for ReplayFixSource {
    async fn subscribe(&self) -> Result<FixStream, LocationError> {
        let fixes = match self.load() {
            Ok(fixes) => fixes,
            Err(e) => {
                warn!(error = %e, "replay_load_failed");
                return Err(LocationError::Unavailable);
            }
        };

        info!(fixes = %fixes.len(), "replay_subscription_opened");

        let (tx, rx) = mpsc::channel(64);
        let interval = self.interval;
        tokio::spawn(async move {
            for fix in fixes {
                sleep(interval).await;
                let stamped = RawFix { timestamp_ms: epoch_ms(), ..fix };
                if tx.send(stamped).await.is_err() {
                    // Subscriber unsubscribed
                    return;
                }
            }
            debug!("replay_finished");
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_replay_delivers_fixes_in_order() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"latitude":52.0,"longitude":21.0,"timestampMs":0}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"latitude":52.0009,"longitude":21.0,"timestampMs":0}}"#).unwrap();
        file.flush().unwrap();

        let source = ReplayFixSource::new(file.path().to_str().unwrap(), 1);
        let mut stream = source.subscribe().await.unwrap();

        let first = stream.recv().await.unwrap();
        let second = stream.recv().await.unwrap();
        assert_eq!(first.latitude, 52.0);
        assert_eq!(second.latitude, 52.0009);
        // Stamped at send time, not taken from the file
        assert!(first.timestamp_ms > 0);
        assert!(second.timestamp_ms >= first.timestamp_ms);

        // Replay exhausted
        assert!(stream.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let source = ReplayFixSource::new("/nonexistent/replay.jsonl", 1);
        assert_eq!(source.subscribe().await.unwrap_err(), LocationError::Unavailable);
    }

    #[tokio::test]
    async fn test_invalid_line_is_unavailable() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not a fix").unwrap();
        file.flush().unwrap();

        let source = ReplayFixSource::new(file.path().to_str().unwrap(), 1);
        assert_eq!(source.subscribe().await.unwrap_err(), LocationError::Unavailable);
    }
}
