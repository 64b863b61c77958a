//! Production implementations backed by Tokio.

use crate::{DatasetSource, EnvError, PlaybackClock};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Wall-clock playback pacing.
///
/// Sleeps really sleep, so a 60 Hz loop renders at 60 Hz.
pub struct TokioClock {
    /// Start time for monotonic duration calculations
    start: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Creates an Arc-wrapped clock for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlaybackClock for TokioClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn is_realtime(&self) -> bool {
        true
    }
}

/// A dataset JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DatasetSource for FileSource {
    async fn fetch(&self) -> Result<Vec<u8>, EnvError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| EnvError::io(self.location(), e))?;
        if bytes.is_empty() {
            return Err(EnvError::Empty(self.location()));
        }
        Ok(bytes)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tokio_clock_time() {
        let clock = TokioClock::new();
        let t1 = clock.now();
        clock.sleep(Duration::from_millis(10)).await;
        let t2 = clock.now();

        assert!(t2 > t1);
        assert!(t2 - t1 >= Duration::from_millis(10));
        assert!(clock.is_realtime());
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let source = FileSource::new("/definitely/not/here/waypoints.json");
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, EnvError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_file_source_reads_bytes() {
        let path = std::env::temp_dir().join(format!("skyreplay_env_{}.json", std::process::id()));
        tokio::fs::write(&path, br#"{"framerate":30,"drones":[]}"#).await.unwrap();

        let source = FileSource::new(&path);
        let bytes = source.fetch().await.unwrap();
        assert!(bytes.starts_with(b"{\"framerate\""));

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
