//! Feed read from a JSON file on disk.

use crate::error::FeedResult;
use crate::models::parse_launch_response;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use launch_sync_core::{FeedSource, FetchError, LaunchRecord};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads a saved Launch Library response. Used for offline and dry runs.
#[derive(Debug, Clone)]
pub struct JsonFileFeed {
    path: PathBuf,
}

impl JsonFileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> FeedResult<Vec<LaunchRecord>> {
        let body = tokio::fs::read_to_string(&self.path).await?;
        let launches = parse_launch_response(&body)?;
        debug!(path = %self.path.display(), count = launches.len(), "Loaded feed file");
        Ok(launches)
    }
}

#[async_trait]
impl FeedSource for JsonFileFeed {
    async fn fetch_current_window(
        &self,
        _now: DateTime<Utc>,
    ) -> Result<Vec<LaunchRecord>, FetchError> {
        Ok(self.load().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn reads_saved_response() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feed.json");
        std::fs::write(
            &path,
            r#"{"results":[{"id":"a","name":"Alpha","status":{"name":"Go"},"net":"2025-03-10T09:00:00Z"}]}"#,
        )
        .unwrap();

        let launches = JsonFileFeed::new(&path)
            .fetch_current_window(Utc::now())
            .await.unwrap();
        assert_eq!(launches.len(), 1);
        assert_eq!(launches[0].id.as_str(), "a");
    }

    #[tokio::test]
    async fn missing_file_is_a_fetch_error() {
        let dir = tempdir().unwrap();
        let feed = JsonFileFeed::new(dir.path().join("absent.json"));
        assert!(feed.fetch_current_window(Utc::now()).await.is_err());
    }
}
