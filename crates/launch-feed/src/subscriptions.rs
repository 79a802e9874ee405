//! Subscriber address list read from JSON.

use crate::error::FeedResult;
use async_trait::async_trait;
use launch_sync_core::{FetchError, SubscriptionSource};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionList {
    #[serde(default)]
    email_receivers: Vec<Receiver>,
}

#[derive(Debug, Deserialize)]
struct Receiver {
    #[serde(default)]
    email: String,
}

/// Parse `{"emailReceivers":[{"email":"..."}]}` into addresses.
///
/// Addresses are trimmed; blanks are dropped and repeats keep their first
/// position.
pub fn parse_subscription_list(body: &str) -> FeedResult<Vec<String>> {
    let list: SubscriptionList = serde_json::from_str(body)?;
    let mut seen = HashSet::new();
    Ok(list
        .email_receivers
        .into_iter()
        .map(|r| r.email.trim().to_string())
        .filter(|email| !email.is_empty())
        .filter(|email| seen.insert(email.clone()))
        .collect())
}

/// Reads the address list from a file each run.
#[derive(Debug, Clone)]
pub struct JsonSubscriptionSource {
    path: PathBuf,
}

impl JsonSubscriptionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> FeedResult<Vec<String>> {
        let body = tokio::fs::read_to_string(&self.path).await?;
        let addresses = parse_subscription_list(&body)?;
        debug!(path = %self.path.display(), count = addresses.len(), "Loaded subscription list");
        Ok(addresses)
    }
}

#[async_trait]
impl SubscriptionSource for JsonSubscriptionSource {
    async fn current_addresses(&self) -> Result<Vec<String>, FetchError> {
        Ok(self.load().await?)
    }
}
