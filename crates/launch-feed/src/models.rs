//! Launch Library response shapes.

use crate::{FeedError, FeedResult};
use chrono::{DateTime, Timelike, Utc};
use launch_sync_core::LaunchRecord;
use serde::{Deserialize, Serialize};

/// Top-level `launches/?mode=list` response. Only `results` is read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchApiResponse {
    #[serde(default)]
    pub results: Vec<ApiLaunch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiLaunch {
    pub id: String,
    pub name: String,
    pub status: ApiStatus,
    pub net: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiStatus {
    pub name: String,
}

impl ApiLaunch {
    /// Convert to a core record, normalizing `net` to UTC whole seconds.
    pub fn into_record(self) -> FeedResult<LaunchRecord> {
        let net = DateTime::parse_from_rfc3339(&self.net)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .and_then(|dt| dt.with_nanosecond(0))
            .ok_or_else(|| FeedError::InvalidTime {
                id: self.id.clone(),
                value: self.net.clone(),
            })?;
        Ok(LaunchRecord::new(self.id, self.name, net, self.status.name))
    }
}

/// Parse a response body into launch records.
///
/// One bad timestamp fails the whole feed.
pub fn parse_launch_response(body: &str) -> FeedResult<Vec<LaunchRecord>> {
    let response: LaunchApiResponse = serde_json::from_str(body)?;
    response
        .results
        .into_iter()
        .map(ApiLaunch::into_record)
        .collect()
}
