//! Launch Library REST client.

use crate::error::{FeedError, FeedResult};
use crate::models::parse_launch_response;
use crate::window::{upcoming_week, FeedWindow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use launch_sync_core::{FeedSource, FetchError, LaunchRecord};
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

/// Launch Library 2 `launches` endpoint.
pub const DEFAULT_FEED_URL: &str = "https://ll.thespacedevs.com/2.3.0/launches";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const ERROR_BODY_LIMIT: usize = 512;

/// Fetches the launches scheduled in the upcoming week.
#[derive(Clone)]
pub struct LaunchLibraryClient {
    http_client: reqwest::Client,
    api_url: String,
}

impl LaunchLibraryClient {
    /// Create a client for the endpoint at `api_url`
    /// (e.g. `https://ll.thespacedevs.com/2.3.0/launches`).
    pub fn new(api_url: impl Into<String>) -> FeedResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("launch-notifier/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http_client,
            api_url: api_url.into(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Build the list query for `window`.
    pub fn window_url(&self, window: &FeedWindow) -> FeedResult<Url> {
        let base = format!("{}/", self.api_url.trim_end_matches('/'));
        let mut url = Url::parse(&base)
            .map_err(|e| FeedError::Config(format!("invalid feed URL {}: {e}", self.api_url)))?;
        url.query_pairs_mut()
            .append_pair("window_start__gt", &window.start_param())
            .append_pair("window_end__lt", &window.end_param())
            .append_pair("mode", "list");
        Ok(url)
    }

    /// Fetch every launch inside `window`.
    pub async fn fetch_window(&self, window: &FeedWindow) -> FeedResult<Vec<LaunchRecord>> {
        let url = self.window_url(window)?;
        debug!(%url, "Fetching launch window");

        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(status = %status, "Launch feed request failed");
            return Err(FeedError::Api {
                status: status.as_u16(),
                message: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let launches = parse_launch_response(&body)?;
        info!(
            count = launches.len(),
            start = %window.start_param(),
            end = %window.end_param(),
            "Fetched launch window"
        );
        Ok(launches)
    }
}

#[async_trait]
impl FeedSource for LaunchLibraryClient {
    async fn fetch_current_window(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<LaunchRecord>, FetchError> {
        let window = upcoming_week(now);
        Ok(self.fetch_window(&window).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn window() -> FeedWindow {
        upcoming_week(Utc.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap())
    }

    #[test]
    fn window_url_carries_bounds_and_list_mode() {
        let client = LaunchLibraryClient::new(DEFAULT_FEED_URL).unwrap();
        let url = client.window_url(&window()).unwrap();

        assert_eq!(url.path(), "/2.3.0/launches/");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("window_start__gt".into(), "2025-03-10T00:00:00Z".into()),
                ("window_end__lt".into(), "2025-03-16T23:59:59Z".into()),
                ("mode".into(), "list".into()),
            ]
        );
    }

    #[test]
    fn trailing_slash_is_not_doubled() {
        let client = LaunchLibraryClient::new("https://example.test/launches/").unwrap();
        assert_eq!(client.window_url(&window()).unwrap().path(), "/launches/");
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let client = LaunchLibraryClient::new("not a url").unwrap();
        assert!(matches!(
            client.window_url(&window()),
            Err(FeedError::Config(_))
        ));
    }
}
