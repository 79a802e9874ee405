//! Notifier configuration.

use crate::{CoreError, CoreResult, Paths};
use chrono::Weekday;
use launch_sync_core::DuplicatePolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_BROADCAST_DAY: &str = "monday";

pub const ENV_LOG_LEVEL: &str = "LAUNCH_NOTIFIER_LOG_LEVEL";
pub const ENV_FEED_URL: &str = "LAUNCH_NOTIFIER_FEED_URL";
pub const ENV_MAIL_API_KEY: &str = "LAUNCH_NOTIFIER_MAIL_API_KEY";
pub const ENV_SMTP_PASSWORD: &str = "LAUNCH_NOTIFIER_SMTP_PASSWORD";

/// How mail leaves the process. Without it mail is only logged.
///
/// ```json
/// "mail": { "transport": "smtp", "host": "smtp.example.com", "user": "me@example.com" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "transport", rename_all = "snake_case")]
pub enum MailConfig {
    Http(HttpMailConfig),
    Smtp(SmtpMailConfig),
}

/// JSON mail API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpMailConfig {
    /// Endpoint receiving `{from,to,subject,html}` POSTs.
    pub endpoint: String,
    /// Bearer key. Usually supplied via `LAUNCH_NOTIFIER_MAIL_API_KEY`.
    #[serde(default)]
    pub api_key: String,
    /// Sender address.
    pub from: String,
}

/// SMTP submission settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpMailConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Login, and the sender when `from` is empty.
    #[serde(default)]
    pub user: String,
    /// Usually supplied via `LAUNCH_NOTIFIER_SMTP_PASSWORD`.
    #[serde(default)]
    pub pass: String,
    #[serde(default)]
    pub from: String,
    /// STARTTLS. Turn off only for local test servers.
    #[serde(default = "default_smtp_tls")]
    pub tls: bool,
}

fn default_smtp_port() -> u16 {
    launch_mailer::DEFAULT_SMTP_PORT
}

fn default_smtp_tls() -> bool {
    true
}

/// Stored in `<base>/config.json`; every field is optional on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Launch Library `launches` endpoint.
    #[serde(default = "default_feed_url")]
    pub feed_url: String,
    /// Weekday on which everyone gets the full window instead of a diff.
    #[serde(default = "default_broadcast_day")]
    pub broadcast_day: String,
    /// What to do when the feed repeats a launch id.
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail: Option<MailConfig>,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_feed_url() -> String {
    launch_feed::DEFAULT_FEED_URL.to_string()
}

fn default_broadcast_day() -> String {
    DEFAULT_BROADCAST_DAY.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            feed_url: default_feed_url(),
            broadcast_day: default_broadcast_day(),
            duplicate_policy: DuplicatePolicy::default(),
            mail: None,
        }
    }
}

impl Config {
    /// Load `<base>/config.json` (defaults when absent), then apply
    /// environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();
        let mut config = if config_path.exists() {
            info!(path = %config_path.display(), "Loading config");
            Self::load_from_file(&config_path)?
        } else {
            debug!(path = %config_path.display(), "No config file, using defaults");
            Self::default()
        };
        config.load_from_env();
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    fn load_from_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`. Empty values are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            debug!(var = ENV_LOG_LEVEL, level = %level, "Config override from environment");
            self.log_level = level;
        }
        if let Some(url) = lookup(ENV_FEED_URL) {
            debug!(var = ENV_FEED_URL, url = %url, "Config override from environment");
            self.feed_url = url;
        }
        // Secrets: log which variable applied, never the value.
        match self.mail.as_mut() {
            Some(MailConfig::Http(http)) => {
                if let Some(key) = lookup(ENV_MAIL_API_KEY) {
                    debug!(var = ENV_MAIL_API_KEY, "Config override from environment");
                    http.api_key = key;
                }
            }
            Some(MailConfig::Smtp(smtp)) => {
                if let Some(pass) = lookup(ENV_SMTP_PASSWORD) {
                    debug!(var = ENV_SMTP_PASSWORD, "Config override from environment");
                    smtp.pass = pass;
                }
            }
            None => {}
        }
    }

    pub fn feed_url(&self) -> CoreResult<Url> {
        Ok(Url::parse(&self.feed_url)?)
    }

    pub fn broadcast_weekday(&self) -> CoreResult<Weekday> {
        parse_weekday(&self.broadcast_day)
    }

    /// Check everything a run depends on before touching the network.
    pub fn validate(&self) -> CoreResult<()> {
        self.feed_url()?;
        self.broadcast_weekday()?;
        match &self.mail {
            Some(MailConfig::Http(http)) => {
                Url::parse(&http.endpoint)?;
                if http.from.trim().is_empty() {
                    return Err(CoreError::Config("mail.from is empty".to_string()));
                }
            }
            Some(MailConfig::Smtp(smtp)) => {
                if smtp.host.trim().is_empty() {
                    return Err(CoreError::Config("mail.host is empty".to_string()));
                }
                if smtp.port == 0 {
                    return Err(CoreError::Config("mail.port must be non-zero".to_string()));
                }
                if smtp.from.trim().is_empty() && smtp.user.trim().is_empty() {
                    return Err(CoreError::Config(
                        "mail needs a user or a from address".to_string(),
                    ));
                }
            }
            None => {}
        }
        Ok(())
    }
}

/// Accepts full or three-letter weekday names in any case.
pub fn parse_weekday(raw: &str) -> CoreResult<Weekday> {
    raw.trim()
        .parse::<Weekday>()
        .map_err(|_| CoreError::Config(format!("invalid weekday: {raw:?}")))
}
