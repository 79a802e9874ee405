//! # Observability
//!
//! One-call logging setup for the launch notifier.
//!
//! Binaries call [`init_with_config`] once at startup and use the `tracing`
//! macros everywhere else. Library crates never touch the subscriber.
//!
//! Output goes to an append-only JSONL file (one object per event) so a run
//! can be inspected after the fact:
//!
//! ```text
//! tail -f ~/.launch-notifier/logs/launch-notifier.jsonl | jq
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "launch-notifier".into(),
//!     default_level: "debug".into(),
//!     also_stderr: true,
//!     ..Default::default()
//! })?;
//! tracing::info!(launches = 12, "feed fetched");
//! ```

mod json_layer;
mod writer;

pub use json_layer::{JsonLayer, LogEntry};
pub use writer::{LogFileWriter, LogWriterFactory};

use std::io;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// File name used when no explicit log path is configured.
pub const DEFAULT_LOG_FILE: &str = "launch-notifier.jsonl";

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Written into every log line as `service`.
    pub service_name: String,

    /// Default filter (e.g. "debug", "info,launch_feed=trace").
    /// `RUST_LOG` wins when set.
    pub default_level: String,

    /// JSONL destination. Defaults to `~/.launch-notifier/logs/launch-notifier.jsonl`.
    pub log_path: Option<PathBuf>,

    /// Also print compact human-readable lines to stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "launch-notifier".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

fn default_log_path() -> io::Result<PathBuf> {
    dirs::home_dir()
        .map(|home| {
            home.join(".launch-notifier")
                .join("logs")
                .join(DEFAULT_LOG_FILE)
        })
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "home directory not found"))
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global subscriber. Returns the log file in use.
///
/// Fails if the log file cannot be opened or a subscriber is already set.
pub fn init_with_config(config: LogConfig) -> io::Result<PathBuf> {
    let log_path = match config.log_path.clone() {
        Some(path) => path,
        None => default_log_path()?,
    };

    let factory = LogWriterFactory::new(LogFileWriter::open(&log_path)?);
    let json_layer = JsonLayer::new(config.service_name.clone(), factory)
        .with_filter(env_filter(&config.default_level));

    let stderr_layer = config.also_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .compact()
            .with_writer(io::stderr)
            .with_filter(env_filter(&config.default_level))
    });

    tracing_subscriber::registry()
        .with(json_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        log_path = %log_path.display(),
        "observability initialized"
    );
    Ok(log_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_logs_info_to_file_only() {
        let config = LogConfig::default();
        assert_eq!(config.service_name, "launch-notifier");
        assert_eq!(config.default_level, "info");
        assert!(config.log_path.is_none());
        assert!(!config.also_stderr);
    }

    #[test]
    fn default_path_lives_under_home() {
        if let Ok(path) = default_log_path() {
            assert!(path.ends_with(".launch-notifier/logs/launch-notifier.jsonl"));
        }
    }
}
