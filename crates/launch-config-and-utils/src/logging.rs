//! Logging setup for the binary.

use crate::{CoreError, CoreResult, Paths};
use observability::LogConfig;

/// Install the JSONL file logger (plus stderr) under `paths.logs_dir()`.
///
/// `RUST_LOG` overrides `level`. Call once, from `main`.
pub fn init_logging(level: &str, paths: &Paths) -> CoreResult<()> {
    observability::init_with_config(LogConfig {
        service_name: "launch-notifier".into(),
        default_level: level.into(),
        log_path: Some(paths.log_file()),
        also_stderr: true,
    })
    .map_err(|e| CoreError::Logging(e.to_string()))?;
    Ok(())
}
