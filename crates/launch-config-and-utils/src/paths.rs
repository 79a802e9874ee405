//! File system layout.

use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Everything the notifier reads or writes lives under one base directory.
#[derive(Debug, Clone)]
pub struct Paths {
    /// `~/.launch-notifier` unless overridden.
    base_dir: PathBuf,
}

impl Paths {
    /// Use `~/.launch-notifier`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;
        Ok(Self {
            base_dir: home.join(".launch-notifier"),
        })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Launch snapshot and subscriber table.
    pub fn database_file(&self) -> PathBuf {
        self.base_dir.join("launches.sqlite")
    }

    /// Default subscription list (`{"emailReceivers":[...]}`).
    pub fn subscribers_file(&self) -> PathBuf {
        self.base_dir.join("subscribers.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join(observability::DEFAULT_LOG_FILE)
    }

    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}
