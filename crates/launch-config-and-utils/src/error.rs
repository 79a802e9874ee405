//! Configuration and setup errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Home directory could not be determined.
    #[error("Path error: {0}")]
    Path(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
