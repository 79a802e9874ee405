//! Error types for mail delivery.

use launch_sync_core::SendError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    /// Connection, timeout or TLS failure talking to the mail API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The mail API rejected the message.
    #[error("Mail API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Connection, TLS, auth or protocol failure talking to the SMTP server.
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Could not build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type MailResult<T> = Result<T, MailError>;

impl From<MailError> for SendError {
    fn from(e: MailError) -> Self {
        SendError::new(e.to_string())
    }
}
