//! Error types for a reconciliation run.
//!
//! Only [`SyncError`] aborts a run. [`StoreError`] and [`SendError`] are
//! per-record / per-recipient and end up in the run report instead.

use crate::types::LaunchId;
use thiserror::Error;

/// The feed (or subscription list) could not be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct FetchError(pub String);

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A single store operation failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct StoreError(pub String);

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A message could not be delivered to one recipient.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct SendError(pub String);

impl SendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Fatal run error.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Feed unreachable or malformed
    #[error("Feed fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Incoming set lists an identifier twice under the reject policy
    #[error("Duplicate launch identifier in feed: {0}")]
    DuplicateLaunch(LaunchId),

    /// Snapshot could not be read, so there is no baseline to diff against
    #[error("Snapshot read failed: {0}")]
    Snapshot(StoreError),

    /// Subscription list could not be read
    #[error("Subscription list unavailable: {0}")]
    SubscriptionList(FetchError),

    /// Subscriber table could not be read
    #[error("Subscriber list failed: {0}")]
    Subscribers(StoreError),
}

/// Result type alias using SyncError.
pub type SyncResult<T> = Result<T, SyncError>;
