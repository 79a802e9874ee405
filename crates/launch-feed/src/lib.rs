//! Feed and subscription sources.
//!
//! - [`LaunchLibraryClient`] fetches the upcoming week from the Launch Library API
//! - [`JsonFileFeed`] reads the same response shape from disk
//! - [`JsonSubscriptionSource`] reads the subscriber address list
//!
//! All three implement the collaborator traits from `launch-sync-core`.

mod client;
mod error;
mod file;
mod models;
mod subscriptions;
mod window;

pub use client::{LaunchLibraryClient, DEFAULT_FEED_URL};
pub use error::{FeedError, FeedResult};
pub use file::JsonFileFeed;
pub use models::{parse_launch_response, ApiLaunch, ApiStatus, LaunchApiResponse};
pub use subscriptions::{parse_subscription_list, JsonSubscriptionSource};
pub use window::{upcoming_week, FeedWindow};
