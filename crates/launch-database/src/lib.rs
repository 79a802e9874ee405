//! SQLite persistence for launch snapshots and subscribers.
//!
//! This crate provides:
//! - Async SQLite executor with a dedicated thread
//! - Versioned migrations for the `launches` and `subscribers` tables
//! - Query helpers that work on any `&Connection`
//! - [`SqliteStore`], the `LaunchStore` / `SubscriberStore` implementation
//!
//! # Architecture
//!
//! The `AsyncDatabase` uses a single dedicated thread for all SQLite operations.
//! Queries are sent through a channel and executed in FIFO order.
//!
//! ```ignore
//! let db = AsyncDatabase::open(path).await?;
//! let launches = db.call(|conn| queries::list_launches(conn)).await?;
//! ```
//!
//! **Important**: Only SQL operations should run inside `db.call()`.

mod error;
mod executor;
mod migrations;
pub mod queries;
mod store;

pub use error::{DatabaseError, DatabaseResult};
pub use executor::AsyncDatabase;
pub use migrations::{run_migrations, CURRENT_VERSION};
pub use store::SqliteStore;
