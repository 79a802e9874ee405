//! SQLite access off the async runtime.
//!
//! Every query runs on one `tokio-rusqlite` worker thread, so feed and mail
//! I/O never wait behind a blocking SQLite call.
//!
//! ```ignore
//! let db = AsyncDatabase::open(&paths.database_file()).await?;
//! let snapshot = db.call(|conn| queries::list_launches(conn)).await?;
//! ```

use crate::{migrations, DatabaseError, DatabaseResult};
use std::path::Path;
use tokio_rusqlite::Connection;
use tracing::{debug, info};

/// Map executor errors, keeping rusqlite errors intact.
fn from_tokio_rusqlite(e: tokio_rusqlite::Error) -> DatabaseError {
    match e {
        tokio_rusqlite::Error::Rusqlite(e) => DatabaseError::Sqlite(e),
        tokio_rusqlite::Error::Close(_) => DatabaseError::Connection("Connection closed".to_string()),
        other => DatabaseError::Connection(other.to_string()),
    }
}

/// Handle to the launch database.
///
/// Clones share one worker thread; queries from all clones run in FIFO order.
#[derive(Clone)]
pub struct AsyncDatabase {
    conn: Connection,
    path: String,
}

impl AsyncDatabase {
    /// Open (or create) the database file, switch to WAL and migrate.
    pub async fn open(path: &Path) -> DatabaseResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let path_str = path.to_string_lossy().to_string();
        info!(path = %path_str, "Opening launch database");

        let conn = Connection::open(path_str.clone())
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        conn.call(|conn| {
            conn.execute_batch(
                "
                PRAGMA journal_mode = WAL;
                PRAGMA synchronous = NORMAL;
                PRAGMA busy_timeout = 5000;
                ",
            )?;
            Ok(())
        })
        .await
        .map_err(from_tokio_rusqlite)?;

        Self::migrate(&conn).await?;
        info!(path = %path_str, "Launch database initialized");

        Ok(Self {
            conn,
            path: path_str,
        })
    }

    /// Open a private in-memory database (tests and dry runs without a file).
    pub async fn open_in_memory() -> DatabaseResult<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        Self::migrate(&conn).await?;
        Ok(Self {
            conn,
            path: ":memory:".to_string(),
        })
    }

    async fn migrate(conn: &Connection) -> DatabaseResult<()> {
        conn.call(|conn| {
            migrations::run_migrations(conn)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            Ok(())
        })
        .await
        .map_err(from_tokio_rusqlite)
    }

    /// Run `f` on the worker thread. Keep it to SQL and row mapping;
    /// anything slower starves every other query.
    pub async fn call<F, T>(&self, f: F) -> DatabaseResult<T>
    where
        F: FnOnce(&mut rusqlite::Connection) -> DatabaseResult<T> + Send + 'static,
        T: Send + 'static,
    {
        // The DatabaseResult rides inside tokio_rusqlite's Ok so our error
        // variants survive the trip back from the executor thread.
        let outer_result = self
            .conn
            .call(move |conn| Ok(f(conn)))
            .await;

        match outer_result {
            Ok(inner) => inner,
            Err(e) => Err(from_tokio_rusqlite(e)),
        }
    }

    /// Like [`call`](Self::call) for closures returning plain rusqlite results.
    pub async fn call_sqlite<F, T>(&self, f: F) -> DatabaseResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.conn
            .call(move |conn| Ok(f(conn)?))
            .await
            .map_err(from_tokio_rusqlite)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Round-trip a trivial query through the worker.
    pub async fn health_check(&self) -> DatabaseResult<()> {
        self.call_sqlite(|conn| conn.execute_batch("SELECT 1")).await?;
        debug!("Database health check passed");
        Ok(())
    }

    /// Wait for pending operations, then shut down the executor thread.
    pub async fn close(self) -> DatabaseResult<()> {
        self.conn
            .close()
            .await
            .map_err(|e| DatabaseError::Connection(format!("Failed to close database: {:?}", e)))?;
        info!(path = %self.path, "Database closed");
        Ok(())
    }
}
