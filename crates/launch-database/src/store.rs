//! `LaunchStore` and `SubscriberStore` on top of [`AsyncDatabase`].

use crate::{queries, AsyncDatabase, DatabaseResult};
use async_trait::async_trait;
use launch_sync_core::{
    LaunchId, LaunchRecord, LaunchStore, StoreError, Subscriber, SubscriberDelta, SubscriberStore,
};

/// SQLite-backed snapshot and subscriber table.
#[derive(Clone)]
pub struct SqliteStore {
    db: AsyncDatabase,
}

impl SqliteStore {
    pub fn new(db: AsyncDatabase) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &AsyncDatabase {
        &self.db
    }

    /// (stored launches, stored subscribers)
    pub async fn counts(&self) -> DatabaseResult<(i64, i64)> {
        self.db
            .call(|conn| {
                Ok((
                    queries::count_launches(conn)?,
                    queries::count_subscribers(conn)?,
                ))
            })
            .await
    }
}

#[async_trait]
impl LaunchStore for SqliteStore {
    async fn read_all(&self) -> Result<Vec<LaunchRecord>, StoreError> {
        Ok(self.db.call(|conn| queries::list_launches(conn)).await?)
    }

    async fn insert(&self, record: &LaunchRecord) -> Result<(), StoreError> {
        let record = record.clone();
        Ok(self
            .db
            .call(move |conn| queries::insert_launch(conn, &record))
            .await?)
    }

    async fn update(&self, record: &LaunchRecord) -> Result<(), StoreError> {
        let record = record.clone();
        Ok(self
            .db
            .call(move |conn| queries::update_launch(conn, &record))
            .await?)
    }

    async fn delete(&self, id: &LaunchId) -> Result<(), StoreError> {
        let id = id.clone();
        Ok(self
            .db
            .call(move |conn| queries::delete_launch(conn, id.as_str()))
            .await?)
    }
}

#[async_trait]
impl SubscriberStore for SqliteStore {
    async fn list_subscribers(&self) -> Result<Vec<Subscriber>, StoreError> {
        Ok(self.db.call(|conn| queries::list_subscribers(conn)).await?)
    }

    async fn reconcile_subscribers(
        &self,
        addresses: &[String],
    ) -> Result<SubscriberDelta, StoreError> {
        let addresses = addresses.to_vec();
        Ok(self
            .db
            .call(move |conn| queries::reconcile_subscribers(conn, &addresses))
            .await?)
    }

    async fn mark_all_existing(&self) -> Result<usize, StoreError> {
        Ok(self
            .db
            .call(|conn| queries::mark_all_subscribers_existing(conn))
            .await?)
    }
}
