//! Culture / Preference Repository
//!
//! One generic store serves both records; each lives in its own collection
//! with a unique index on `user_id`.

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::ReturnDocument,
    Collection, Database,
};
use tracing::debug;

use crate::profile::entity::ProfileRecord;
use crate::shared::deadline::bounded;
use crate::shared::error::{is_duplicate_key_error, PlatformError, Result};

#[async_trait]
pub trait ProfileStore<T: ProfileRecord>: Send + Sync {
    /// Merge `record` into the user's row, creating it if absent
    async fn upsert(&self, record: &T) -> Result<T>;

    async fn find_by_user(&self, user_id: &str) -> Result<Option<T>>;

    async fn find_by_users(&self, user_ids: &[String]) -> Result<Vec<T>>;
}

pub struct MongoProfileStore<T: ProfileRecord> {
    collection: Collection<T>,
    timeout: Duration,
}

impl<T: ProfileRecord> MongoProfileStore<T> {
    pub fn new(db: &Database, timeout: Duration) -> Self {
        Self {
            collection: db.collection(T::COLLECTION),
            timeout,
        }
    }

    async fn upsert_once(&self, user_id: &str, set: &Document) -> mongodb::error::Result<Option<T>> {
        self.collection
            .find_one_and_update(doc! { "user_id": user_id }, doc! { "$set": set.clone() })
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
    }
}

#[async_trait]
impl<T: ProfileRecord> ProfileStore<T> for MongoProfileStore<T> {
    async fn upsert(&self, record: &T) -> Result<T> {
        bounded(self.timeout, "profile.upsert", async {
            let set = bson::to_document(record)?;
            let stored = match self.upsert_once(record.user_id(), &set).await {
                // Two concurrent first upserts race on the unique index; the
                // loser retries against the row the winner created
                Err(e) if is_duplicate_key_error(&e) => {
                    debug!(entity = T::ENTITY, user_id = record.user_id(), "Upsert raced, retrying");
                    self.upsert_once(record.user_id(), &set).await?
                }
                other => other?,
            };
            stored.ok_or_else(|| PlatformError::internal(format!("{} upsert returned no document", T::ENTITY)))
        })
        .await
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Option<T>> {
        bounded(self.timeout, "profile.find_by_user", async {
            Ok(self.collection.find_one(doc! { "user_id": user_id }).await?)
        })
        .await
    }

    async fn find_by_users(&self, user_ids: &[String]) -> Result<Vec<T>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        bounded(self.timeout, "profile.find_by_users", async {
            let cursor = self
                .collection
                .find(doc! { "user_id": { "$in": user_ids.to_vec() } })
                .await?;
            Ok(cursor.try_collect().await?)
        })
        .await
    }
}
