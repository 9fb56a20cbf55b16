//! Community Repository

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection, Database};

use crate::community::entity::Community;
use crate::shared::deadline::bounded;
use crate::shared::error::{PlatformError, Result, UniqueKey};

pub const COMMUNITIES_COLLECTION: &str = "communities";
pub const NAME_INDEX: &str = "uniq_communities_name";
pub const OWNER_INDEX: &str = "uniq_communities_owner_id";

#[async_trait]
pub trait CommunityStore: Send + Sync {
    /// Fails with `Duplicate` on a taken name or an owner that already has a community
    async fn insert(&self, community: &Community) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Community>>;

    async fn delete(&self, id: &str) -> Result<bool>;

    /// Ordered by id
    async fn list(&self, offset: u64, limit: i64) -> Result<Vec<Community>>;
}

pub struct MongoCommunityStore {
    collection: Collection<Community>,
    timeout: Duration,
}

impl MongoCommunityStore {
    pub fn new(db: &Database, timeout: Duration) -> Self {
        Self {
            collection: db.collection(COMMUNITIES_COLLECTION),
            timeout,
        }
    }
}

#[async_trait]
impl CommunityStore for MongoCommunityStore {
    async fn insert(&self, community: &Community) -> Result<()> {
        bounded(self.timeout, "communities.insert", async {
            let keys = [
                UniqueKey { index: NAME_INDEX, field: "name", value: &community.name },
                UniqueKey { index: OWNER_INDEX, field: "owner_id", value: &community.owner_id },
            ];
            self.collection
                .insert_one(community)
                .await
                .map_err(|e| PlatformError::from_write(e, "Community", &keys))?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Community>> {
        bounded(self.timeout, "communities.find_by_id", async {
            Ok(self.collection.find_one(doc! { "_id": id }).await?)
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        bounded(self.timeout, "communities.delete", async {
            let result = self.collection.delete_one(doc! { "_id": id }).await?;
            Ok(result.deleted_count > 0)
        })
        .await
    }

    async fn list(&self, offset: u64, limit: i64) -> Result<Vec<Community>> {
        bounded(self.timeout, "communities.list", async {
            let cursor = self
                .collection
                .find(doc! {})
                .sort(doc! { "_id": 1 })
                .skip(offset)
                .limit(limit)
                .await?;
            Ok(cursor.try_collect().await?)
        })
        .await
    }
}
