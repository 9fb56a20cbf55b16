//! Edge Repository
//!
//! Shared persistence for follows, bookmarks and community memberships.
//! Inserts never check first: the unique `(parent, actor)` index rejects
//! duplicates and the rejection becomes `PlatformError::Duplicate`.

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection, Database};

use crate::relationship::entity::Edge;
use crate::shared::deadline::bounded;
use crate::shared::error::{PlatformError, Result, UniqueKey};

#[async_trait]
pub trait EdgeStore<E: Edge>: Send + Sync {
    async fn insert(&self, edge: &E) -> Result<()>;

    async fn find(&self, parent_id: &str, actor_id: &str) -> Result<Option<E>>;

    /// Returns whether an edge was removed
    async fn delete(&self, parent_id: &str, actor_id: &str) -> Result<bool>;

    async fn count_by_parent(&self, parent_id: &str) -> Result<u64>;

    /// Edges of one parent in creation order (by id)
    async fn list_by_parent(&self, parent_id: &str, offset: u64, limit: i64) -> Result<Vec<E>>;
}

/// Formats the pair reported in a duplicate error
pub fn edge_key<E: Edge>(parent_id: &str, actor_id: &str) -> (String, String) {
    (
        format!("{},{}", E::PARENT_FIELD, E::ACTOR_FIELD),
        format!("{}/{}", parent_id, actor_id),
    )
}

pub struct MongoEdgeStore<E: Edge> {
    collection: Collection<E>,
    timeout: Duration,
}

impl<E: Edge> MongoEdgeStore<E> {
    pub fn new(db: &Database, timeout: Duration) -> Self {
        Self {
            collection: db.collection(E::COLLECTION),
            timeout,
        }
    }
}

#[async_trait]
impl<E: Edge> EdgeStore<E> for MongoEdgeStore<E> {
    async fn insert(&self, edge: &E) -> Result<()> {
        bounded(self.timeout, "edges.insert", async {
            let index = E::unique_index();
            let (field, value) = edge_key::<E>(edge.parent_id(), edge.actor_id());
            let keys = [UniqueKey { index: &index, field: &field, value: &value }];

            self.collection
                .insert_one(edge)
                .await
                .map_err(|e| PlatformError::from_write(e, E::ENTITY, &keys))?;
            Ok(())
        })
        .await
    }

    async fn find(&self, parent_id: &str, actor_id: &str) -> Result<Option<E>> {
        bounded(self.timeout, "edges.find", async {
            Ok(self
                .collection
                .find_one(doc! { E::PARENT_FIELD: parent_id, E::ACTOR_FIELD: actor_id })
                .await?)
        })
        .await
    }

    async fn delete(&self, parent_id: &str, actor_id: &str) -> Result<bool> {
        bounded(self.timeout, "edges.delete", async {
            let result = self
                .collection
                .delete_one(doc! { E::PARENT_FIELD: parent_id, E::ACTOR_FIELD: actor_id })
                .await?;
            Ok(result.deleted_count > 0)
        })
        .await
    }

    async fn count_by_parent(&self, parent_id: &str) -> Result<u64> {
        bounded(self.timeout, "edges.count_by_parent", async {
            Ok(self
                .collection
                .count_documents(doc! { E::PARENT_FIELD: parent_id })
                .await?)
        })
        .await
    }

    async fn list_by_parent(&self, parent_id: &str, offset: u64, limit: i64) -> Result<Vec<E>> {
        bounded(self.timeout, "edges.list_by_parent", async {
            let cursor = self
                .collection
                .find(doc! { E::PARENT_FIELD: parent_id })
                .sort(doc! { "_id": 1 })
                .skip(offset)
                .limit(limit)
                .await?;
            Ok(cursor.try_collect().await?)
        })
        .await
    }
}
