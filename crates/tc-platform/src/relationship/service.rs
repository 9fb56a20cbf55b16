//! Follow / Bookmark Service
//!
//! Creating an edge is a single insert; the `(parent, actor)` unique index
//! turns a repeat into `Duplicate`. Removing a missing edge is `NotFound`.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::relationship::entity::{Bookmark, Edge, Follow};
use crate::relationship::repository::EdgeStore;
use crate::shared::error::{PlatformError, Result};
use crate::user::repository::UserStore;

/// Target of a follow or bookmark; the actor is the caller
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ParentUserRequest {
    pub parent_user_id: String,
}

pub struct RelationshipService {
    users: Arc<dyn UserStore>,
    follows: Arc<dyn EdgeStore<Follow>>,
    bookmarks: Arc<dyn EdgeStore<Bookmark>>,
}

impl RelationshipService {
    pub fn new(
        users: Arc<dyn UserStore>,
        follows: Arc<dyn EdgeStore<Follow>>,
        bookmarks: Arc<dyn EdgeStore<Bookmark>>,
    ) -> Self {
        Self { users, follows, bookmarks }
    }

    pub async fn follow(&self, parent_user_id: &str, follower_id: &str) -> Result<Follow> {
        self.link(self.follows.as_ref(), "follow", Follow::new(parent_user_id, follower_id))
            .await
    }

    pub async fn unfollow(&self, parent_user_id: &str, follower_id: &str) -> Result<()> {
        unlink(self.follows.as_ref(), "unfollow", parent_user_id, follower_id).await
    }

    pub async fn bookmark(&self, parent_user_id: &str, bookmarked_by: &str) -> Result<Bookmark> {
        self.link(self.bookmarks.as_ref(), "bookmark", Bookmark::new(parent_user_id, bookmarked_by))
            .await
    }

    pub async fn remove_bookmark(&self, parent_user_id: &str, bookmarked_by: &str) -> Result<()> {
        unlink(self.bookmarks.as_ref(), "remove_bookmark", parent_user_id, bookmarked_by).await
    }

    async fn link<E: Edge>(&self, store: &dyn EdgeStore<E>, operation: &'static str, edge: E) -> Result<E> {
        let key = format!("{}/{}", edge.parent_id(), edge.actor_id());

        async {
            if edge.parent_id() == edge.actor_id() {
                return Err(PlatformError::validation(format!(
                    "A user cannot {} themselves",
                    operation
                )));
            }
            if self.users.find_by_id(edge.parent_id()).await?.is_none() {
                return Err(PlatformError::not_found("User", edge.parent_id()));
            }
            store.insert(&edge).await
        }
        .await
        .inspect_err(|e| e.log(operation, &key))?;

        info!(operation, parent_id = edge.parent_id(), actor_id = edge.actor_id(), edge_id = edge.id(), "Edge created");
        Ok(edge)
    }
}

pub(crate) async fn unlink<E: Edge>(
    store: &dyn EdgeStore<E>,
    operation: &'static str,
    parent_id: &str,
    actor_id: &str,
) -> Result<()> {
    let key = format!("{}/{}", parent_id, actor_id);

    let removed = store.delete(parent_id, actor_id).await.inspect_err(|e| e.log(operation, &key))?;
    if !removed {
        let err = PlatformError::not_found(E::ENTITY, key.clone());
        err.log(operation, &key);
        return Err(err);
    }

    info!(operation, parent_id, actor_id, "Edge removed");
    Ok(())
}
