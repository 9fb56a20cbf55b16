//! Relationship Edges
//!
//! Directed records between a parent (the followed user, or a community)
//! and an actor. Each `(parent, actor)` pair exists at most once.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;

use crate::TsidGenerator;

pub trait Edge: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    const ENTITY: &'static str;
    const COLLECTION: &'static str;
    const PARENT_FIELD: &'static str;
    const ACTOR_FIELD: &'static str;

    fn id(&self) -> &str;
    fn parent_id(&self) -> &str;
    fn actor_id(&self) -> &str;

    /// Name of the unique `(parent, actor)` index
    fn unique_index() -> String {
        format!("uniq_{}_{}_{}", Self::COLLECTION, Self::PARENT_FIELD, Self::ACTOR_FIELD)
    }
}

/// `follower_id` follows `parent_user_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Follow {
    #[serde(rename = "_id")]
    pub id: String,
    pub parent_user_id: String,
    pub follower_id: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl Follow {
    pub fn new(parent_user_id: impl Into<String>, follower_id: impl Into<String>) -> Self {
        Self {
            id: TsidGenerator::generate(),
            parent_user_id: parent_user_id.into(),
            follower_id: follower_id.into(),
            created_at: Utc::now(),
        }
    }
}

impl Edge for Follow {
    const ENTITY: &'static str = "Follow";
    const COLLECTION: &'static str = "follows";
    const PARENT_FIELD: &'static str = "parent_user_id";
    const ACTOR_FIELD: &'static str = "follower_id";

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> &str {
        &self.parent_user_id
    }

    fn actor_id(&self) -> &str {
        &self.follower_id
    }
}

/// `bookmarked_by` bookmarked `parent_user_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Bookmark {
    #[serde(rename = "_id")]
    pub id: String,
    pub parent_user_id: String,
    pub bookmarked_by: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    pub fn new(parent_user_id: impl Into<String>, bookmarked_by: impl Into<String>) -> Self {
        Self {
            id: TsidGenerator::generate(),
            parent_user_id: parent_user_id.into(),
            bookmarked_by: bookmarked_by.into(),
            created_at: Utc::now(),
        }
    }
}

impl Edge for Bookmark {
    const ENTITY: &'static str = "Bookmark";
    const COLLECTION: &'static str = "bookmarks";
    const PARENT_FIELD: &'static str = "parent_user_id";
    const ACTOR_FIELD: &'static str = "bookmarked_by";

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> &str {
        &self.parent_user_id
    }

    fn actor_id(&self) -> &str {
        &self.bookmarked_by
    }
}
