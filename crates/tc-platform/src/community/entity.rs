//! Community Entities

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::relationship::entity::Edge;
use crate::TsidGenerator;

fn default_true() -> bool {
    true
}

/// A community owned by exactly one user. Names are unique and a user
/// owns at most one community.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Community {
    #[serde(rename = "_id")]
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub is_paid_community: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_price: Option<f64>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub followers_can_post: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl Community {
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: TsidGenerator::generate(),
            owner_id: owner_id.into(),
            name: name.into(),
            is_paid_community: true,
            community_price: None,
            description: String::new(),
            followers_can_post: true,
            created_at: Utc::now(),
        }
    }
}

/// Membership of `follower_id` in `community_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CommunityFollower {
    #[serde(rename = "_id")]
    pub id: String,
    pub community_id: String,
    /// Owner at the time of joining, copied from the community
    pub community_owner_id: String,
    pub follower_id: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl CommunityFollower {
    pub fn new(community: &Community, follower_id: impl Into<String>) -> Self {
        Self {
            id: TsidGenerator::generate(),
            community_id: community.id.clone(),
            community_owner_id: community.owner_id.clone(),
            follower_id: follower_id.into(),
            created_at: Utc::now(),
        }
    }
}

impl Edge for CommunityFollower {
    const ENTITY: &'static str = "CommunityFollower";
    const COLLECTION: &'static str = "community_followers";
    const PARENT_FIELD: &'static str = "community_id";
    const ACTOR_FIELD: &'static str = "follower_id";

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> &str {
        &self.community_id
    }

    fn actor_id(&self) -> &str {
        &self.follower_id
    }
}
