//! Community Service
//!
//! Community creation promotes its owner. The two writes are not atomic:
//! promotion is retried, and if it still fails the new community is deleted
//! so no community exists with an unpromoted owner.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, error, info, warn};
use utoipa::ToSchema;

use crate::auth::auth_service::AuthService;
use crate::community::entity::{Community, CommunityFollower};
use crate::community::repository::CommunityStore;
use crate::relationship::repository::EdgeStore;
use crate::relationship::service::unlink;
use crate::shared::api_common::PageParams;
use crate::shared::error::{ErrorKind, PlatformError, Result};
use crate::user::repository::UserStore;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCommunityRequest {
    pub name: String,
    #[serde(default)]
    pub is_paid_community: Option<bool>,
    #[serde(default)]
    pub community_price: Option<f64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub followers_can_post: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FollowCommunityRequest {
    pub community_id: String,
    /// Optional; when present it must name the community's owner
    #[serde(default)]
    pub community_owner_id: Option<String>,
}

/// Retry policy for the owner promotion that follows community creation
#[derive(Debug, Clone, Copy)]
pub struct PromotionRetry {
    pub retries: u32,
    pub delay: Duration,
}

impl Default for PromotionRetry {
    fn default() -> Self {
        Self {
            retries: 2,
            delay: Duration::from_millis(50),
        }
    }
}

pub struct CommunityService {
    communities: Arc<dyn CommunityStore>,
    followers: Arc<dyn EdgeStore<CommunityFollower>>,
    users: Arc<dyn UserStore>,
    auth: Arc<AuthService>,
    promotion_retry: PromotionRetry,
}

impl CommunityService {
    pub fn new(
        communities: Arc<dyn CommunityStore>,
        followers: Arc<dyn EdgeStore<CommunityFollower>>,
        users: Arc<dyn UserStore>,
        auth: Arc<AuthService>,
    ) -> Self {
        Self {
            communities,
            followers,
            users,
            auth,
            promotion_retry: PromotionRetry::default(),
        }
    }

    pub fn with_promotion_retry(mut self, retry: PromotionRetry) -> Self {
        self.promotion_retry = retry;
        self
    }

    async fn require_community(&self, community_id: &str) -> Result<Community> {
        self.communities
            .find_by_id(community_id)
            .await?
            .ok_or_else(|| PlatformError::not_found("Community", community_id))
    }

    pub async fn create_community(&self, owner_id: &str, req: CreateCommunityRequest) -> Result<Community> {
        let name = req.name.trim().to_string();

        let community = async {
            if name.is_empty() {
                return Err(PlatformError::validation("Community name must not be empty"));
            }
            if req.community_price.is_some_and(|p| !p.is_finite() || p < 0.0) {
                return Err(PlatformError::validation("Community price must be a non-negative number"));
            }
            if self.users.find_by_id(owner_id).await?.is_none() {
                return Err(PlatformError::not_found("User", owner_id));
            }

            let mut community = Community::new(owner_id, name.as_str());
            community.is_paid_community = req.is_paid_community.unwrap_or(true);
            community.community_price = req.community_price;
            community.description = req.description;
            community.followers_can_post = req.followers_can_post.unwrap_or(true);

            self.communities.insert(&community).await?;
            self.promote_or_roll_back(&community).await?;
            Ok(community)
        }
        .await
        .inspect_err(|e| e.log("create_community", &format!("{}/{}", owner_id, name)))?;

        info!(community_id = %community.id, owner_id, name = %community.name, "Community created");
        Ok(community)
    }

    async fn promote_or_roll_back(&self, community: &Community) -> Result<()> {
        let retry = self.promotion_retry;
        let mut last_error = None;

        for attempt in 0..=retry.retries {
            if attempt > 0 {
                debug!(owner_id = %community.owner_id, attempt, "Retrying owner promotion");
                tokio::time::sleep(retry.delay * attempt).await;
            }

            match self.auth.promote_to_community_owner(&community.owner_id).await {
                Ok(_) => return Ok(()),
                Err(e) => {
                    let retryable = e.kind() != ErrorKind::NotFound;
                    last_error = Some(e);
                    if !retryable {
                        break;
                    }
                }
            }
        }

        warn!(
            community_id = %community.id,
            owner_id = %community.owner_id,
            "Owner promotion failed, deleting community"
        );
        match self.communities.delete(&community.id).await {
            Ok(_) => {}
            Err(e) => error!(
                community_id = %community.id,
                error = %e,
                "Compensating delete failed, community left without promoted owner"
            ),
        }

        Err(last_error.unwrap_or_else(|| PlatformError::internal("Owner promotion failed")))
    }

    pub async fn follow_community(&self, follower_id: &str, req: FollowCommunityRequest) -> Result<CommunityFollower> {
        let key = format!("{}/{}", req.community_id, follower_id);

        let member = async {
            let community = self.require_community(&req.community_id).await?;
            if let Some(owner_id) = req.community_owner_id.as_deref() {
                if owner_id != community.owner_id {
                    return Err(PlatformError::validation("community_owner_id does not match the community's owner"));
                }
            }
            if community.owner_id == follower_id {
                return Err(PlatformError::validation("An owner cannot follow their own community"));
            }

            let member = CommunityFollower::new(&community, follower_id);
            self.followers.insert(&member).await?;
            Ok(member)
        }
        .await
        .inspect_err(|e| e.log("follow_community", &key))?;

        info!(community_id = %member.community_id, follower_id, "Community followed");
        Ok(member)
    }

    pub async fn leave_community(&self, community_id: &str, follower_id: &str) -> Result<()> {
        unlink(self.followers.as_ref(), "leave_community", community_id, follower_id).await
    }

    /// Visible to the owner and to existing followers only
    pub async fn list_followers(
        &self,
        community_id: &str,
        requester_id: &str,
        page: &PageParams,
    ) -> Result<Vec<CommunityFollower>> {
        async {
            let community = self.require_community(community_id).await?;
            if self.followers.count_by_parent(community_id).await? == 0 {
                return Err(PlatformError::not_found("CommunityFollower", community_id));
            }

            let is_owner = community.owner_id == requester_id;
            if !is_owner && self.followers.find(community_id, requester_id).await?.is_none() {
                return Err(PlatformError::forbidden("Only the owner or followers can list followers"));
            }

            self.followers
                .list_by_parent(community_id, page.offset(), page.limit())
                .await
        }
        .await
        .inspect_err(|e| e.log("list_followers", &format!("{}/{}", community_id, requester_id)))
    }

    pub async fn list_communities(&self, page: &PageParams) -> Result<Vec<Community>> {
        async {
            let communities = self.communities.list(page.offset(), page.limit()).await?;
            if communities.is_empty() {
                return Err(PlatformError::not_found("Community", "*"));
            }
            Ok(communities)
        }
        .await
        .inspect_err(|e| e.log("list_communities", &page.offset().to_string()))
    }

    pub async fn get_community(&self, community_id: &str) -> Result<Community> {
        self.require_community(community_id)
            .await
            .inspect_err(|e| e.log("get_community", community_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password_service::{Argon2Config, PasswordService};
    use crate::auth::token_service::{AuthConfig, TokenService};
    use crate::store::Stores;
    use crate::user::entity::User;

    async fn setup() -> (CommunityService, Stores, Vec<String>) {
        let stores = Stores::in_memory();
        let mut ids = Vec::new();
        for name in ["owner", "alice", "mallory"] {
            let user = User::new(&format!("{}@x.com", name), "h", name);
            stores.users.insert(&user).await.unwrap();
            ids.push(user.id);
        }

        let auth = AuthService::new(
            stores.users.clone(),
            Arc::new(PasswordService::new(Argon2Config::testing()).unwrap()),
            Arc::new(TokenService::new(AuthConfig::default())),
        );
        let service = CommunityService::new(
            stores.communities.clone(),
            stores.community_followers.clone(),
            stores.users.clone(),
            Arc::new(auth),
        );
        (service, stores, ids)
    }

    fn create(name: &str) -> CreateCommunityRequest {
        CreateCommunityRequest {
            name: name.to_string(),
            is_paid_community: None,
            community_price: None,
            description: String::new(),
            followers_can_post: None,
        }
    }

    fn join(community_id: &str) -> FollowCommunityRequest {
        FollowCommunityRequest {
            community_id: community_id.to_string(),
            community_owner_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_promotes_owner() {
        let (service, stores, ids) = setup().await;
        let community = service.create_community(&ids[0], create("rustaceans")).await.unwrap();

        assert!(community.is_paid_community);
        assert!(community.followers_can_post);
        let owner = stores.users.find_by_id(&ids[0]).await.unwrap().unwrap();
        assert!(owner.is_community_owner);
    }

    #[tokio::test]
    async fn test_second_community_for_owner_conflicts() {
        let (service, _, ids) = setup().await;
        service.create_community(&ids[0], create("one")).await.unwrap();

        let err = service.create_community(&ids[0], create("two")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        let err = service.create_community(&ids[1], create("one")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_list_followers_access_rules() {
        let (service, _, ids) = setup().await;
        let community = service.create_community(&ids[0], create("club")).await.unwrap();
        let page = PageParams::default();

        let err = service.list_followers(&community.id, &ids[0], &page).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        service.follow_community(&ids[1], join(&community.id)).await.unwrap();
        assert_eq!(
            service.follow_community(&ids[1], join(&community.id)).await.unwrap_err().kind(),
            ErrorKind::Conflict
        );

        assert_eq!(service.list_followers(&community.id, &ids[0], &page).await.unwrap().len(), 1);
        assert_eq!(service.list_followers(&community.id, &ids[1], &page).await.unwrap().len(), 1);
        let err = service.list_followers(&community.id, &ids[2], &page).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_follow_stores_real_owner() {
        let (service, _, ids) = setup().await;
        let community = service.create_community(&ids[0], create("club")).await.unwrap();

        let mut spoofed = join(&community.id);
        spoofed.community_owner_id = Some(ids[2].clone());
        let err = service.follow_community(&ids[1], spoofed).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);

        let member = service.follow_community(&ids[1], join(&community.id)).await.unwrap();
        assert_eq!(member.community_owner_id, ids[0]);

        let err = service.follow_community(&ids[1], join("missing")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_communities_empty_is_not_found() {
        let (service, _, _) = setup().await;
        let err = service.list_communities(&PageParams::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
