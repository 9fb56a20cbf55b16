//! Service wiring and the platform API router

use std::sync::Arc;

use utoipa_axum::router::OpenApiRouter;

use crate::auth::{auth_router, AuthApiState, AuthService, PasswordService, TokenService};
use crate::community::{community_router, CommunityApiState, CommunityService};
use crate::overview::{overview_router, OverviewApiState, OverviewService};
use crate::profile::ProfileService;
use crate::relationship::{relationship_router, RelationshipApiState, RelationshipService};
use crate::store::Stores;
use crate::user::{user_router, UserApiState};

/// Every service the API exposes, built once over one set of stores
#[derive(Clone)]
pub struct PlatformServices {
    pub auth: Arc<AuthService>,
    pub profiles: Arc<ProfileService>,
    pub relationships: Arc<RelationshipService>,
    pub communities: Arc<CommunityService>,
    pub overviews: Arc<OverviewService>,
}

impl PlatformServices {
    pub fn new(stores: &Stores, passwords: Arc<PasswordService>, tokens: Arc<TokenService>) -> Self {
        let auth = Arc::new(AuthService::new(stores.users.clone(), passwords, tokens));

        Self {
            profiles: Arc::new(ProfileService::new(stores.cultures.clone(), stores.preferences.clone())),
            relationships: Arc::new(RelationshipService::new(
                stores.users.clone(),
                stores.follows.clone(),
                stores.bookmarks.clone(),
            )),
            communities: Arc::new(CommunityService::new(
                stores.communities.clone(),
                stores.community_followers.clone(),
                stores.users.clone(),
                auth.clone(),
            )),
            overviews: Arc::new(OverviewService::new(
                stores.users.clone(),
                stores.cultures.clone(),
                stores.preferences.clone(),
            )),
            auth,
        }
    }
}

/// `/user/*` and `/community/*`. Bearer tokens are resolved through the
/// `AuthLayer` the caller wraps around the split router.
pub fn platform_router(services: &PlatformServices) -> OpenApiRouter {
    let user = OpenApiRouter::new()
        .merge(auth_router(AuthApiState {
            auth_service: services.auth.clone(),
        }))
        .merge(user_router(UserApiState {
            auth_service: services.auth.clone(),
            profile_service: services.profiles.clone(),
        }))
        .merge(overview_router(OverviewApiState {
            overview_service: services.overviews.clone(),
        }))
        .merge(relationship_router(RelationshipApiState {
            relationship_service: services.relationships.clone(),
        }));

    let community = community_router(CommunityApiState {
        community_service: services.communities.clone(),
    });

    OpenApiRouter::new().nest("/user", user).nest("/community", community)
}
