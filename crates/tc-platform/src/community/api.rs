//! Community API Endpoints
//!
//! Mounted under `/community`:
//! - POST /create - Create the caller's community
//! - GET /all - Page through communities
//! - GET /by-id/{community_id} - One community
//! - POST /followers/add - Join a community
//! - DELETE /followers/{community_id} - Leave a community
//! - GET /followers - Members of a community (owner and members only)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::community::entity::{Community, CommunityFollower};
use crate::community::service::{CommunityService, CreateCommunityRequest, FollowCommunityRequest};
use crate::shared::api_common::{PageParams, SuccessResponse};
use crate::shared::error::{ErrorResponse, PlatformError};
use crate::shared::middleware::Authenticated;

#[derive(Clone)]
pub struct CommunityApiState {
    pub community_service: Arc<CommunityService>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FollowersQuery {
    #[serde(alias = "communityId")]
    pub community_id: String,
}

/// Create a community owned by the caller
#[utoipa::path(
    post,
    path = "/create",
    tag = "communities",
    operation_id = "postCommunityCreate",
    request_body = CreateCommunityRequest,
    responses(
        (status = 201, description = "Community created", body = Community),
        (status = 409, description = "Name taken or caller already owns a community", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_community(
    State(state): State<CommunityApiState>,
    auth: Authenticated,
    Json(req): Json<CreateCommunityRequest>,
) -> Result<(StatusCode, Json<Community>), PlatformError> {
    let community = state.community_service.create_community(&auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(community)))
}

/// List communities
#[utoipa::path(
    get,
    path = "/all",
    tag = "communities",
    operation_id = "getCommunityAll",
    params(PageParams),
    responses(
        (status = 200, description = "Communities", body = Vec<Community>),
        (status = 404, description = "No communities", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_communities(
    State(state): State<CommunityApiState>,
    _auth: Authenticated,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<Community>>, PlatformError> {
    Ok(Json(state.community_service.list_communities(&page).await?))
}

/// Get a community by id
#[utoipa::path(
    get,
    path = "/by-id/{community_id}",
    tag = "communities",
    operation_id = "getCommunityById",
    params(("community_id" = String, Path, description = "Community ID")),
    responses(
        (status = 200, description = "Community", body = Community),
        (status = 404, description = "Community not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_community(
    State(state): State<CommunityApiState>,
    _auth: Authenticated,
    Path(community_id): Path<String>,
) -> Result<Json<Community>, PlatformError> {
    Ok(Json(state.community_service.get_community(&community_id).await?))
}

/// Join a community
#[utoipa::path(
    post,
    path = "/followers/add",
    tag = "communities",
    operation_id = "postCommunityFollowersAdd",
    request_body = FollowCommunityRequest,
    responses(
        (status = 201, description = "Joined", body = CommunityFollower),
        (status = 404, description = "Community not found", body = ErrorResponse),
        (status = 409, description = "Already a member", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn follow_community(
    State(state): State<CommunityApiState>,
    auth: Authenticated,
    Json(req): Json<FollowCommunityRequest>,
) -> Result<(StatusCode, Json<CommunityFollower>), PlatformError> {
    let member = state.community_service.follow_community(&auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// Leave a community
#[utoipa::path(
    delete,
    path = "/followers/{community_id}",
    tag = "communities",
    operation_id = "deleteCommunityFollowers",
    params(("community_id" = String, Path, description = "Community ID")),
    responses(
        (status = 200, description = "Left the community", body = SuccessResponse),
        (status = 404, description = "Not a member", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn leave_community(
    State(state): State<CommunityApiState>,
    auth: Authenticated,
    Path(community_id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    state.community_service.leave_community(&community_id, &auth.user_id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// List a community's followers
#[utoipa::path(
    get,
    path = "/followers",
    tag = "communities",
    operation_id = "getCommunityFollowers",
    params(FollowersQuery, PageParams),
    responses(
        (status = 200, description = "Followers in join order", body = Vec<CommunityFollower>),
        (status = 403, description = "Caller is neither owner nor member", body = ErrorResponse),
        (status = 404, description = "Community missing or without followers", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_followers(
    State(state): State<CommunityApiState>,
    auth: Authenticated,
    Query(query): Query<FollowersQuery>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<CommunityFollower>>, PlatformError> {
    let followers = state
        .community_service
        .list_followers(&query.community_id, &auth.user_id, &page)
        .await?;
    Ok(Json(followers))
}

pub fn community_router(state: CommunityApiState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_community))
        .routes(routes!(list_communities))
        .routes(routes!(get_community))
        .routes(routes!(follow_community))
        .routes(routes!(leave_community))
        .routes(routes!(list_followers))
        .with_state(state)
}
