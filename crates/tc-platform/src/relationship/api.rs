//! Follow / Bookmark endpoints, mounted under `/user`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::relationship::entity::{Bookmark, Follow};
use crate::relationship::service::{ParentUserRequest, RelationshipService};
use crate::shared::api_common::SuccessResponse;
use crate::shared::error::{ErrorResponse, PlatformError};
use crate::shared::middleware::Authenticated;

#[derive(Clone)]
pub struct RelationshipApiState {
    pub relationship_service: Arc<RelationshipService>,
}

/// Follow a user
#[utoipa::path(
    post,
    path = "/follow",
    tag = "relationships",
    operation_id = "postUserFollow",
    request_body = ParentUserRequest,
    responses(
        (status = 201, description = "Now following", body = Follow),
        (status = 400, description = "Cannot follow yourself", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Already following", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn follow(
    State(state): State<RelationshipApiState>,
    auth: Authenticated,
    Json(req): Json<ParentUserRequest>,
) -> Result<(StatusCode, Json<Follow>), PlatformError> {
    let edge = state.relationship_service.follow(&req.parent_user_id, &auth.user_id).await?;
    Ok((StatusCode::CREATED, Json(edge)))
}

/// Stop following a user
#[utoipa::path(
    delete,
    path = "/follow/{parent_user_id}",
    tag = "relationships",
    operation_id = "deleteUserFollow",
    params(("parent_user_id" = String, Path, description = "Followed user ID")),
    responses(
        (status = 200, description = "Unfollowed", body = SuccessResponse),
        (status = 404, description = "Not following", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn unfollow(
    State(state): State<RelationshipApiState>,
    auth: Authenticated,
    Path(parent_user_id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    state.relationship_service.unfollow(&parent_user_id, &auth.user_id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Bookmark a user
#[utoipa::path(
    post,
    path = "/bookmark",
    tag = "relationships",
    operation_id = "postUserBookmark",
    request_body = ParentUserRequest,
    responses(
        (status = 201, description = "Bookmarked", body = Bookmark),
        (status = 400, description = "Cannot bookmark yourself", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Already bookmarked", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn bookmark(
    State(state): State<RelationshipApiState>,
    auth: Authenticated,
    Json(req): Json<ParentUserRequest>,
) -> Result<(StatusCode, Json<Bookmark>), PlatformError> {
    let edge = state.relationship_service.bookmark(&req.parent_user_id, &auth.user_id).await?;
    Ok((StatusCode::CREATED, Json(edge)))
}

/// Remove a bookmark
#[utoipa::path(
    delete,
    path = "/bookmark/{parent_user_id}",
    tag = "relationships",
    operation_id = "deleteUserBookmark",
    params(("parent_user_id" = String, Path, description = "Bookmarked user ID")),
    responses(
        (status = 200, description = "Bookmark removed", body = SuccessResponse),
        (status = 404, description = "No such bookmark", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_bookmark(
    State(state): State<RelationshipApiState>,
    auth: Authenticated,
    Path(parent_user_id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    state.relationship_service.remove_bookmark(&parent_user_id, &auth.user_id).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub fn relationship_router(state: RelationshipApiState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(follow))
        .routes(routes!(unfollow))
        .routes(routes!(bookmark))
        .routes(routes!(remove_bookmark))
        .with_state(state)
}
