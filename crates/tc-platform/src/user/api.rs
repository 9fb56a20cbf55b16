//! User profile endpoints, mounted under `/user`

use axum::{extract::State, Json};
use std::sync::Arc;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::auth::auth_service::{AuthService, ProfileUpdateRequest};
use crate::profile::entity::{Culture, Preference};
use crate::profile::service::ProfileService;
use crate::shared::error::{ErrorResponse, PlatformError};
use crate::shared::middleware::Authenticated;
use crate::user::entity::UserView;

#[derive(Clone)]
pub struct UserApiState {
    pub auth_service: Arc<AuthService>,
    pub profile_service: Arc<ProfileService>,
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/profile",
    tag = "user",
    operation_id = "getUserProfile",
    responses(
        (status = 200, description = "Profile", body = UserView),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    State(state): State<UserApiState>,
    auth: Authenticated,
) -> Result<Json<UserView>, PlatformError> {
    Ok(Json(state.auth_service.get_profile(&auth.user_id).await?))
}

/// Update career profile fields
#[utoipa::path(
    put,
    path = "/update",
    tag = "user",
    operation_id = "putUserUpdate",
    request_body = ProfileUpdateRequest,
    responses((status = 200, description = "Profile updated", body = UserView)),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<UserApiState>,
    auth: Authenticated,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<Json<UserView>, PlatformError> {
    Ok(Json(state.auth_service.update_profile(&auth.user_id, req).await?))
}

/// Create or merge the caller's job preferences
#[utoipa::path(
    put,
    path = "/preferences",
    tag = "user",
    operation_id = "putUserPreferences",
    request_body = Preference,
    responses((status = 200, description = "Stored preferences", body = Preference)),
    security(("bearer_auth" = []))
)]
pub async fn upsert_preference(
    State(state): State<UserApiState>,
    auth: Authenticated,
    Json(req): Json<Preference>,
) -> Result<Json<Preference>, PlatformError> {
    Ok(Json(state.profile_service.upsert_preference(&auth.user_id, req).await?))
}

/// Create or merge the caller's culture answers
#[utoipa::path(
    put,
    path = "/culture",
    tag = "user",
    operation_id = "putUserCulture",
    request_body = Culture,
    responses((status = 200, description = "Stored culture", body = Culture)),
    security(("bearer_auth" = []))
)]
pub async fn upsert_culture(
    State(state): State<UserApiState>,
    auth: Authenticated,
    Json(req): Json<Culture>,
) -> Result<Json<Culture>, PlatformError> {
    Ok(Json(state.profile_service.upsert_culture(&auth.user_id, req).await?))
}

pub fn user_router(state: UserApiState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_profile))
        .routes(routes!(update_profile))
        .routes(routes!(upsert_preference))
        .routes(routes!(upsert_culture))
        .with_state(state)
}
