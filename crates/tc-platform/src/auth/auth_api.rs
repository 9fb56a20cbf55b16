//! Auth API Endpoints
//!
//! Mounted under `/user`:
//! - POST /signup - Create an account (shared-secret guarded)
//! - POST /login - Password login, returns a session token
//! - POST /forget-password - Out-of-band password reset (shared-secret guarded)
//! - PUT /settings/password - Change password with the current one
//! - PUT /settings/privacy - Set profile visibility
//! - PUT /settings/general - Name, email, user name and picture

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::auth::auth_service::{
    AuthService, ChangePasswordRequest, GeneralSettingsRequest, LoginRequest, LoginResponse, PrivacyRequest,
    ResetPasswordRequest, SignUpRequest,
};
use crate::shared::error::{ErrorResponse, PlatformError};
use crate::shared::middleware::{Authenticated, SignupSecret};
use crate::user::entity::UserView;

#[derive(Clone)]
pub struct AuthApiState {
    pub auth_service: Arc<AuthService>,
}

/// Sign up
///
/// Requires the `secret` header when a signup secret is configured.
#[utoipa::path(
    post,
    path = "/signup",
    tag = "auth",
    operation_id = "postUserSignup",
    request_body = SignUpRequest,
    params(("secret" = Option<String>, Header, description = "Signup shared secret")),
    responses(
        (status = 201, description = "User created", body = UserView),
        (status = 401, description = "Missing or invalid secret", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub async fn signup(
    State(state): State<AuthApiState>,
    _secret: SignupSecret,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<UserView>), PlatformError> {
    let user = state.auth_service.sign_up(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    operation_id = "postUserLogin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AuthApiState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, PlatformError> {
    Ok(Json(state.auth_service.log_in(req).await?))
}

/// Reset a password by email
#[utoipa::path(
    post,
    path = "/forget-password",
    tag = "auth",
    operation_id = "postUserForgetPassword",
    request_body = ResetPasswordRequest,
    params(("secret" = Option<String>, Header, description = "Signup shared secret")),
    responses(
        (status = 200, description = "Password updated", body = UserView),
        (status = 401, description = "Missing or invalid secret", body = ErrorResponse),
        (status = 404, description = "Email not registered", body = ErrorResponse)
    )
)]
pub async fn forget_password(
    State(state): State<AuthApiState>,
    _secret: SignupSecret,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<UserView>, PlatformError> {
    Ok(Json(state.auth_service.update_password(req).await?))
}

/// Change password
#[utoipa::path(
    put,
    path = "/settings/password",
    tag = "settings",
    operation_id = "putUserSettingsPassword",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = UserView),
        (status = 400, description = "Confirmation mismatch or wrong current password", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_password(
    State(state): State<AuthApiState>,
    auth: Authenticated,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<UserView>, PlatformError> {
    Ok(Json(state.auth_service.update_password_through_settings(&auth.user_id, req).await?))
}

/// Set profile visibility
#[utoipa::path(
    put,
    path = "/settings/privacy",
    tag = "settings",
    operation_id = "putUserSettingsPrivacy",
    request_body = PrivacyRequest,
    responses((status = 200, description = "Privacy updated", body = UserView)),
    security(("bearer_auth" = []))
)]
pub async fn change_privacy(
    State(state): State<AuthApiState>,
    auth: Authenticated,
    Json(req): Json<PrivacyRequest>,
) -> Result<Json<UserView>, PlatformError> {
    Ok(Json(state.auth_service.update_privacy(&auth.user_id, req.privacy_mode).await?))
}

/// Update general settings
#[utoipa::path(
    put,
    path = "/settings/general",
    tag = "settings",
    operation_id = "putUserSettingsGeneral",
    request_body = GeneralSettingsRequest,
    responses(
        (status = 200, description = "Settings updated", body = UserView),
        (status = 409, description = "User name or email taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_general_settings(
    State(state): State<AuthApiState>,
    auth: Authenticated,
    Json(req): Json<GeneralSettingsRequest>,
) -> Result<Json<UserView>, PlatformError> {
    Ok(Json(state.auth_service.update_general_settings(&auth.user_id, req).await?))
}

pub fn auth_router(state: AuthApiState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(signup))
        .routes(routes!(login))
        .routes(routes!(forget_password))
        .routes(routes!(change_password))
        .routes(routes!(change_privacy))
        .routes(routes!(change_general_settings))
        .with_state(state)
}
