//! Authentication Service
//!
//! Signup, login and credential/settings changes for users. Email and
//! user-name uniqueness come from the store's unique indexes; this service
//! never reads before inserting to check for a collision.
//!
//! Argon2 work runs on the blocking pool so it never stalls the runtime.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::auth::password_service::PasswordService;
use crate::auth::token_service::TokenService;
use crate::shared::error::{PlatformError, Result};
use crate::user::entity::{normalize_email, PrivacyMode, User, UserPatch, UserView};
use crate::user::repository::UserStore;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The user plus a session token
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserView,
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PrivacyRequest {
    pub privacy_mode: PrivacyMode,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct GeneralSettingsRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub user_name: Option<String>,
    pub profile_pic: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProfileUpdateRequest {
    pub current_role: Option<String>,
    pub current_company: Option<String>,
    pub cv: Option<String>,
    pub city: Option<String>,
    pub linkedin_profile: Option<String>,
    pub years_of_experience: Option<u32>,
    pub student_or_new_graduate: Option<bool>,
    pub currently_employed: Option<bool>,
    pub phone_number: Option<String>,
    pub term_and_conditions: Option<bool>,
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    passwords: Arc<PasswordService>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, passwords: Arc<PasswordService>, tokens: Arc<TokenService>) -> Self {
        Self { users, passwords, tokens }
    }

    async fn hash(&self, password: &str) -> Result<String> {
        let passwords = self.passwords.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || passwords.hash_password(&password))
            .await
            .map_err(|e| PlatformError::internal(format!("Password hashing task failed: {}", e)))?
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let passwords = self.passwords.clone();
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || passwords.verify_password(&password, &hash))
            .await
            .map_err(|e| PlatformError::internal(format!("Password verification task failed: {}", e)))
    }

    async fn patch(&self, user_id: &str, patch: &UserPatch) -> Result<UserView> {
        self.users
            .update_by_id(user_id, patch)
            .await?
            .map(UserView::from)
            .ok_or_else(|| PlatformError::not_found("User", user_id))
    }

    pub async fn sign_up(&self, req: SignUpRequest) -> Result<UserView> {
        let email = normalize_email(&req.email);
        debug!(email = %email, "Signing up user");

        let result = async {
            if email.is_empty() || !email.contains('@') {
                return Err(PlatformError::validation("A valid email is required"));
            }
            let hash = self.hash(&req.password).await?;
            let user = User::new(&email, hash, req.full_name.trim());
            self.users.insert(&user).await?;
            Ok(user)
        }
        .await
        .inspect_err(|e| e.log("sign_up", &email))?;

        info!(user_id = %result.id, email = %email, "User signed up");
        Ok(result.into())
    }

    /// Unknown email and wrong password fail identically
    pub async fn log_in(&self, req: LoginRequest) -> Result<LoginResponse> {
        let email = normalize_email(&req.email);

        let user = async {
            let user = self
                .users
                .find_by_email(&email)
                .await?
                .ok_or(PlatformError::InvalidCredentials)?;
            if !self.verify(&req.password, &user.password_hash).await? {
                return Err(PlatformError::InvalidCredentials);
            }
            Ok(user)
        }
        .await
        .inspect_err(|e| e.log("log_in", &email))?;

        let access_token = self
            .tokens
            .issue(&user.id)
            .inspect_err(|e| e.log("log_in", &user.id))?;
        info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            user: user.into(),
            access_token,
        })
    }

    /// Out-of-band password reset by email
    pub async fn update_password(&self, req: ResetPasswordRequest) -> Result<UserView> {
        let email = normalize_email(&req.email);

        let user = async {
            let hash = self.hash(&req.password).await?;
            let patch = UserPatch {
                password_hash: Some(hash),
                ..UserPatch::default()
            };
            self.users
                .update_by_email(&email, &patch)
                .await?
                .ok_or_else(|| PlatformError::not_found("User", email.clone()))
        }
        .await
        .inspect_err(|e| e.log("update_password", &email))?;

        info!(user_id = %user.id, "Password reset");
        Ok(user.into())
    }

    pub async fn update_password_through_settings(&self, user_id: &str, req: ChangePasswordRequest) -> Result<UserView> {
        let user = async {
            if req.new_password != req.confirm_new_password {
                return Err(PlatformError::validation("New password and confirmation do not match"));
            }
            let user = self
                .users
                .find_by_id(user_id)
                .await?
                .ok_or_else(|| PlatformError::not_found("User", user_id))?;
            if !self.verify(&req.current_password, &user.password_hash).await? {
                return Err(PlatformError::validation("Current password is incorrect"));
            }

            let patch = UserPatch {
                password_hash: Some(self.hash(&req.new_password).await?),
                ..UserPatch::default()
            };
            self.patch(user_id, &patch).await
        }
        .await
        .inspect_err(|e| e.log("update_password_through_settings", user_id))?;

        info!(user_id, "Password changed");
        Ok(user)
    }

    pub async fn update_privacy(&self, user_id: &str, mode: PrivacyMode) -> Result<UserView> {
        let patch = UserPatch {
            privacy_mode: Some(mode),
            ..UserPatch::default()
        };
        let user = self
            .patch(user_id, &patch)
            .await
            .inspect_err(|e| e.log("update_privacy", user_id))?;

        info!(user_id, privacy_mode = mode.as_str(), "Privacy updated");
        Ok(user)
    }

    /// A user name or email held by another user fails with `Duplicate`
    pub async fn update_general_settings(&self, user_id: &str, req: GeneralSettingsRequest) -> Result<UserView> {
        let patch = UserPatch {
            full_name: req.full_name,
            email: req.email.as_deref().map(normalize_email),
            user_name: req.user_name.map(|n| n.trim().to_string()),
            profile_pic: req.profile_pic,
            ..UserPatch::default()
        };

        let user = async {
            if patch.email.as_deref().is_some_and(|e| e.is_empty() || !e.contains('@')) {
                return Err(PlatformError::validation("A valid email is required"));
            }
            if patch.user_name.as_deref().is_some_and(str::is_empty) {
                return Err(PlatformError::validation("User name must not be empty"));
            }
            self.patch(user_id, &patch).await
        }
        .await
        .inspect_err(|e| e.log("update_general_settings", user_id))?;

        info!(user_id, "General settings updated");
        Ok(user)
    }

    /// Idempotent
    pub async fn promote_to_community_owner(&self, user_id: &str) -> Result<UserView> {
        let patch = UserPatch {
            is_community_owner: Some(true),
            ..UserPatch::default()
        };
        let user = self
            .patch(user_id, &patch)
            .await
            .inspect_err(|e| e.log("promote_to_community_owner", user_id))?;

        info!(user_id, "Promoted to community owner");
        Ok(user)
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<UserView> {
        self.users
            .find_by_id(user_id)
            .await
            .and_then(|u| u.ok_or_else(|| PlatformError::not_found("User", user_id)))
            .map(UserView::from)
            .inspect_err(|e| e.log("get_profile", user_id))
    }

    pub async fn update_profile(&self, user_id: &str, req: ProfileUpdateRequest) -> Result<UserView> {
        let patch = UserPatch {
            current_role: req.current_role,
            current_company: req.current_company,
            cv: req.cv,
            city: req.city,
            linkedin_profile: req.linkedin_profile,
            years_of_experience: req.years_of_experience,
            student_or_new_graduate: req.student_or_new_graduate,
            currently_employed: req.currently_employed,
            phone_number: req.phone_number,
            term_and_conditions: req.term_and_conditions,
            ..UserPatch::default()
        };
        let user = self
            .patch(user_id, &patch)
            .await
            .inspect_err(|e| e.log("update_profile", user_id))?;

        info!(user_id, "Profile updated");
        Ok(user)
    }
}
