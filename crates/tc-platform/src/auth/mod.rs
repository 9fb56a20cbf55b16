//! Authentication Module
//!
//! Password hashing, session tokens and the account lifecycle.

pub mod auth_api;
pub mod auth_service;
pub mod password_service;
pub mod token_service;

pub use auth_api::{auth_router, AuthApiState};
pub use auth_service::AuthService;
pub use password_service::{Argon2Config, PasswordService};
pub use token_service::{AuthConfig, TokenService};
