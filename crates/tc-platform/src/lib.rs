//! TalentCircle Platform
//!
//! Core platform providing:
//! - Account signup, login and settings with Argon2id credentials
//! - Session tokens (HS256 JWT)
//! - Follow, bookmark and community-membership edges with store-enforced uniqueness
//! - Communities with owner promotion and compensation
//! - The profile overview: user, culture and preference merged and zero-filled
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Store trait and its MongoDB implementation
//! - `service` - Business rules
//! - `api` - REST endpoints

// Aggregates
pub mod user;
pub mod profile;
pub mod relationship;
pub mod community;
pub mod overview;

// Authentication
pub mod auth;

// Infrastructure
pub mod shared;
pub mod store;
pub mod router;

pub use shared::error::{ErrorKind, PlatformError, Result};
pub use shared::tsid::TsidGenerator;

pub use user::entity::{PrivacyMode, User, UserView};
pub use profile::entity::{Culture, Preference};
pub use relationship::entity::{Bookmark, Follow};
pub use community::entity::{Community, CommunityFollower};
pub use overview::view::OverviewView;

pub use store::Stores;
pub use router::{platform_router, PlatformServices};
pub use shared::indexes::initialize_indexes;
pub use shared::middleware::{AppState, AuthLayer};
