//! Community Aggregate

pub mod api;
pub mod entity;
pub mod repository;
pub mod service;

pub use api::{community_router, CommunityApiState};
pub use entity::{Community, CommunityFollower};
pub use repository::{CommunityStore, MongoCommunityStore};
pub use service::CommunityService;
