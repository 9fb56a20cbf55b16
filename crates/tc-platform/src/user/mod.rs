//! User Aggregate

pub mod api;
pub mod entity;
pub mod repository;

pub use api::{user_router, UserApiState};
pub use entity::{PrivacyMode, User, UserView};
pub use repository::{MongoUserStore, UserStore};
