//! Culture and Preference Aggregates

pub mod entity;
pub mod repository;
pub mod service;

pub use entity::{Culture, Preference, ProfileRecord};
pub use repository::{MongoProfileStore, ProfileStore};
pub use service::ProfileService;
