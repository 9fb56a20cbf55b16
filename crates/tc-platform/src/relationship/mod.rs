//! Follow and Bookmark Edges

pub mod api;
pub mod entity;
pub mod repository;
pub mod service;

pub use api::{relationship_router, RelationshipApiState};
pub use entity::{Bookmark, Edge, Follow};
pub use repository::{EdgeStore, MongoEdgeStore};
pub use service::RelationshipService;
