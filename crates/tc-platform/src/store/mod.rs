//! Store wiring
//!
//! `Stores` bundles one handle per collection. Services take the handles
//! they need, never a concrete backend.

pub mod memory;

use std::sync::Arc;
use std::time::Duration;

use mongodb::Database;

use crate::community::entity::CommunityFollower;
use crate::community::repository::{CommunityStore, MongoCommunityStore};
use crate::profile::entity::{Culture, Preference};
use crate::profile::repository::{MongoProfileStore, ProfileStore};
use crate::relationship::entity::{Bookmark, Follow};
use crate::relationship::repository::{EdgeStore, MongoEdgeStore};
use crate::user::repository::{MongoUserStore, UserStore};

use memory::{MemoryCommunityStore, MemoryEdgeStore, MemoryProfileStore, MemoryUserStore};

#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub cultures: Arc<dyn ProfileStore<Culture>>,
    pub preferences: Arc<dyn ProfileStore<Preference>>,
    pub communities: Arc<dyn CommunityStore>,
    pub follows: Arc<dyn EdgeStore<Follow>>,
    pub bookmarks: Arc<dyn EdgeStore<Bookmark>>,
    pub community_followers: Arc<dyn EdgeStore<CommunityFollower>>,
}

impl Stores {
    /// Every store call is bounded by `timeout`
    pub fn mongo(db: &Database, timeout: Duration) -> Self {
        Self {
            users: Arc::new(MongoUserStore::new(db, timeout)),
            cultures: Arc::new(MongoProfileStore::<Culture>::new(db, timeout)),
            preferences: Arc::new(MongoProfileStore::<Preference>::new(db, timeout)),
            communities: Arc::new(MongoCommunityStore::new(db, timeout)),
            follows: Arc::new(MongoEdgeStore::<Follow>::new(db, timeout)),
            bookmarks: Arc::new(MongoEdgeStore::<Bookmark>::new(db, timeout)),
            community_followers: Arc::new(MongoEdgeStore::<CommunityFollower>::new(db, timeout)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryUserStore::new()),
            cultures: Arc::new(MemoryProfileStore::<Culture>::new()),
            preferences: Arc::new(MemoryProfileStore::<Preference>::new()),
            communities: Arc::new(MemoryCommunityStore::new()),
            follows: Arc::new(MemoryEdgeStore::<Follow>::new()),
            bookmarks: Arc::new(MemoryEdgeStore::<Bookmark>::new()),
            community_followers: Arc::new(MemoryEdgeStore::<CommunityFollower>::new()),
        }
    }
}
