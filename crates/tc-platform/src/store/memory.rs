//! In-memory stores
//!
//! Back the same traits as the MongoDB stores and enforce the same unique
//! keys, so services behave identically on either backend. Used by tests
//! and by the `memory` store backend.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::community::entity::Community;
use crate::community::repository::CommunityStore;
use crate::profile::entity::ProfileRecord;
use crate::profile::repository::ProfileStore;
use crate::relationship::entity::Edge;
use crate::relationship::repository::{edge_key, EdgeStore};
use crate::shared::error::{PlatformError, Result};
use crate::user::entity::{SortDirection, User, UserPatch, UserSort};
use crate::user::repository::UserStore;

/// Skip `offset` items and keep at most `limit`; a non-positive limit keeps all
fn page<T, I: Iterator<Item = T>>(items: I, offset: u64, limit: i64) -> Vec<T> {
    let skipped = items.skip(usize::try_from(offset).unwrap_or(usize::MAX));
    match usize::try_from(limit) {
        Ok(limit) if limit > 0 => skipped.take(limit).collect(),
        _ => skipped.collect(),
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<BTreeMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_unique(users: &BTreeMap<String, User>, candidate: &User) -> Result<()> {
        for other in users.values().filter(|u| u.id != candidate.id) {
            if other.email == candidate.email {
                return Err(PlatformError::duplicate("User", "email", candidate.email.clone()));
            }
            if let (Some(a), Some(b)) = (&other.user_name, &candidate.user_name) {
                if a == b {
                    return Err(PlatformError::duplicate("User", "user_name", b.clone()));
                }
            }
        }
        Ok(())
    }

    fn update_where<F: Fn(&User) -> bool>(&self, matches: F, patch: &UserPatch) -> Result<Option<User>> {
        let mut users = self.users.lock();
        let Some(current) = users.values().find(|u| matches(u)) else {
            return Ok(None);
        };

        let mut updated = current.clone();
        updated.apply(patch);
        Self::check_unique(&users, &updated)?;

        users.insert(updated.id.clone(), updated.clone());
        Ok(Some(updated))
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: &User) -> Result<()> {
        let mut users = self.users.lock();
        if users.contains_key(&user.id) {
            return Err(PlatformError::duplicate("User", "_id", user.id.clone()));
        }
        Self::check_unique(&users, user)?;
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.lock().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.lock().values().find(|u| u.email == email).cloned())
    }

    async fn update_by_id(&self, id: &str, patch: &UserPatch) -> Result<Option<User>> {
        self.update_where(|u| u.id == id, patch)
    }

    async fn update_by_email(&self, email: &str, patch: &UserPatch) -> Result<Option<User>> {
        self.update_where(|u| u.email == email, patch)
    }

    async fn list_page(&self, sort: UserSort, offset: u64, limit: i64) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.users.lock().values().cloned().collect();
        users.sort_by(|a, b| {
            let order = a.sort_value(sort.field).cmp(&b.sort_value(sort.field));
            let order = match sort.direction {
                SortDirection::Asc => order,
                SortDirection::Desc => order.reverse(),
            };
            order.then_with(|| a.id.cmp(&b.id))
        });
        Ok(page(users.into_iter(), offset, limit))
    }
}

pub struct MemoryProfileStore<T: ProfileRecord> {
    records: Mutex<HashMap<String, T>>,
}

impl<T: ProfileRecord> MemoryProfileStore<T> {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: ProfileRecord> Default for MemoryProfileStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: ProfileRecord> ProfileStore<T> for MemoryProfileStore<T> {
    async fn upsert(&self, record: &T) -> Result<T> {
        let mut records = self.records.lock();
        let stored = records
            .entry(record.user_id().to_string())
            .and_modify(|existing| existing.merge(record.clone()))
            .or_insert_with(|| record.clone());
        Ok(stored.clone())
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Option<T>> {
        Ok(self.records.lock().get(user_id).cloned())
    }

    async fn find_by_users(&self, user_ids: &[String]) -> Result<Vec<T>> {
        let records = self.records.lock();
        Ok(user_ids.iter().filter_map(|id| records.get(id).cloned()).collect())
    }
}

#[derive(Default)]
pub struct MemoryCommunityStore {
    communities: Mutex<BTreeMap<String, Community>>,
}

impl MemoryCommunityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommunityStore for MemoryCommunityStore {
    async fn insert(&self, community: &Community) -> Result<()> {
        let mut communities = self.communities.lock();
        for other in communities.values() {
            if other.name == community.name {
                return Err(PlatformError::duplicate("Community", "name", community.name.clone()));
            }
            if other.owner_id == community.owner_id {
                return Err(PlatformError::duplicate("Community", "owner_id", community.owner_id.clone()));
            }
        }
        communities.insert(community.id.clone(), community.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Community>> {
        Ok(self.communities.lock().get(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.communities.lock().remove(id).is_some())
    }

    async fn list(&self, offset: u64, limit: i64) -> Result<Vec<Community>> {
        let communities = self.communities.lock();
        Ok(page(communities.values().cloned(), offset, limit))
    }
}

/// Edges keyed by id, so iteration follows creation order
pub struct MemoryEdgeStore<E: Edge> {
    edges: Mutex<BTreeMap<String, E>>,
}

impl<E: Edge> MemoryEdgeStore<E> {
    pub fn new() -> Self {
        Self {
            edges: Mutex::new(BTreeMap::new()),
        }
    }

    fn same_pair(edge: &E, parent_id: &str, actor_id: &str) -> bool {
        edge.parent_id() == parent_id && edge.actor_id() == actor_id
    }
}

impl<E: Edge> Default for MemoryEdgeStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Edge> EdgeStore<E> for MemoryEdgeStore<E> {
    async fn insert(&self, edge: &E) -> Result<()> {
        let mut edges = self.edges.lock();
        if edges.values().any(|e| Self::same_pair(e, edge.parent_id(), edge.actor_id())) {
            let (field, value) = edge_key::<E>(edge.parent_id(), edge.actor_id());
            return Err(PlatformError::duplicate(E::ENTITY, field, value));
        }
        edges.insert(edge.id().to_string(), edge.clone());
        Ok(())
    }

    async fn find(&self, parent_id: &str, actor_id: &str) -> Result<Option<E>> {
        let edges = self.edges.lock();
        Ok(edges.values().find(|e| Self::same_pair(e, parent_id, actor_id)).cloned())
    }

    async fn delete(&self, parent_id: &str, actor_id: &str) -> Result<bool> {
        let mut edges = self.edges.lock();
        let before = edges.len();
        edges.retain(|_, e| !Self::same_pair(e, parent_id, actor_id));
        Ok(edges.len() != before)
    }

    async fn count_by_parent(&self, parent_id: &str) -> Result<u64> {
        let edges = self.edges.lock();
        Ok(edges.values().filter(|e| e.parent_id() == parent_id).count() as u64)
    }

    async fn list_by_parent(&self, parent_id: &str, offset: u64, limit: i64) -> Result<Vec<E>> {
        let edges = self.edges.lock();
        Ok(page(
            edges.values().filter(|e| e.parent_id() == parent_id).cloned(),
            offset,
            limit,
        ))
    }
}
