//! User Repository

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Bson, Document},
    options::ReturnDocument,
    Collection, Database,
};

use crate::shared::deadline::bounded;
use crate::shared::error::{PlatformError, Result, UniqueKey};
use crate::user::entity::{User, UserPatch, UserSort};

pub const USERS_COLLECTION: &str = "users";
pub const EMAIL_INDEX: &str = "uniq_users_email";
pub const USER_NAME_INDEX: &str = "uniq_users_user_name";

/// Persistence for [`User`]. Email and user name uniqueness is enforced by
/// the store; a collision surfaces as `PlatformError::Duplicate`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: &User) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Apply `patch` and return the updated record, `None` if no user matched
    async fn update_by_id(&self, id: &str, patch: &UserPatch) -> Result<Option<User>>;

    async fn update_by_email(&self, email: &str, patch: &UserPatch) -> Result<Option<User>>;

    /// One page ordered by `sort`, ties broken by id ascending
    async fn list_page(&self, sort: UserSort, offset: u64, limit: i64) -> Result<Vec<User>>;
}

pub struct MongoUserStore {
    collection: Collection<User>,
    timeout: Duration,
}

impl MongoUserStore {
    pub fn new(db: &Database, timeout: Duration) -> Self {
        Self {
            collection: db.collection(USERS_COLLECTION),
            timeout,
        }
    }

    fn unique_keys<'a>(email: Option<&'a str>, user_name: Option<&'a str>) -> Vec<UniqueKey<'a>> {
        let mut keys = Vec::with_capacity(2);
        if let Some(value) = email {
            keys.push(UniqueKey { index: EMAIL_INDEX, field: "email", value });
        }
        if let Some(value) = user_name {
            keys.push(UniqueKey { index: USER_NAME_INDEX, field: "user_name", value });
        }
        keys
    }

    async fn update_one(&self, filter: Document, patch: &UserPatch) -> Result<Option<User>> {
        let mut set = bson::to_document(patch)?;
        set.insert("updated_at", Bson::DateTime(bson::DateTime::now()));

        let keys = Self::unique_keys(patch.email.as_deref(), patch.user_name.as_deref());
        self.collection
            .find_one_and_update(filter, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| PlatformError::from_write(e, "User", &keys))
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn insert(&self, user: &User) -> Result<()> {
        bounded(self.timeout, "users.insert", async {
            let keys = Self::unique_keys(Some(&user.email), user.user_name.as_deref());
            self.collection
                .insert_one(user)
                .await
                .map_err(|e| PlatformError::from_write(e, "User", &keys))?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        bounded(self.timeout, "users.find_by_id", async {
            Ok(self.collection.find_one(doc! { "_id": id }).await?)
        })
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        bounded(self.timeout, "users.find_by_email", async {
            Ok(self.collection.find_one(doc! { "email": email }).await?)
        })
        .await
    }

    async fn update_by_id(&self, id: &str, patch: &UserPatch) -> Result<Option<User>> {
        bounded(self.timeout, "users.update_by_id", self.update_one(doc! { "_id": id }, patch)).await
    }

    async fn update_by_email(&self, email: &str, patch: &UserPatch) -> Result<Option<User>> {
        bounded(self.timeout, "users.update_by_email", self.update_one(doc! { "email": email }, patch)).await
    }

    async fn list_page(&self, sort: UserSort, offset: u64, limit: i64) -> Result<Vec<User>> {
        bounded(self.timeout, "users.list_page", async {
            let mut order = Document::new();
            order.insert(sort.field.field(), sort.direction.as_i32());
            order.insert("_id", 1);

            let cursor = self
                .collection
                .find(doc! {})
                .sort(order)
                .skip(offset)
                .limit(limit)
                .await?;
            Ok(cursor.try_collect().await?)
        })
        .await
    }
}
