//! MongoDB Index Initialization
//!
//! Creates indexes for all collections on application startup. The unique
//! indexes are the only uniqueness guard the stores have, and their names
//! are how a duplicate-key error is traced back to a field.

use mongodb::{bson::doc, options::IndexOptions, Database, IndexModel};
use tracing::info;

use crate::community::entity::CommunityFollower;
use crate::community::repository::{COMMUNITIES_COLLECTION, NAME_INDEX, OWNER_INDEX};
use crate::profile::entity::{Culture, Preference, ProfileRecord};
use crate::relationship::entity::{Bookmark, Edge, Follow};
use crate::user::repository::{EMAIL_INDEX, USERS_COLLECTION, USER_NAME_INDEX};

/// Initialize all MongoDB indexes
pub async fn initialize_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    info!("Initializing MongoDB indexes...");

    create_user_indexes(db).await?;
    create_profile_indexes::<Culture>(db).await?;
    create_profile_indexes::<Preference>(db).await?;
    create_community_indexes(db).await?;
    create_edge_indexes::<Follow>(db).await?;
    create_edge_indexes::<Bookmark>(db).await?;
    create_edge_indexes::<CommunityFollower>(db).await?;

    info!("MongoDB indexes initialized successfully");
    Ok(())
}

fn unique_index(name: &str, keys: mongodb::bson::Document, sparse: bool) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(
            IndexOptions::builder()
                .name(name.to_string())
                .unique(true)
                .sparse(sparse)
                .build(),
        )
        .build()
}

async fn create_user_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let users = db.collection::<mongodb::bson::Document>(USERS_COLLECTION);

    users.create_index(unique_index(EMAIL_INDEX, doc! { "email": 1 }, false)).await?;

    // Absent user names do not collide
    users.create_index(unique_index(USER_NAME_INDEX, doc! { "user_name": 1 }, true)).await?;

    // Overview listing sorts
    users.create_index(
        IndexModel::builder()
            .keys(doc! { "created_at": 1, "_id": 1 })
            .build(),
    ).await?;

    info!("Created indexes on {}", USERS_COLLECTION);
    Ok(())
}

async fn create_profile_indexes<T: ProfileRecord>(db: &Database) -> Result<(), mongodb::error::Error> {
    let collection = db.collection::<mongodb::bson::Document>(T::COLLECTION);
    let name = format!("uniq_{}_user_id", T::COLLECTION);

    collection.create_index(unique_index(&name, doc! { "user_id": 1 }, false)).await?;

    info!("Created indexes on {}", T::COLLECTION);
    Ok(())
}

async fn create_community_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let communities = db.collection::<mongodb::bson::Document>(COMMUNITIES_COLLECTION);

    communities.create_index(unique_index(NAME_INDEX, doc! { "name": 1 }, false)).await?;
    communities.create_index(unique_index(OWNER_INDEX, doc! { "owner_id": 1 }, false)).await?;

    info!("Created indexes on {}", COMMUNITIES_COLLECTION);
    Ok(())
}

async fn create_edge_indexes<E: Edge>(db: &Database) -> Result<(), mongodb::error::Error> {
    let collection = db.collection::<mongodb::bson::Document>(E::COLLECTION);

    let mut keys = mongodb::bson::Document::new();
    keys.insert(E::PARENT_FIELD, 1);
    keys.insert(E::ACTOR_FIELD, 1);
    collection.create_index(unique_index(&E::unique_index(), keys, false)).await?;

    // Reverse lookups: everything one actor follows or bookmarked
    collection.create_index(
        IndexModel::builder()
            .keys(doc! { E::ACTOR_FIELD: 1 })
            .build(),
    ).await?;

    info!("Created indexes on {}", E::COLLECTION);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_index_options() {
        let model = unique_index(USER_NAME_INDEX, doc! { "user_name": 1 }, true);
        let options = model.options.unwrap();

        assert_eq!(options.name.as_deref(), Some(USER_NAME_INDEX));
        assert_eq!(options.unique, Some(true));
        assert_eq!(options.sparse, Some(true));
        assert_eq!(options.background, None);
    }
}
