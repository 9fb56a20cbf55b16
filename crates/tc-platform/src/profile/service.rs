//! Culture / Preference upserts

use std::sync::Arc;

use tracing::info;

use crate::profile::entity::{Culture, Preference, ProfileRecord};
use crate::profile::repository::ProfileStore;
use crate::shared::error::Result;

pub struct ProfileService {
    cultures: Arc<dyn ProfileStore<Culture>>,
    preferences: Arc<dyn ProfileStore<Preference>>,
}

impl ProfileService {
    pub fn new(cultures: Arc<dyn ProfileStore<Culture>>, preferences: Arc<dyn ProfileStore<Preference>>) -> Self {
        Self { cultures, preferences }
    }

    pub async fn upsert_culture(&self, user_id: &str, input: Culture) -> Result<Culture> {
        upsert(self.cultures.as_ref(), "upsert_culture", user_id, input).await
    }

    pub async fn upsert_preference(&self, user_id: &str, input: Preference) -> Result<Preference> {
        upsert(self.preferences.as_ref(), "upsert_preference", user_id, input).await
    }
}

/// The caller's id always wins over any `user_id` in the payload
async fn upsert<T: ProfileRecord>(
    store: &dyn ProfileStore<T>,
    operation: &'static str,
    user_id: &str,
    mut input: T,
) -> Result<T> {
    input.set_user_id(user_id);
    let stored = store
        .upsert(&input)
        .await
        .inspect_err(|e| e.log(operation, user_id))?;

    info!(operation, user_id, entity = T::ENTITY, "Profile record saved");
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryProfileStore;

    #[tokio::test]
    async fn test_payload_user_id_is_ignored() {
        let service = ProfileService::new(
            Arc::new(MemoryProfileStore::new()),
            Arc::new(MemoryProfileStore::new()),
        );

        let saved = service
            .upsert_preference(
                "me",
                Preference {
                    user_id: "someone-else".to_string(),
                    job_type: Some("contract".to_string()),
                    ..Preference::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(saved.user_id, "me");
        assert_eq!(saved.job_type.as_deref(), Some("contract"));
    }
}
