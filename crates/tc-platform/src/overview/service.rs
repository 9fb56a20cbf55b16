//! Overview Service
//!
//! Read-only over the user, culture and preference stores. Only a missing
//! user is `NotFound`; a missing culture or preference row is zero-filled.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::overview::view::OverviewView;
use crate::profile::entity::{Culture, Preference};
use crate::profile::repository::ProfileStore;
use crate::shared::api_common::PageParams;
use crate::shared::error::{PlatformError, Result};
use crate::user::entity::{SortDirection, UserSort, UserSortField};
use crate::user::repository::UserStore;

pub const DEFAULT_SORT_FIELD: &str = "created_at";

pub struct OverviewService {
    users: Arc<dyn UserStore>,
    cultures: Arc<dyn ProfileStore<Culture>>,
    preferences: Arc<dyn ProfileStore<Preference>>,
}

impl OverviewService {
    pub fn new(
        users: Arc<dyn UserStore>,
        cultures: Arc<dyn ProfileStore<Culture>>,
        preferences: Arc<dyn ProfileStore<Preference>>,
    ) -> Self {
        Self { users, cultures, preferences }
    }

    pub async fn get_overview(&self, user_id: &str) -> Result<OverviewView> {
        async {
            let (user, culture, preference) = tokio::try_join!(
                self.users.find_by_id(user_id),
                self.cultures.find_by_user(user_id),
                self.preferences.find_by_user(user_id),
            )?;
            let user = user.ok_or_else(|| PlatformError::not_found("User", user_id))?;
            Ok(OverviewView::compose(user, culture, preference))
        }
        .await
        .inspect_err(|e: &PlatformError| e.log("get_overview", user_id))
    }

    /// One page of overviews. `sort_field` must be an allow-listed user
    /// field; ties are broken by user id ascending.
    pub async fn list_overviews(
        &self,
        sort_field: Option<&str>,
        sort_order: Option<&str>,
        page: &PageParams,
    ) -> Result<Vec<OverviewView>> {
        let field = sort_field.unwrap_or(DEFAULT_SORT_FIELD);

        async {
            let sort = UserSort {
                field: UserSortField::parse(field)?,
                direction: sort_order.map(SortDirection::parse).transpose()?.unwrap_or_default(),
            };

            let users = self.users.list_page(sort, page.offset(), page.limit()).await?;
            let ids: Vec<String> = users.iter().map(|u| u.id.clone()).collect();

            let (cultures, preferences) = tokio::try_join!(
                self.cultures.find_by_users(&ids),
                self.preferences.find_by_users(&ids),
            )?;
            let mut cultures: HashMap<String, Culture> =
                cultures.into_iter().map(|c| (c.user_id.clone(), c)).collect();
            let mut preferences: HashMap<String, Preference> =
                preferences.into_iter().map(|p| (p.user_id.clone(), p)).collect();

            debug!(count = users.len(), sort_field = field, "Composing overview page");
            Ok(users
                .into_iter()
                .map(|user| {
                    let culture = cultures.remove(&user.id);
                    let preference = preferences.remove(&user.id);
                    OverviewView::compose(user, culture, preference)
                })
                .collect())
        }
        .await
        .inspect_err(|e: &PlatformError| e.log("list_overviews", field))
    }
}
