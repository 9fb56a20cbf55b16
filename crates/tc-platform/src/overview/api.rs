//! Overview endpoints, mounted under `/user`

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::overview::service::OverviewService;
use crate::overview::view::OverviewView;
use crate::shared::api_common::PageParams;
use crate::shared::error::{ErrorResponse, PlatformError};
use crate::shared::middleware::Authenticated;

#[derive(Clone)]
pub struct OverviewApiState {
    pub overview_service: Arc<OverviewService>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OverviewSortQuery {
    /// One of the sortable user fields (default `created_at`)
    #[serde(default, alias = "sortField")]
    pub sort_field: Option<String>,
    /// `asc` (default) or `desc`
    #[serde(default, alias = "sortOrder")]
    pub sort_order: Option<String>,
}

/// The caller's overview
#[utoipa::path(
    get,
    path = "/overview",
    tag = "overview",
    operation_id = "getUserOverview",
    responses(
        (status = 200, description = "Overview", body = OverviewView),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_overview(
    State(state): State<OverviewApiState>,
    auth: Authenticated,
) -> Result<Json<OverviewView>, PlatformError> {
    Ok(Json(state.overview_service.get_overview(&auth.user_id).await?))
}

/// A sorted page of overviews
#[utoipa::path(
    get,
    path = "/overview/all",
    tag = "overview",
    operation_id = "getUserOverviewAll",
    params(OverviewSortQuery, PageParams),
    responses(
        (status = 200, description = "Overview page", body = Vec<OverviewView>),
        (status = 400, description = "Unsupported sort field or order", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_overviews(
    State(state): State<OverviewApiState>,
    _auth: Authenticated,
    Query(sort): Query<OverviewSortQuery>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<OverviewView>>, PlatformError> {
    let overviews = state
        .overview_service
        .list_overviews(sort.sort_field.as_deref(), sort.sort_order.as_deref(), &page)
        .await?;
    Ok(Json(overviews))
}

pub fn overview_router(state: OverviewApiState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_overview))
        .routes(routes!(list_overviews))
        .with_state(state)
}
