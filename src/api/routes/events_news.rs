//! Events & News Routes
//!
//! - GET /api/events-news?type=event|news - Published items (public)
//! - POST /api/events-news - Publish (admin)
//! - GET /api/events-news/:id - One item (public)
//! - PUT /api/events-news/:id - Edit (admin)
//! - DELETE /api/events-news/:id - Remove (admin)

use axum::{extract::State, http::StatusCode};
use std::sync::Arc;

use crate::api::auth::AdminUser;
use crate::api::dto::EventListParams;
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{Json, Path, Query};
use crate::api::routes::require;
use crate::api::state::AppState;
use crate::pagination::Page;
use crate::store::{EventNewsDetails, EventNewsItem, Id};

fn validate(details: &EventNewsDetails) -> ApiResult<()> {
    require("title", &details.title)?;
    require("description", &details.description)?;
    if let Some(url) = &details.image_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ApiError::Validation(format!(
                "image_url '{}' must be an http(s) URL",
                url
            )));
        }
    }
    Ok(())
}

/// GET /api/events-news
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventListParams>,
) -> ApiResult<Json<Page<EventNewsItem>>> {
    let items = state.store.list_items(params.kind).await?;
    Ok(Json(Page::from_params(items, &params.page_params())))
}

/// GET /api/events-news/:id
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
) -> ApiResult<Json<EventNewsItem>> {
    Ok(Json(state.store.get_item(id).await?))
}

/// POST /api/events-news
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(details): Json<EventNewsDetails>,
) -> ApiResult<(StatusCode, Json<EventNewsItem>)> {
    validate(&details)?;
    let item = state.store.create_item(details).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/events-news/:id
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<Id>,
    Json(details): Json<EventNewsDetails>,
) -> ApiResult<Json<EventNewsItem>> {
    validate(&details)?;
    Ok(Json(state.store.update_item(id, details).await?))
}

/// DELETE /api/events-news/:id
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    state.store.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
