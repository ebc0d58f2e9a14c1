//! Workshop Routes
//!
//! - GET /api/workshops - Upcoming and past workshops (public)
//! - POST /api/workshops - Create (admin)
//! - GET /api/workshops/:id - One workshop (public)
//! - PUT /api/workshops/:id - Edit (admin)
//! - DELETE /api/workshops/:id - Remove (admin)
//! - POST /api/workshops/:id/register - Take a seat (user)
//! - DELETE /api/workshops/:id/register - Give the seat back (user)
//! - GET /api/workshops/:id/registrations - Attendees (admin)

use axum::{extract::State, http::StatusCode};
use std::sync::Arc;

use crate::api::auth::{AdminUser, CurrentUser};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{Json, Path, Query};
use crate::api::routes::require;
use crate::api::state::AppState;
use crate::pagination::{Page, PageParams};
use crate::store::{Id, Workshop, WorkshopDetails, WorkshopRegistration};

fn validate(details: &WorkshopDetails) -> ApiResult<()> {
    require("title", &details.title)?;
    require("location", &details.location)?;
    if details.capacity <= 0 {
        return Err(ApiError::Validation("capacity must be positive".to_string()));
    }
    Ok(())
}

/// GET /api/workshops
pub async fn list_workshops(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Page<Workshop>>> {
    let workshops = state.store.list_workshops().await?;
    Ok(Json(Page::from_params(workshops, &params)))
}

/// GET /api/workshops/:id
pub async fn get_workshop(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
) -> ApiResult<Json<Workshop>> {
    Ok(Json(state.store.get_workshop(id).await?))
}

/// POST /api/workshops
pub async fn create_workshop(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(details): Json<WorkshopDetails>,
) -> ApiResult<(StatusCode, Json<Workshop>)> {
    validate(&details)?;
    let workshop = state.store.create_workshop(details).await?;
    Ok((StatusCode::CREATED, Json(workshop)))
}

/// PUT /api/workshops/:id
pub async fn update_workshop(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<Id>,
    Json(details): Json<WorkshopDetails>,
) -> ApiResult<Json<Workshop>> {
    validate(&details)?;
    Ok(Json(state.store.update_workshop(id, details).await?))
}

/// DELETE /api/workshops/:id
pub async fn delete_workshop(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    state.store.delete_workshop(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/workshops/:id/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    CurrentUser { user, .. }: CurrentUser,
    Path(id): Path<Id>,
) -> ApiResult<(StatusCode, Json<WorkshopRegistration>)> {
    let registration = state.store.register_workshop(id, user.id).await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

/// DELETE /api/workshops/:id/register
pub async fn unregister(
    State(state): State<Arc<AppState>>,
    CurrentUser { user, .. }: CurrentUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    state.store.unregister_workshop(id, user.id).await?;
    tracing::info!(workshop_id = id, user_id = user.id, "Workshop registration cancelled");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/workshops/:id/registrations
pub async fn registrations(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<Vec<WorkshopRegistration>>> {
    Ok(Json(state.store.workshop_registrations(id).await?))
}
