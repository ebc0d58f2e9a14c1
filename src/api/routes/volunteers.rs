//! Volunteer Routes
//!
//! ## Options
//! - GET /api/volunteer-options - Approved options (admins see all)
//! - POST /api/volunteer-options - Publish an option (admin)
//! - PUT /api/volunteer-options/:id - Edit (admin)
//! - DELETE /api/volunteer-options/:id - Remove (admin)
//! - PUT /api/volunteer-options/:id/status - Review (admin)
//! - POST /api/volunteer-options/:id/enroll - Enroll (user)
//!
//! ## Enrollments
//! - GET /api/volunteers - All enrollments (admin)
//! - GET /api/volunteers/mine - The caller's enrollments
//! - PUT /api/volunteers/:id/status - Review (admin)
//!
//! ## Proposals
//! - GET /api/volunteer-proposals - Admin: all; user: own
//! - POST /api/volunteer-proposals - Propose an opportunity
//! - PUT /api/volunteer-proposals/:id/status - Review (admin)

use axum::{extract::State, http::StatusCode};
use std::sync::Arc;

use crate::api::auth::{AdminUser, CurrentUser, OptionalUser};
use crate::api::dto::{EnrollRequest, ReviewUpdate, VolunteerOptionRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{Json, Path, Query};
use crate::api::routes::require;
use crate::api::state::AppState;
use crate::forms::{MESSAGE_MAX_CHARS, TITLE_MAX_CHARS};
use crate::pagination::{Page, PageParams};
use crate::store::{Id, VolunteerDetails, VolunteerForm, VolunteerOption, VolunteerProposal};

fn validate_details(details: &VolunteerDetails) -> ApiResult<()> {
    require("title", &details.title)?;
    require("description", &details.description)?;
    require("schedule", &details.schedule)?;
    require("location", &details.location)?;
    if details.title.trim().chars().count() > TITLE_MAX_CHARS {
        return Err(ApiError::Validation(format!(
            "title must be at most {} characters",
            TITLE_MAX_CHARS
        )));
    }
    Ok(())
}

fn validate_option(req: &VolunteerOptionRequest) -> ApiResult<()> {
    validate_details(&req.details)?;
    if matches!(req.capacity, Some(c) if c <= 0) {
        return Err(ApiError::Validation("capacity must be positive".to_string()));
    }
    Ok(())
}

// ==================== Options ====================

/// GET /api/volunteer-options
pub async fn list_options(
    State(state): State<Arc<AppState>>,
    caller: OptionalUser,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Page<VolunteerOption>>> {
    let options = state.store.list_options(!caller.is_admin()).await?;
    Ok(Json(Page::from_params(options, &params)))
}

/// POST /api/volunteer-options
pub async fn create_option(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(req): Json<VolunteerOptionRequest>,
) -> ApiResult<(StatusCode, Json<VolunteerOption>)> {
    validate_option(&req)?;
    let option = state.store.create_option(req.details, req.capacity).await?;
    Ok((StatusCode::CREATED, Json(option)))
}

/// PUT /api/volunteer-options/:id
pub async fn update_option(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<Id>,
    Json(req): Json<VolunteerOptionRequest>,
) -> ApiResult<Json<VolunteerOption>> {
    validate_option(&req)?;
    let option = state.store.update_option(id, req.details, req.capacity).await?;
    Ok(Json(option))
}

/// DELETE /api/volunteer-options/:id
pub async fn delete_option(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    state.store.delete_option(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/volunteer-options/:id/status
pub async fn set_option_status(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<Id>,
    Json(update): Json<ReviewUpdate>,
) -> ApiResult<Json<VolunteerOption>> {
    Ok(Json(state.store.set_option_status(id, update.status).await?))
}

/// POST /api/volunteer-options/:id/enroll
///
/// The body is optional; an empty request enrolls without a note.
pub async fn enroll(
    State(state): State<Arc<AppState>>,
    CurrentUser { user, .. }: CurrentUser,
    Path(id): Path<Id>,
    body: Option<Json<EnrollRequest>>,
) -> ApiResult<(StatusCode, Json<VolunteerForm>)> {
    let note = body
        .and_then(|Json(req)| req.note)
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    if note.as_ref().is_some_and(|n| n.chars().count() > MESSAGE_MAX_CHARS) {
        return Err(ApiError::Validation(format!(
            "note must be at most {} characters",
            MESSAGE_MAX_CHARS
        )));
    }

    let form = state.store.enroll(id, user.id, note).await?;
    Ok((StatusCode::CREATED, Json(form)))
}

// ==================== Enrollments ====================

/// GET /api/volunteers
pub async fn list_enrollments(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Page<VolunteerForm>>> {
    let forms = state.store.list_enrollments(None).await?;
    Ok(Json(Page::from_params(forms, &params)))
}

/// GET /api/volunteers/mine
pub async fn my_enrollments(
    State(state): State<Arc<AppState>>,
    CurrentUser { user, .. }: CurrentUser,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Page<VolunteerForm>>> {
    let forms = state.store.list_enrollments(Some(user.id)).await?;
    Ok(Json(Page::from_params(forms, &params)))
}

/// PUT /api/volunteers/:id/status
pub async fn set_enrollment_status(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<Id>,
    Json(update): Json<ReviewUpdate>,
) -> ApiResult<Json<VolunteerForm>> {
    Ok(Json(state.store.set_enrollment_status(id, update.status).await?))
}

// ==================== Proposals ====================

/// GET /api/volunteer-proposals
pub async fn list_proposals(
    State(state): State<Arc<AppState>>,
    CurrentUser { user, .. }: CurrentUser,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Page<VolunteerProposal>>> {
    let owner = (!user.is_admin()).then_some(user.id);
    let proposals = state.store.list_proposals(owner).await?;
    Ok(Json(Page::from_params(proposals, &params)))
}

/// POST /api/volunteer-proposals
pub async fn create_proposal(
    State(state): State<Arc<AppState>>,
    CurrentUser { user, .. }: CurrentUser,
    Json(details): Json<VolunteerDetails>,
) -> ApiResult<(StatusCode, Json<VolunteerProposal>)> {
    validate_details(&details)?;
    let proposal = state.store.create_proposal(user.id, details).await?;
    Ok((StatusCode::CREATED, Json(proposal)))
}

/// PUT /api/volunteer-proposals/:id/status
///
/// Approving publishes the proposal as a new volunteer option.
pub async fn review_proposal(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<Id>,
    Json(update): Json<ReviewUpdate>,
) -> ApiResult<Json<VolunteerProposal>> {
    Ok(Json(state.store.review_proposal(id, update.status).await?))
}
