//! User Management Routes (admin)
//!
//! - GET /api/users - All accounts
//! - PUT /api/users/:id/role - Promote or demote an account

use axum::extract::State;
use std::sync::Arc;

use crate::api::auth::AdminUser;
use crate::api::dto::RoleUpdate;
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{Json, Path, Query};
use crate::api::state::AppState;
use crate::pagination::{Page, PageParams};
use crate::store::{Id, User};

/// GET /api/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Page<User>>> {
    let users = state.store.list_users().await?;
    Ok(Json(Page::from_params(users, &params)))
}

/// PUT /api/users/:id/role
///
/// An admin cannot change their own role, so the portal always keeps at
/// least the acting admin.
pub async fn set_role(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Id>,
    Json(update): Json<RoleUpdate>,
) -> ApiResult<Json<User>> {
    if admin.id == id {
        return Err(ApiError::Conflict("cannot change your own role".to_string()));
    }

    let user = state.store.set_role(id, update.role).await?;
    tracing::info!(admin_id = admin.id, user_id = id, role = %user.role, "Role changed");
    Ok(Json(user))
}
