//! Authentication Routes
//!
//! - POST /api/login - Exchange credentials for a bearer token
//! - POST /api/register - Create a user account
//! - POST /api/logout - Revoke the current token
//! - GET /api/me - The signed-in account

use axum::{extract::State, http::StatusCode};
use std::sync::Arc;

use crate::api::auth::CurrentUser;
use crate::api::dto::{LoginRequest, LoginResponse, RegisterRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::Json;
use crate::api::routes::{require, require_email};
use crate::api::state::AppState;
use crate::forms::PASSWORD_MIN_CHARS;
use crate::store::{NewUser, Role, User};

/// POST /api/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state
        .store
        .verify_credentials(&req.email, &req.password)
        .await?
        .ok_or_else(|| {
            tracing::info!(email = %req.email.trim(), "Login refused");
            ApiError::Unauthorized
        })?;

    let token = state.store.create_session(user.id, state.session_ttl()).await?;
    tracing::info!(user_id = user.id, role = %user.role, "User logged in");

    Ok(Json(LoginResponse { token, user }))
}

/// POST /api/register
///
/// Self-registration always yields a `user`; admins are promoted via
/// `PUT /api/users/:id/role`.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    require("name", &req.name)?;
    require_email(&req.email)?;
    if req.password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(ApiError::Validation(format!(
            "password must have at least {} characters",
            PASSWORD_MIN_CHARS
        )));
    }

    let user = state
        .store
        .create_user(NewUser {
            name: req.name,
            email: req.email,
            password: req.password,
            role: Role::User,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<StatusCode> {
    state.store.delete_session(&current.token).await?;
    tracing::info!(user_id = current.user.id, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/me
pub async fn me(current: CurrentUser) -> Json<User> {
    Json(current.user)
}
