//! Donation Routes
//!
//! - POST /api/donations - Submit a donation (bearer optional)
//! - GET /api/donations - All donations (admin)
//! - GET /api/donations/mine - The caller's donations
//! - GET /api/donations/export - All donations as CSV (admin)

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::auth::{AdminUser, CurrentUser, OptionalUser};
use crate::api::dto::CreateDonationRequest;
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{Json, Query};
use crate::api::routes::{require, require_email};
use crate::api::state::AppState;
use crate::forms::MESSAGE_MAX_CHARS;
use crate::pagination::{Page, PageParams};
use crate::store::{Donation, DonationKind, NewDonation};

/// POST /api/donations
///
/// A donation carrying a message also opens a donation ticket so the
/// organization can follow up.
pub async fn create_donation(
    State(state): State<Arc<AppState>>,
    caller: OptionalUser,
    Json(req): Json<CreateDonationRequest>,
) -> ApiResult<(StatusCode, Json<Donation>)> {
    validate(&req)?;

    let donation = state
        .store
        .create_donation(NewDonation {
            donor_name: req.donor_name,
            donor_email: req.donor_email,
            amount_cents: req.amount_cents,
            currency: req.currency.trim().to_uppercase(),
            kind: req.kind,
            message: req.message,
            user_id: caller.id(),
        })
        .await?;

    tracing::info!(
        donation_id = donation.id,
        kind = %donation.kind,
        amount_cents = donation.amount_cents,
        ticket_id = ?donation.ticket_id,
        "Donation received"
    );

    Ok((StatusCode::CREATED, Json(donation)))
}

fn validate(req: &CreateDonationRequest) -> ApiResult<()> {
    require("donor_name", &req.donor_name)?;
    require_email(&req.donor_email)?;
    require("currency", &req.currency)?;

    match req.kind {
        DonationKind::Money if req.amount_cents <= 0 => {
            return Err(ApiError::Validation(
                "amount must be greater than zero".to_string(),
            ));
        }
        _ if req.amount_cents < 0 => {
            return Err(ApiError::Validation("amount cannot be negative".to_string()));
        }
        _ => {}
    }

    if let Some(message) = &req.message {
        if message.chars().count() > MESSAGE_MAX_CHARS {
            return Err(ApiError::Validation(format!(
                "message must be at most {} characters",
                MESSAGE_MAX_CHARS
            )));
        }
    }
    Ok(())
}

/// GET /api/donations
pub async fn list_donations(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Page<Donation>>> {
    let donations = state.store.list_donations().await?;
    Ok(Json(Page::from_params(donations, &params)))
}

/// GET /api/donations/mine
pub async fn my_donations(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Page<Donation>>> {
    let donations = state.store.donations_for_user(current.user.id).await?;
    Ok(Json(Page::from_params(donations, &params)))
}

/// GET /api/donations/export
pub async fn export_donations(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
) -> ApiResult<Response> {
    let donations = state.store.list_donations().await?;
    let body = format_csv(&donations)?;

    tracing::info!(admin_id = admin.id, rows = donations.len(), "Donations exported");

    let filename = format!("donations_{}.csv", Utc::now().format("%Y%m%d_%H%M%S"));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(body),
    )
        .into_response())
}

/// Format donations as CSV, amounts in major units
fn format_csv(donations: &[Donation]) -> ApiResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let csv_err = |e: csv::Error| ApiError::Internal(format!("CSV export failed: {}", e));

    writer
        .write_record([
            "id",
            "created_at",
            "donor_name",
            "donor_email",
            "kind",
            "amount",
            "currency",
            "message",
            "ticket_id",
        ])
        .map_err(csv_err)?;

    for d in donations {
        writer
            .write_record([
                d.id.to_string(),
                d.created_at.to_rfc3339(),
                d.donor_name.clone(),
                d.donor_email.clone(),
                d.kind.to_string(),
                format!("{}.{:02}", d.amount_cents / 100, d.amount_cents % 100),
                d.currency.clone(),
                d.message.clone().unwrap_or_default(),
                d.ticket_id.map(|id| id.to_string()).unwrap_or_default(),
            ])
            .map_err(csv_err)?;
    }

    writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("CSV export failed: {}", e)))
}
