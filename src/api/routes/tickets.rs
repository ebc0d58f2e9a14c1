//! Donation Ticket Routes
//!
//! - POST /api/donation-tickets - Open a ticket (bearer optional)
//! - GET /api/donation-tickets - Admin: all tickets; user: own tickets
//! - GET /api/donation-tickets/:id - Ticket with conversation
//! - GET /api/donation-tickets/:id/messages - Conversation only
//! - POST /api/donation-tickets/:id/messages - Reply
//! - PUT /api/donation-tickets/:id/status - Close, archive, reopen (admin)
//!
//! Registered users reach their own tickets only. Anonymous tickets have
//! no owner and are therefore admin-only.

use axum::{extract::State, http::StatusCode};
use std::sync::Arc;

use crate::api::auth::{AdminUser, CurrentUser, OptionalUser};
use crate::api::dto::{CreateTicketRequest, ReplyRequest, TicketDetail, TicketListParams, TicketStatusUpdate};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{Json, Path, Query};
use crate::api::routes::{require, require_email, require_message};
use crate::api::state::AppState;
use crate::pagination::Page;
use crate::store::{DonationTicket, Id, NewTicket, TicketMessage, TicketQuery, User};

/// POST /api/donation-tickets
///
/// Visitors must leave an email to be answered; signed-in users default
/// to their account's name and email.
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    OptionalUser(caller): OptionalUser,
    Json(req): Json<CreateTicketRequest>,
) -> ApiResult<(StatusCode, Json<TicketDetail>)> {
    require("subject", &req.subject)?;
    require_message("message", &req.message)?;

    let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let mut donor_name = clean(req.donor_name);
    let mut donor_email = clean(req.donor_email);

    match &caller {
        Some(user) => {
            donor_name.get_or_insert_with(|| user.name.clone());
            donor_email.get_or_insert_with(|| user.email.clone());
        }
        None => {
            let email = donor_email
                .as_deref()
                .ok_or_else(|| ApiError::Validation("donor_email is required".to_string()))?;
            require_email(email)?;
        }
    }

    let (ticket, first) = state
        .store
        .create_ticket(NewTicket {
            subject: req.subject.trim().to_string(),
            donor_name,
            donor_email,
            donor_phone: clean(req.donor_phone),
            user_id: caller.as_ref().map(|u| u.id),
            message: req.message.trim().to_string(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TicketDetail {
            ticket,
            messages: vec![first],
        }),
    ))
}

/// GET /api/donation-tickets
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    CurrentUser { user, .. }: CurrentUser,
    Query(params): Query<TicketListParams>,
) -> ApiResult<Json<Page<DonationTicket>>> {
    let query = TicketQuery {
        status: params.status,
        include_archived: params.include_archived,
        owner: (!user.is_admin()).then_some(user.id),
    };

    let tickets = state.store.list_tickets(&query).await?;
    Ok(Json(Page::from_params(tickets, &params.page_params())))
}

/// Admins see every ticket; users only the ones they opened
fn ensure_access(user: &User, ticket: &DonationTicket) -> ApiResult<()> {
    if user.is_admin() || ticket.user_id == Some(user.id) {
        Ok(())
    } else {
        tracing::debug!(user_id = user.id, ticket_id = ticket.id, "Ticket access refused");
        Err(ApiError::Forbidden(format!("ticket {} belongs to someone else", ticket.id)))
    }
}

async fn accessible_ticket(state: &AppState, user: &User, id: Id) -> ApiResult<DonationTicket> {
    let ticket = state.store.get_ticket(id).await?;
    ensure_access(user, &ticket)?;
    Ok(ticket)
}

/// GET /api/donation-tickets/:id
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    CurrentUser { user, .. }: CurrentUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<TicketDetail>> {
    let ticket = accessible_ticket(&state, &user, id).await?;
    let messages = state.store.list_messages(id).await?;
    Ok(Json(TicketDetail { ticket, messages }))
}

/// GET /api/donation-tickets/:id/messages
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    CurrentUser { user, .. }: CurrentUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<Vec<TicketMessage>>> {
    accessible_ticket(&state, &user, id).await?;
    Ok(Json(state.store.list_messages(id).await?))
}

/// POST /api/donation-tickets/:id/messages
///
/// Archived tickets refuse replies with 409.
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    CurrentUser { user, .. }: CurrentUser,
    Path(id): Path<Id>,
    Json(req): Json<ReplyRequest>,
) -> ApiResult<(StatusCode, Json<TicketMessage>)> {
    require_message("body", &req.body)?;
    accessible_ticket(&state, &user, id).await?;

    let message = state
        .store
        .add_message(id, Some(user.id), req.body.trim())
        .await?;

    tracing::info!(ticket_id = id, sender_id = user.id, admin = user.is_admin(), "Ticket reply");
    Ok((StatusCode::CREATED, Json(message)))
}

/// PUT /api/donation-tickets/:id/status
pub async fn set_status(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Id>,
    Json(update): Json<TicketStatusUpdate>,
) -> ApiResult<Json<DonationTicket>> {
    let ticket = state
        .store
        .set_ticket_status(id, update.status, admin.id)
        .await?;
    Ok(Json(ticket))
}
