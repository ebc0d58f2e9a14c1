//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON and shared with
//! the client so both sides agree on the wire format.

use serde::{Deserialize, Serialize};

use crate::forms::DEFAULT_CURRENCY;
use crate::pagination::PageParams;
use crate::store::{
    DonationKind, DonationTicket, EventNewsKind, ReviewStatus, Role, TicketMessage, TicketStatus,
    User, VolunteerDetails,
};

// ============================================
// AUTH DTOs
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login: the bearer token plus the signed-in user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Public self-registration; always creates a `user` account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
}

// ============================================
// DONATION DTOs
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDonationRequest {
    pub donor_name: String,
    pub donor_email: String,
    /// Amount in cents; zero is allowed for goods donations
    #[serde(default)]
    pub amount_cents: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub kind: DonationKind,
    /// A non-empty message opens a donation ticket
    #[serde(default)]
    pub message: Option<String>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

// ============================================
// TICKET DTOs
// ============================================

/// Contact / support message; opens a ticket with its first message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicketRequest {
    pub subject: String,
    #[serde(default)]
    pub donor_name: Option<String>,
    #[serde(default)]
    pub donor_email: Option<String>,
    #[serde(default)]
    pub donor_phone: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyRequest {
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketStatusUpdate {
    pub status: TicketStatus,
}

/// Ticket list query: `?status=open&include_archived=true&page=2`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketListParams {
    #[serde(default)]
    pub status: Option<TicketStatus>,
    #[serde(default)]
    pub include_archived: bool,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub per_page: Option<usize>,
}

impl TicketListParams {
    pub fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// A ticket with its whole conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketDetail {
    pub ticket: DonationTicket,
    pub messages: Vec<TicketMessage>,
}

// ============================================
// VOLUNTEER DTOs
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolunteerOptionRequest {
    #[serde(flatten)]
    pub details: VolunteerDetails,
    #[serde(default)]
    pub capacity: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrollRequest {
    #[serde(default)]
    pub note: Option<String>,
}

/// Admin review of an option, enrollment or proposal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewUpdate {
    pub status: ReviewStatus,
}

// ============================================
// EVENTS / NEWS DTOs
// ============================================

/// `?type=news&page=1`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventListParams {
    #[serde(default, rename = "type")]
    pub kind: Option<EventNewsKind>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub per_page: Option<usize>,
}

impl EventListParams {
    pub fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy"
    pub status: String,
    /// "ok" or "error"
    pub database: String,
    pub uptime_seconds: u64,
    pub version: String,
}
