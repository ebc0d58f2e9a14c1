//! Core record types for the portal
//!
//! These types are shared by the store, the REST handlers and the REST
//! client, so they serialize to the same JSON on both ends of the wire:
//! - `User` and `Role`: accounts and dashboard access
//! - `DonationTicket` and `TicketMessage`: donor support conversations
//! - `Donation`: money or goods pledges
//! - `VolunteerOption`, `VolunteerForm`, `VolunteerProposal`: volunteering
//! - `Workshop` and `WorkshopRegistration`: workshop sign-ups
//! - `EventNewsItem`: published events and news

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Row identifier (SQLite rowid)
pub type Id = i64;

/// Convert stored milliseconds back into a UTC timestamp
pub(crate) fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

/// Error returned when a status string does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Wire and database representation
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Get all variants for iteration
            pub fn all() -> &'static [$name] {
                &[$($name::$variant,)+]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(ParseEnumError {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

// ============================================
// USERS
// ============================================

/// Dashboard role of an account
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

string_enum!(Role, "role", { Admin => "admin", User => "user" });

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Account creation input (password is still in clear text here)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

// ============================================
// TICKETS
// ============================================

/// Lifecycle status of a donation ticket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Closed,
    Archived,
}

string_enum!(TicketStatus, "ticket status", {
    Open => "open",
    Closed => "closed",
    Archived => "archived",
});

impl TicketStatus {
    /// Whether an admin may move a ticket from `self` to `next`.
    ///
    /// open -> closed -> archived, with reopen (closed -> open) and
    /// unarchive (archived -> closed). Same-state moves are rejected.
    pub fn can_transition_to(self, next: TicketStatus) -> bool {
        matches!(
            (self, next),
            (TicketStatus::Open, TicketStatus::Closed)
                | (TicketStatus::Closed, TicketStatus::Open)
                | (TicketStatus::Closed, TicketStatus::Archived)
                | (TicketStatus::Archived, TicketStatus::Closed)
        )
    }

    /// Archived tickets are read-only
    pub fn accepts_replies(self) -> bool {
        self != TicketStatus::Archived
    }
}

/// A donor or support inquiry with a lifecycle status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DonationTicket {
    pub id: Id,
    pub subject: String,
    pub donor_name: Option<String>,
    pub donor_email: Option<String>,
    pub donor_phone: Option<String>,
    pub status: TicketStatus,
    pub assigned_admin: Option<Id>,
    /// Owning account; `None` for tickets opened anonymously
    pub user_id: Option<Id>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DonationTicket {
    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }
}

/// Ticket creation input
#[derive(Debug, Clone, Default)]
pub struct NewTicket {
    pub subject: String,
    pub donor_name: Option<String>,
    pub donor_email: Option<String>,
    pub donor_phone: Option<String>,
    pub user_id: Option<Id>,
    /// First message of the conversation
    pub message: String,
}

/// One message of a ticket conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketMessage {
    pub id: Id,
    /// Owning ticket
    pub module_id: Id,
    /// Author; `None` when written by an anonymous donor
    pub sender_id: Option<Id>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Filter for ticket listings
#[derive(Debug, Clone, Default)]
pub struct TicketQuery {
    pub status: Option<TicketStatus>,
    pub include_archived: bool,
    /// Restrict to tickets owned by this user
    pub owner: Option<Id>,
}

// ============================================
// DONATIONS
// ============================================

/// What is being donated
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DonationKind {
    Money,
    Goods,
}

string_enum!(DonationKind, "donation kind", { Money => "money", Goods => "goods" });

/// A recorded donation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Donation {
    pub id: Id,
    pub donor_name: String,
    pub donor_email: String,
    /// Amount in cents; zero for goods donations
    pub amount_cents: i64,
    pub currency: String,
    pub kind: DonationKind,
    pub message: Option<String>,
    pub user_id: Option<Id>,
    /// Ticket opened from the donation message, if any
    pub ticket_id: Option<Id>,
    pub created_at: DateTime<Utc>,
}

/// Donation creation input
#[derive(Debug, Clone)]
pub struct NewDonation {
    pub donor_name: String,
    pub donor_email: String,
    pub amount_cents: i64,
    pub currency: String,
    pub kind: DonationKind,
    pub message: Option<String>,
    pub user_id: Option<Id>,
}

// ============================================
// VOLUNTEERING
// ============================================

/// Review status shared by volunteer options, enrollments and proposals
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
    Filed,
}

string_enum!(ReviewStatus, "review status", {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    Filed => "filed",
});

/// An admin-defined volunteering opportunity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VolunteerOption {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub schedule: String,
    pub location: String,
    pub capacity: Option<i64>,
    pub status: ReviewStatus,
    /// Number of non-rejected enrollments
    pub enrolled: i64,
    pub created_at: DateTime<Utc>,
}

impl VolunteerOption {
    pub fn is_full(&self) -> bool {
        self.capacity.map(|c| self.enrolled >= c).unwrap_or(false)
    }
}

/// Descriptive fields of an option or proposal
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VolunteerDetails {
    pub title: String,
    pub description: String,
    pub schedule: String,
    pub location: String,
}

/// A user's enrollment in a volunteer option
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VolunteerForm {
    pub id: Id,
    pub option_id: Id,
    pub user_id: Id,
    pub note: Option<String>,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
}

/// A user-proposed volunteering opportunity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VolunteerProposal {
    pub id: Id,
    pub user_id: Id,
    pub title: String,
    pub description: String,
    pub schedule: String,
    pub location: String,
    pub status: ReviewStatus,
    /// Option published from this proposal once approved
    pub option_id: Option<Id>,
    pub created_at: DateTime<Utc>,
}

// ============================================
// WORKSHOPS
// ============================================

/// A scheduled workshop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Workshop {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub capacity: i64,
    pub registered: i64,
    pub created_at: DateTime<Utc>,
}

impl Workshop {
    pub fn seats_left(&self) -> i64 {
        (self.capacity - self.registered).max(0)
    }
}

/// Workshop creation or update input
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkshopDetails {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub capacity: i64,
}

/// A user's seat in a workshop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkshopRegistration {
    pub id: Id,
    pub workshop_id: Id,
    pub user_id: Id,
    pub created_at: DateTime<Utc>,
}

// ============================================
// EVENTS & NEWS
// ============================================

/// Kind of published item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EventNewsKind {
    Event,
    News,
}

string_enum!(EventNewsKind, "item type", { Event => "event", News => "news" });

/// A published event or news entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventNewsItem {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub image_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: EventNewsKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event/news creation or update input
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventNewsDetails {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub image_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: EventNewsKind,
}
