//! Fundacion Store
//!
//! SQLite-backed persistence for every record the portal manages:
//!
//! - **types**: Record types shared with the API and the client
//! - **users**: Accounts, password hashes and bearer sessions
//! - **tickets**: Donation tickets and their message threads
//! - **donations**: Donations (opening a ticket when a message is attached)
//! - **volunteers**: Options, enrollments and proposals
//! - **workshops**: Workshops and registrations
//! - **events**: Published events and news
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use fundacion::store::{NewTicket, Store};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Store::open("./fundacion.db")?;
//!
//!     let (ticket, first) = store
//!         .create_ticket(NewTicket {
//!             subject: "Food donation pickup".to_string(),
//!             donor_email: Some("ana@example.org".to_string()),
//!             message: "Can you pick up 20kg of rice?".to_string(),
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     println!("Ticket {} opened with message {}", ticket.id, first.id);
//!     Ok(())
//! }
//! ```

pub mod donations;
pub mod error;
pub mod events;
pub mod tickets;
pub mod types;
pub mod users;
pub mod volunteers;
pub mod workshops;

pub use error::{StoreError, StoreResult};
pub use types::{
    Donation, DonationKind, DonationTicket, EventNewsDetails, EventNewsItem, EventNewsKind, Id,
    NewDonation, NewTicket, NewUser, ParseEnumError, ReviewStatus, Role, TicketMessage,
    TicketQuery, TicketStatus, User, VolunteerDetails, VolunteerForm, VolunteerOption,
    VolunteerProposal, Workshop, WorkshopDetails, WorkshopRegistration,
};

use rusqlite::{types::Type, Connection, OpenFlags, Row};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::sync::Mutex;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at INTEGER NOT NULL,
    expires_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS donation_tickets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    subject TEXT NOT NULL,
    donor_name TEXT,
    donor_email TEXT,
    donor_phone TEXT,
    status TEXT NOT NULL,
    assigned_admin INTEGER REFERENCES users(id),
    user_id INTEGER REFERENCES users(id),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tickets_status ON donation_tickets(status);
CREATE INDEX IF NOT EXISTS idx_tickets_user ON donation_tickets(user_id);

CREATE TABLE IF NOT EXISTS ticket_messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    module_id INTEGER NOT NULL REFERENCES donation_tickets(id),
    sender_id INTEGER REFERENCES users(id),
    body TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_messages_ticket ON ticket_messages(module_id, created_at);

CREATE TABLE IF NOT EXISTS donations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    donor_name TEXT NOT NULL,
    donor_email TEXT NOT NULL,
    amount_cents INTEGER NOT NULL,
    currency TEXT NOT NULL,
    kind TEXT NOT NULL,
    message TEXT,
    user_id INTEGER REFERENCES users(id),
    ticket_id INTEGER REFERENCES donation_tickets(id),
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS volunteer_options (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    schedule TEXT NOT NULL,
    location TEXT NOT NULL,
    capacity INTEGER,
    status TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS volunteer_forms (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    option_id INTEGER NOT NULL REFERENCES volunteer_options(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id),
    note TEXT,
    status TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS volunteer_proposals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    schedule TEXT NOT NULL,
    location TEXT NOT NULL,
    status TEXT NOT NULL,
    option_id INTEGER REFERENCES volunteer_options(id) ON DELETE SET NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS workshops (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    date INTEGER NOT NULL,
    location TEXT NOT NULL,
    capacity INTEGER NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS workshop_registrations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    workshop_id INTEGER NOT NULL REFERENCES workshops(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id),
    created_at INTEGER NOT NULL,
    UNIQUE (workshop_id, user_id)
);

CREATE TABLE IF NOT EXISTS events_news (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    date INTEGER NOT NULL,
    image_url TEXT,
    kind TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
";

/// SQLite store shared by all request handlers
pub struct Store {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl Store {
    /// Create or open a store at `path`
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Self::init(conn, Some(path))
    }

    /// Create a throwaway in-memory store
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;

        tracing::debug!(path = ?path, "Store schema ready");

        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// On-disk location, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Lightweight liveness check used by the readiness probe
    pub async fn ping(&self) -> bool {
        let conn = self.conn.lock().await;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .is_ok()
    }
}

/// Current time as stored in the database
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Read a text column and parse it into one of the status enums
pub(crate) fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = ParseEnumError>,
{
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Whether an error is a UNIQUE / constraint violation
pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_in_memory() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.ping().await);
        assert!(store.path().is_none());
    }

    #[tokio::test]
    async fn test_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("fundacion.db");

        {
            let store = Store::open(&path).unwrap();
            store
                .create_ticket(NewTicket {
                    subject: "Blankets".to_string(),
                    message: "We have 30 blankets".to_string(),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let store = Store::open(&path).unwrap();
        let tickets = store.list_tickets(&TicketQuery::default()).await.unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].subject, "Blankets");
    }
}
