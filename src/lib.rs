//! # Fundacion
//!
//! Nonprofit portal backend and client library: donations, volunteering,
//! workshops, events/news and donor support tickets.
//!
//! ## Modules
//!
//! - [`store`]: SQLite-backed records and their lifecycle rules
//! - [`api`]: REST API server with Axum
//! - [`client`]: Typed HTTP client for the REST API
//! - [`session`]: Auth token persistence and change watching
//! - [`discovery`]: Finds a live backend among candidate URLs
//! - [`tickets`]: Ticket list filtering and conversation state
//! - [`forms`]: Client-side form validation
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fundacion::{ApiClient, Session};
//! use fundacion::forms::LoginForm;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::in_memory();
//!     let client = ApiClient::new("http://localhost:8090", Duration::from_secs(10))?;
//!
//!     let form = LoginForm {
//!         email: "ana@example.org".to_string(),
//!         password: "secret-password".to_string(),
//!     };
//!     let login = client.login(&form.validate()?).await?;
//!     session.login(&login.token)?;
//!
//!     let client = client.with_token(login.token);
//!     println!("Signed in as {}", client.me().await?.name);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod discovery;
pub mod forms;
pub mod pagination;
pub mod session;
pub mod store;
pub mod tickets;

// Re-export top-level types for convenience
pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use client::{ApiClient, ClientError, ClientResult};

pub use config::{generate_default_config, Config, ConfigError, LoggingConfig};

pub use discovery::{DiscoveryError, HealthProbe, HttpProbe};

pub use pagination::{Page, PageParams};

pub use session::{AuthStatus, AuthWatcher, Session, SessionError, TokenStore};

pub use store::{
    Donation, DonationKind, DonationTicket, EventNewsItem, EventNewsKind, Id, ReviewStatus, Role,
    Store, StoreError, StoreResult, TicketMessage, TicketStatus, User, VolunteerOption, Workshop,
};

pub use tickets::{Conversation, TicketBoard, TicketFilter, TicketOwner};
