//! Donation ticket views
//!
//! Client-side logic behind the ticket screens of both dashboards:
//!
//! - **filter**: Status / archived toggle / search over a fetched list
//! - **conversation**: One ticket with its ordered messages and its owner
//! - **board**: List + filter + open conversation, wired to the client

pub mod board;
pub mod conversation;
pub mod filter;

pub use board::TicketBoard;
pub use conversation::{Conversation, TicketOwner};
pub use filter::TicketFilter;
