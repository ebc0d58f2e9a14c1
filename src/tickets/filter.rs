//! Ticket list filtering

use serde::{Deserialize, Serialize};

use crate::store::{DonationTicket, TicketStatus};

/// What the ticket list currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketFilter {
    /// Only this status. An explicit `archived` wins over `show_archived`.
    pub status: Option<TicketStatus>,
    /// The "mostrar archivados" toggle
    pub show_archived: bool,
    /// Case-insensitive match on subject, donor name or donor email
    pub search: Option<String>,
}

impl TicketFilter {
    pub fn with_status(status: TicketStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn toggle_archived(&mut self) {
        self.show_archived = !self.show_archived;
    }

    /// Whether archived tickets have to be fetched for this filter
    pub fn needs_archived(&self) -> bool {
        match self.status {
            Some(status) => status == TicketStatus::Archived,
            None => self.show_archived,
        }
    }

    pub fn matches(&self, ticket: &DonationTicket) -> bool {
        let status_ok = match self.status {
            Some(status) => ticket.status == status,
            None => ticket.status != TicketStatus::Archived || self.show_archived,
        };

        status_ok && self.matches_search(ticket)
    }

    fn matches_search(&self, ticket: &DonationTicket) -> bool {
        let needle = match self.search.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_lowercase(),
            _ => return true,
        };

        std::iter::once(Some(ticket.subject.as_str()))
            .chain([ticket.donor_name.as_deref(), ticket.donor_email.as_deref()])
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Matching tickets, most recently updated first
    pub fn apply(&self, tickets: &[DonationTicket]) -> Vec<DonationTicket> {
        let mut out: Vec<DonationTicket> = tickets
            .iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        out
    }
}
