//! Per-ticket conversation view

use crate::store::{DonationTicket, Id, TicketMessage};

/// Who a ticket belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketOwner {
    /// Opened by a visitor; only the contact details left on the form
    Anonymous {
        name: Option<String>,
        email: Option<String>,
    },
    /// Opened by a signed-in account
    Registered { user_id: Id },
}

impl TicketOwner {
    pub fn of(ticket: &DonationTicket) -> Self {
        match ticket.user_id {
            Some(user_id) => TicketOwner::Registered { user_id },
            None => TicketOwner::Anonymous {
                name: ticket.donor_name.clone(),
                email: ticket.donor_email.clone(),
            },
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, TicketOwner::Anonymous { .. })
    }

    /// Short text for list columns
    pub fn label(&self) -> String {
        match self {
            TicketOwner::Registered { user_id } => format!("user #{}", user_id),
            TicketOwner::Anonymous { name, email } => match (name, email) {
                (Some(n), Some(e)) => format!("{} <{}> (anonymous)", n, e),
                (Some(n), None) => format!("{} (anonymous)", n),
                (None, Some(e)) => format!("<{}> (anonymous)", e),
                (None, None) => "anonymous".to_string(),
            },
        }
    }
}

/// A ticket and its messages in chronological order
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    ticket: DonationTicket,
    messages: Vec<TicketMessage>,
}

fn order_key(m: &TicketMessage) -> (chrono::DateTime<chrono::Utc>, Id) {
    (m.created_at, m.id)
}

impl Conversation {
    pub fn new(ticket: DonationTicket, mut messages: Vec<TicketMessage>) -> Self {
        messages.sort_by_key(order_key);
        Self { ticket, messages }
    }

    pub fn ticket(&self) -> &DonationTicket {
        &self.ticket
    }

    pub fn messages(&self) -> &[TicketMessage] {
        &self.messages
    }

    pub fn owner(&self) -> TicketOwner {
        TicketOwner::of(&self.ticket)
    }

    /// Archived tickets are read-only
    pub fn is_writable(&self) -> bool {
        self.ticket.status.accepts_replies()
    }

    /// Insert a message returned by the backend, keeping the order.
    /// A message already present (same id) is ignored.
    pub fn append_local(&mut self, message: TicketMessage) {
        if self.messages.iter().any(|m| m.id == message.id) {
            return;
        }
        if message.created_at > self.ticket.updated_at {
            self.ticket.updated_at = message.created_at;
        }
        let key = order_key(&message);
        let idx = self.messages.partition_point(|m| order_key(m) <= key);
        self.messages.insert(idx, message);
    }

    /// Replace the ticket with a fresher copy of the same ticket
    pub fn patch_ticket(&mut self, ticket: DonationTicket) {
        if ticket.id == self.ticket.id {
            self.ticket = ticket;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::from_millis;
    use crate::store::TicketStatus;

    fn ticket(status: TicketStatus, user_id: Option<Id>) -> DonationTicket {
        DonationTicket {
            id: 1,
            subject: "Pickup".to_string(),
            donor_name: Some("Pablo".to_string()),
            donor_email: Some("pablo@example.org".to_string()),
            donor_phone: None,
            status,
            assigned_admin: None,
            user_id,
            created_at: from_millis(0),
            updated_at: from_millis(10),
        }
    }

    fn message(id: Id, at: i64) -> TicketMessage {
        TicketMessage {
            id,
            module_id: 1,
            sender_id: None,
            body: format!("message {}", id),
            created_at: from_millis(at),
        }
    }

    #[test]
    fn test_messages_sorted_with_id_tiebreak() {
        let conv = Conversation::new(
            ticket(TicketStatus::Open, None),
            vec![message(3, 50), message(2, 20), message(1, 20)],
        );
        let ids: Vec<_> = conv.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_append_local_keeps_order_and_ignores_duplicates() {
        let mut conv = Conversation::new(
            ticket(TicketStatus::Open, None),
            vec![message(1, 10), message(3, 30)],
        );
        conv.append_local(message(2, 20));
        conv.append_local(message(4, 40));
        conv.append_local(message(4, 40));

        let ids: Vec<_> = conv.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(conv.ticket().updated_at, from_millis(40));
    }

    #[test]
    fn test_archived_is_read_only() {
        assert!(Conversation::new(ticket(TicketStatus::Closed, None), vec![]).is_writable());
        assert!(!Conversation::new(ticket(TicketStatus::Archived, None), vec![]).is_writable());
    }

    #[test]
    fn test_owner() {
        let anon = TicketOwner::of(&ticket(TicketStatus::Open, None));
        assert!(anon.is_anonymous());
        assert_eq!(anon.label(), "Pablo <pablo@example.org> (anonymous)");

        let registered = TicketOwner::of(&ticket(TicketStatus::Open, Some(9)));
        assert_eq!(registered, TicketOwner::Registered { user_id: 9 });
    }
}
