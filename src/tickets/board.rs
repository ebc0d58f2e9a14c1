//! Ticket board state
//!
//! The dashboard's ticket screen: the fetched list, the active filter and
//! the conversation currently open. Mutations call one endpoint and patch
//! the record it returns into local state instead of re-fetching.

use crate::api::dto::TicketListParams;
use crate::client::{ApiClient, ClientError, ClientResult};
use crate::pagination::{Page, MAX_PER_PAGE};
use crate::store::{DonationTicket, Id, TicketMessage, TicketStatus};

use super::{Conversation, TicketFilter};

pub struct TicketBoard {
    client: ApiClient,
    tickets: Vec<DonationTicket>,
    filter: TicketFilter,
    open: Option<Conversation>,
}

impl TicketBoard {
    pub fn new(client: ApiClient) -> Self {
        Self::with_filter(client, TicketFilter::default())
    }

    pub fn with_filter(client: ApiClient, filter: TicketFilter) -> Self {
        Self {
            client,
            tickets: Vec::new(),
            filter,
            open: None,
        }
    }

    pub fn filter(&self) -> &TicketFilter {
        &self.filter
    }

    /// Change the filter. Call [`refresh`](Self::refresh) afterwards when
    /// the new filter needs archived tickets that were not fetched.
    pub fn set_filter(&mut self, filter: TicketFilter) {
        self.filter = filter;
    }

    pub fn tickets(&self) -> &[DonationTicket] {
        &self.tickets
    }

    pub fn conversation(&self) -> Option<&Conversation> {
        self.open.as_ref()
    }

    pub fn close_conversation(&mut self) {
        self.open = None;
    }

    /// Fetch every ticket the filter may show, all pages
    pub async fn refresh(&mut self) -> ClientResult<()> {
        let mut params = TicketListParams {
            status: self.filter.status,
            include_archived: self.filter.needs_archived(),
            page: Some(1),
            per_page: Some(MAX_PER_PAGE),
        };

        let mut tickets = Vec::new();
        loop {
            let page = self.client.list_tickets(&params).await?;
            let more = page.has_next();
            tickets.extend(page.items);
            if !more {
                break;
            }
            params.page = params.page.map(|p| p + 1);
        }

        tracing::debug!(count = tickets.len(), "Tickets refreshed");
        self.tickets = tickets;
        Ok(())
    }

    /// Load a ticket with its messages and make it the open conversation
    pub async fn open(&mut self, id: Id) -> ClientResult<&Conversation> {
        let detail = self.client.get_ticket(id).await?;
        self.patch(detail.ticket.clone());
        Ok(self
            .open
            .insert(Conversation::new(detail.ticket, detail.messages)))
    }

    fn open_conversation(&self) -> ClientResult<&Conversation> {
        self.open
            .as_ref()
            .ok_or_else(|| ClientError::Validation("no ticket is open".to_string()))
    }

    /// Reply in the open conversation
    pub async fn reply(&mut self, body: &str) -> ClientResult<TicketMessage> {
        let conversation = self.open_conversation()?;
        if !conversation.is_writable() {
            return Err(ClientError::Conflict(format!(
                "ticket {} is archived",
                conversation.ticket().id
            )));
        }
        let id = conversation.ticket().id;

        let message = self.client.reply(id, body).await?;

        if let Some(t) = self.tickets.iter_mut().find(|t| t.id == id) {
            t.updated_at = message.created_at;
        }
        if let Some(conv) = self.open.as_mut() {
            conv.append_local(message.clone());
        }
        Ok(message)
    }

    /// Move any ticket to `status` and patch the result into local state
    pub async fn set_status(&mut self, id: Id, status: TicketStatus) -> ClientResult<DonationTicket> {
        let ticket = self.client.set_ticket_status(id, status).await?;
        self.patch(ticket.clone());
        Ok(ticket)
    }

    async fn transition_open(&mut self, status: impl FnOnce(TicketStatus) -> TicketStatus) -> ClientResult<DonationTicket> {
        let ticket = self.open_conversation()?.ticket();
        let (id, next) = (ticket.id, status(ticket.status));
        self.set_status(id, next).await
    }

    /// Close the open ticket
    pub async fn close(&mut self) -> ClientResult<DonationTicket> {
        self.transition_open(|_| TicketStatus::Closed).await
    }

    /// Archive the open ticket
    pub async fn archive(&mut self) -> ClientResult<DonationTicket> {
        self.transition_open(|_| TicketStatus::Archived).await
    }

    /// Step the open ticket back: archived to closed, closed to open
    pub async fn reopen(&mut self) -> ClientResult<DonationTicket> {
        self.transition_open(|current| match current {
            TicketStatus::Archived => TicketStatus::Closed,
            _ => TicketStatus::Open,
        })
        .await
    }

    /// Replace the local copy of `ticket` everywhere it appears
    fn patch(&mut self, ticket: DonationTicket) {
        match self.tickets.iter_mut().find(|t| t.id == ticket.id) {
            Some(existing) => *existing = ticket.clone(),
            None => self.tickets.push(ticket.clone()),
        }
        if let Some(conv) = self.open.as_mut() {
            conv.patch_ticket(ticket);
        }
    }

    /// The list as the filter shows it
    pub fn visible(&self) -> Vec<DonationTicket> {
        self.filter.apply(&self.tickets)
    }

    /// One page of the visible list
    pub fn page(&self, page: usize, per_page: usize) -> Page<DonationTicket> {
        Page::from_items(self.visible(), page, per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dto::CreateTicketRequest;
    use crate::api::testing::spawn_server;

    fn contact(subject: &str) -> CreateTicketRequest {
        CreateTicketRequest {
            subject: subject.to_string(),
            donor_name: Some("Pablo".to_string()),
            donor_email: Some("pablo@example.org".to_string()),
            donor_phone: None,
            message: "Hello".to_string(),
        }
    }

    #[tokio::test]
    async fn test_board_flow() {
        let server = spawn_server().await;
        let visitor = server.client();
        for subject in ["Books", "Clothes", "Toys"] {
            visitor.create_ticket(&contact(subject)).await.unwrap();
        }

        let mut board = TicketBoard::new(server.admin_client().await);
        board.refresh().await.unwrap();
        assert_eq!(board.visible().len(), 3);

        let first = board.visible()[0].id;
        board.open(first).await.unwrap();
        assert_eq!(board.conversation().unwrap().messages().len(), 1);

        board.reply("We will pick it up on Monday").await.unwrap();
        assert_eq!(board.conversation().unwrap().messages().len(), 2);

        assert_eq!(board.close().await.unwrap().status, TicketStatus::Closed);
        assert_eq!(board.archive().await.unwrap().status, TicketStatus::Archived);

        // archived: hidden by default, replies refused locally
        assert_eq!(board.visible().len(), 2);
        assert!(matches!(
            board.reply("late").await.unwrap_err(),
            ClientError::Conflict(_)
        ));

        let mut filter = board.filter().clone();
        filter.toggle_archived();
        board.set_filter(filter);
        assert_eq!(board.visible().len(), 3);

        assert_eq!(board.reopen().await.unwrap().status, TicketStatus::Closed);
        assert_eq!(board.reopen().await.unwrap().status, TicketStatus::Open);
        assert!(board.conversation().unwrap().is_writable());

        let page = board.page(2, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_fetches_archived_only_when_needed() {
        let server = spawn_server().await;
        let admin = server.admin_client().await;
        let detail = server.client().create_ticket(&contact("Old")).await.unwrap();
        admin.set_ticket_status(detail.ticket.id, TicketStatus::Closed).await.unwrap();
        admin.set_ticket_status(detail.ticket.id, TicketStatus::Archived).await.unwrap();

        let mut board = TicketBoard::new(admin.clone());
        board.refresh().await.unwrap();
        assert!(board.tickets().is_empty());

        board.set_filter(TicketFilter::with_status(TicketStatus::Archived));
        board.refresh().await.unwrap();
        assert_eq!(board.visible().len(), 1);
    }

    #[tokio::test]
    async fn test_reply_without_open_ticket() {
        let server = spawn_server().await;
        let mut board = TicketBoard::new(server.admin_client().await);
        assert!(matches!(
            board.reply("hi").await.unwrap_err(),
            ClientError::Validation(_)
        ));
    }
}
