//! Donation tickets and their conversations
//!
//! A ticket is created together with its first message. Messages are
//! append-only and ordered by creation time; appending one bumps the
//! ticket's `updated_at` so busy tickets float to the top of listings.

use rusqlite::{params, OptionalExtension, Row, ToSql};

use super::types::from_millis;
use super::{
    now_millis, parse_column, DonationTicket, Id, NewTicket, Store, StoreError, StoreResult,
    TicketMessage, TicketQuery, TicketStatus,
};

const TICKET_COLUMNS: &str = "id, subject, donor_name, donor_email, donor_phone, status, \
                              assigned_admin, user_id, created_at, updated_at";

fn row_to_ticket(row: &Row<'_>) -> rusqlite::Result<DonationTicket> {
    Ok(DonationTicket {
        id: row.get(0)?,
        subject: row.get(1)?,
        donor_name: row.get(2)?,
        donor_email: row.get(3)?,
        donor_phone: row.get(4)?,
        status: parse_column(row, 5)?,
        assigned_admin: row.get(6)?,
        user_id: row.get(7)?,
        created_at: from_millis(row.get(8)?),
        updated_at: from_millis(row.get(9)?),
    })
}

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<TicketMessage> {
    Ok(TicketMessage {
        id: row.get(0)?,
        module_id: row.get(1)?,
        sender_id: row.get(2)?,
        body: row.get(3)?,
        created_at: from_millis(row.get(4)?),
    })
}

fn select_ticket(conn: &rusqlite::Connection, id: Id) -> StoreResult<DonationTicket> {
    conn.query_row(
        &format!("SELECT {} FROM donation_tickets WHERE id = ?", TICKET_COLUMNS),
        params![id],
        row_to_ticket,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("Ticket", id))
}

/// Insert a ticket plus its opening message inside an open transaction
pub(crate) fn insert_ticket(
    tx: &rusqlite::Transaction<'_>,
    new: &NewTicket,
    now: i64,
) -> StoreResult<(DonationTicket, TicketMessage)> {
    tx.execute(
        "INSERT INTO donation_tickets
            (subject, donor_name, donor_email, donor_phone, status, user_id, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            new.subject.trim(),
            new.donor_name,
            new.donor_email,
            new.donor_phone,
            TicketStatus::Open.as_str(),
            new.user_id,
            now,
            now
        ],
    )?;
    let ticket_id = tx.last_insert_rowid();

    tx.execute(
        "INSERT INTO ticket_messages (module_id, sender_id, body, created_at) VALUES (?, ?, ?, ?)",
        params![ticket_id, new.user_id, new.message, now],
    )?;
    let message_id = tx.last_insert_rowid();

    let ticket = DonationTicket {
        id: ticket_id,
        subject: new.subject.trim().to_string(),
        donor_name: new.donor_name.clone(),
        donor_email: new.donor_email.clone(),
        donor_phone: new.donor_phone.clone(),
        status: TicketStatus::Open,
        assigned_admin: None,
        user_id: new.user_id,
        created_at: from_millis(now),
        updated_at: from_millis(now),
    };

    let message = TicketMessage {
        id: message_id,
        module_id: ticket_id,
        sender_id: new.user_id,
        body: new.message.clone(),
        created_at: from_millis(now),
    };

    Ok((ticket, message))
}

impl Store {
    /// Open a ticket with its first message
    pub async fn create_ticket(&self, new: NewTicket) -> StoreResult<(DonationTicket, TicketMessage)> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let created = insert_ticket(&tx, &new, now_millis())?;
        tx.commit()?;

        tracing::info!(
            ticket_id = created.0.id,
            anonymous = created.0.is_anonymous(),
            "Ticket opened"
        );
        Ok(created)
    }

    /// Fetch a single ticket
    pub async fn get_ticket(&self, id: Id) -> StoreResult<DonationTicket> {
        let conn = self.conn.lock().await;
        select_ticket(&conn, id)
    }

    /// List tickets, most recently active first
    pub async fn list_tickets(&self, query: &TicketQuery) -> StoreResult<Vec<DonationTicket>> {
        let mut clauses = Vec::new();
        let mut args: Vec<Box<dyn ToSql + Send>> = Vec::new();

        match query.status {
            Some(status) => {
                clauses.push("status = ?");
                args.push(Box::new(status.as_str()));
            }
            None if !query.include_archived => {
                clauses.push("status != ?");
                args.push(Box::new(TicketStatus::Archived.as_str()));
            }
            None => {}
        }

        if let Some(owner) = query.owner {
            clauses.push("user_id = ?");
            args.push(Box::new(owner));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM donation_tickets {} ORDER BY updated_at DESC, id DESC",
            TICKET_COLUMNS, where_sql
        ))?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(args.iter().map(|a| a.as_ref() as &dyn ToSql)),
            row_to_ticket,
        )?;
        let tickets = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(tickets)
    }

    /// Move a ticket to `next`. Closing an open ticket or archiving a closed
    /// one assigns `admin_id` when nobody owns the ticket yet.
    pub async fn set_ticket_status(
        &self,
        id: Id,
        next: TicketStatus,
        admin_id: Id,
    ) -> StoreResult<DonationTicket> {
        let conn = self.conn.lock().await;
        let current = select_ticket(&conn, id)?;

        if !current.status.can_transition_to(next) {
            return Err(StoreError::InvalidTransition {
                from: current.status.to_string(),
                to: next.to_string(),
            });
        }

        let assignee = matches!(
            (current.status, next),
            (TicketStatus::Open, TicketStatus::Closed) | (TicketStatus::Closed, TicketStatus::Archived)
        )
        .then_some(admin_id);
        conn.execute(
            "UPDATE donation_tickets
             SET status = ?, assigned_admin = COALESCE(assigned_admin, ?), updated_at = ?
             WHERE id = ?",
            params![next.as_str(), assignee, now_millis(), id],
        )?;

        tracing::info!(
            ticket_id = id,
            from = %current.status,
            to = %next,
            admin_id,
            "Ticket status changed"
        );
        select_ticket(&conn, id)
    }

    /// Append a message to a ticket. Archived tickets are read-only.
    pub async fn add_message(
        &self,
        ticket_id: Id,
        sender_id: Option<Id>,
        body: &str,
    ) -> StoreResult<TicketMessage> {
        let mut conn = self.conn.lock().await;
        let ticket = select_ticket(&conn, ticket_id)?;

        if !ticket.status.accepts_replies() {
            return Err(StoreError::Conflict(format!(
                "Ticket {} is archived",
                ticket_id
            )));
        }

        let now = now_millis();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO ticket_messages (module_id, sender_id, body, created_at) VALUES (?, ?, ?, ?)",
            params![ticket_id, sender_id, body, now],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "UPDATE donation_tickets SET updated_at = ? WHERE id = ?",
            params![now, ticket_id],
        )?;
        tx.commit()?;

        tracing::debug!(ticket_id, message_id = id, "Message appended");

        Ok(TicketMessage {
            id,
            module_id: ticket_id,
            sender_id,
            body: body.to_string(),
            created_at: from_millis(now),
        })
    }

    /// Messages of a ticket in conversation order
    pub async fn list_messages(&self, ticket_id: Id) -> StoreResult<Vec<TicketMessage>> {
        let conn = self.conn.lock().await;
        select_ticket(&conn, ticket_id)?;

        let mut stmt = conn.prepare_cached(
            "SELECT id, module_id, sender_id, body, created_at FROM ticket_messages
             WHERE module_id = ?
             ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map(params![ticket_id], row_to_message)?;
        let messages = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(messages)
    }
}
