//! Donations
//!
//! A donation carrying a message also opens a donation ticket so the team
//! can follow up; both rows are written in one transaction.

use rusqlite::{params, Row};

use super::tickets::insert_ticket;
use super::types::from_millis;
use super::{
    now_millis, parse_column, Donation, Id, NewDonation, NewTicket, Store, StoreResult,
};

const DONATION_COLUMNS: &str = "id, donor_name, donor_email, amount_cents, currency, kind, \
                                message, user_id, ticket_id, created_at";

fn row_to_donation(row: &Row<'_>) -> rusqlite::Result<Donation> {
    Ok(Donation {
        id: row.get(0)?,
        donor_name: row.get(1)?,
        donor_email: row.get(2)?,
        amount_cents: row.get(3)?,
        currency: row.get(4)?,
        kind: parse_column(row, 5)?,
        message: row.get(6)?,
        user_id: row.get(7)?,
        ticket_id: row.get(8)?,
        created_at: from_millis(row.get(9)?),
    })
}

impl Store {
    /// Record a donation, opening a ticket when a message is attached
    pub async fn create_donation(&self, new: NewDonation) -> StoreResult<Donation> {
        let now = now_millis();
        let message = new
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);

        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let ticket_id = match &message {
            Some(body) => {
                let (ticket, _) = insert_ticket(
                    &tx,
                    &NewTicket {
                        subject: format!("Donation from {}", new.donor_name.trim()),
                        donor_name: Some(new.donor_name.trim().to_string()),
                        donor_email: Some(new.donor_email.trim().to_string()),
                        donor_phone: None,
                        user_id: new.user_id,
                        message: body.clone(),
                    },
                    now,
                )?;
                Some(ticket.id)
            }
            None => None,
        };

        tx.execute(
            "INSERT INTO donations
                (donor_name, donor_email, amount_cents, currency, kind, message, user_id, ticket_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                new.donor_name.trim(),
                new.donor_email.trim(),
                new.amount_cents,
                new.currency,
                new.kind.as_str(),
                message,
                new.user_id,
                ticket_id,
                now
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::info!(
            donation_id = id,
            kind = %new.kind,
            amount_cents = new.amount_cents,
            ticket_id = ?ticket_id,
            "Donation recorded"
        );

        Ok(Donation {
            id,
            donor_name: new.donor_name.trim().to_string(),
            donor_email: new.donor_email.trim().to_string(),
            amount_cents: new.amount_cents,
            currency: new.currency,
            kind: new.kind,
            message,
            user_id: new.user_id,
            ticket_id,
            created_at: from_millis(now),
        })
    }

    /// All donations, newest first
    pub async fn list_donations(&self) -> StoreResult<Vec<Donation>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM donations ORDER BY created_at DESC, id DESC",
            DONATION_COLUMNS
        ))?;
        let rows = stmt.query_map([], row_to_donation)?;
        let donations = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(donations)
    }

    /// Donations made while logged in as `user_id`
    pub async fn donations_for_user(&self, user_id: Id) -> StoreResult<Vec<Donation>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM donations WHERE user_id = ? ORDER BY created_at DESC, id DESC",
            DONATION_COLUMNS
        ))?;
        let rows = stmt.query_map(params![user_id], row_to_donation)?;
        let donations = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(donations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DonationKind, TicketQuery};

    fn donation(message: Option<&str>) -> NewDonation {
        NewDonation {
            donor_name: "Carmen".to_string(),
            donor_email: "carmen@example.org".to_string(),
            amount_cents: 2550,
            currency: "EUR".to_string(),
            kind: DonationKind::Money,
            message: message.map(str::to_string),
            user_id: None,
        }
    }

    #[tokio::test]
    async fn test_donation_without_message() {
        let store = Store::open_in_memory().unwrap();
        let d = store.create_donation(donation(None)).await.unwrap();
        assert_eq!(d.ticket_id, None);
        assert!(store.list_tickets(&TicketQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_donation_message_opens_ticket() {
        let store = Store::open_in_memory().unwrap();
        let d = store
            .create_donation(donation(Some("  For the school kits ")))
            .await
            .unwrap();

        let ticket_id = d.ticket_id.expect("ticket opened");
        let ticket = store.get_ticket(ticket_id).await.unwrap();
        assert_eq!(ticket.subject, "Donation from Carmen");
        assert_eq!(ticket.donor_email.as_deref(), Some("carmen@example.org"));

        let messages = store.list_messages(ticket_id).await.unwrap();
        assert_eq!(messages[0].body, "For the school kits");
    }

    #[tokio::test]
    async fn test_blank_message_is_ignored() {
        let store = Store::open_in_memory().unwrap();
        let d = store.create_donation(donation(Some("   "))).await.unwrap();
        assert_eq!(d.message, None);
        assert_eq!(d.ticket_id, None);
    }

    #[tokio::test]
    async fn test_list_donations() {
        let store = Store::open_in_memory().unwrap();
        store.create_donation(donation(None)).await.unwrap();
        store.create_donation(donation(None)).await.unwrap();

        let all = store.list_donations().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].id > all[1].id);
        assert!(store.donations_for_user(7).await.unwrap().is_empty());
    }
}
