//! Volunteering: options, enrollments and proposals
//!
//! Options are created by admins (approved right away) or published from an
//! approved user proposal. Enrollment counts ignore rejected forms.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::types::from_millis;
use super::{
    now_millis, parse_column, Id, ReviewStatus, Store, StoreError, StoreResult, VolunteerDetails,
    VolunteerForm, VolunteerOption, VolunteerProposal,
};

const OPTION_SELECT: &str = "SELECT o.id, o.title, o.description, o.schedule, o.location, \
    o.capacity, o.status, o.created_at, \
    (SELECT COUNT(*) FROM volunteer_forms f WHERE f.option_id = o.id AND f.status != 'rejected') \
    FROM volunteer_options o";

const FORM_COLUMNS: &str = "id, option_id, user_id, note, status, created_at";

const PROPOSAL_COLUMNS: &str =
    "id, user_id, title, description, schedule, location, status, option_id, created_at";

fn row_to_option(row: &Row<'_>) -> rusqlite::Result<VolunteerOption> {
    Ok(VolunteerOption {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        schedule: row.get(3)?,
        location: row.get(4)?,
        capacity: row.get(5)?,
        status: parse_column(row, 6)?,
        created_at: from_millis(row.get(7)?),
        enrolled: row.get(8)?,
    })
}

fn row_to_form(row: &Row<'_>) -> rusqlite::Result<VolunteerForm> {
    Ok(VolunteerForm {
        id: row.get(0)?,
        option_id: row.get(1)?,
        user_id: row.get(2)?,
        note: row.get(3)?,
        status: parse_column(row, 4)?,
        created_at: from_millis(row.get(5)?),
    })
}

fn row_to_proposal(row: &Row<'_>) -> rusqlite::Result<VolunteerProposal> {
    Ok(VolunteerProposal {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        schedule: row.get(4)?,
        location: row.get(5)?,
        status: parse_column(row, 6)?,
        option_id: row.get(7)?,
        created_at: from_millis(row.get(8)?),
    })
}

fn select_option(conn: &Connection, id: Id) -> StoreResult<VolunteerOption> {
    conn.query_row(
        &format!("{} WHERE o.id = ?", OPTION_SELECT),
        params![id],
        row_to_option,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("Volunteer option", id))
}

fn select_form(conn: &Connection, id: Id) -> StoreResult<VolunteerForm> {
    conn.query_row(
        &format!("SELECT {} FROM volunteer_forms WHERE id = ?", FORM_COLUMNS),
        params![id],
        row_to_form,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("Volunteer form", id))
}

fn select_proposal(conn: &Connection, id: Id) -> StoreResult<VolunteerProposal> {
    conn.query_row(
        &format!(
            "SELECT {} FROM volunteer_proposals WHERE id = ?",
            PROPOSAL_COLUMNS
        ),
        params![id],
        row_to_proposal,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("Volunteer proposal", id))
}

fn insert_option(
    conn: &Connection,
    details: &VolunteerDetails,
    capacity: Option<i64>,
    now: i64,
) -> StoreResult<Id> {
    conn.execute(
        "INSERT INTO volunteer_options
            (title, description, schedule, location, capacity, status, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        params![
            details.title.trim(),
            details.description.trim(),
            details.schedule.trim(),
            details.location.trim(),
            capacity,
            ReviewStatus::Approved.as_str(),
            now
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

impl Store {
    // ==================== Options ====================

    /// Publish a new volunteering option
    pub async fn create_option(
        &self,
        details: VolunteerDetails,
        capacity: Option<i64>,
    ) -> StoreResult<VolunteerOption> {
        let conn = self.conn.lock().await;
        let id = insert_option(&conn, &details, capacity, now_millis())?;
        tracing::info!(option_id = id, title = %details.title, "Volunteer option created");
        select_option(&conn, id)
    }

    /// Fetch a single option with its enrollment count
    pub async fn get_option(&self, id: Id) -> StoreResult<VolunteerOption> {
        let conn = self.conn.lock().await;
        select_option(&conn, id)
    }

    /// List options; non-admin views only see approved ones
    pub async fn list_options(&self, approved_only: bool) -> StoreResult<Vec<VolunteerOption>> {
        let conn = self.conn.lock().await;
        let sql = if approved_only {
            format!("{} WHERE o.status = 'approved' ORDER BY o.id", OPTION_SELECT)
        } else {
            format!("{} ORDER BY o.id", OPTION_SELECT)
        };
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt.query_map([], row_to_option)?;
        let options = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(options)
    }

    /// Edit the descriptive fields and capacity of an option
    pub async fn update_option(
        &self,
        id: Id,
        details: VolunteerDetails,
        capacity: Option<i64>,
    ) -> StoreResult<VolunteerOption> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE volunteer_options
             SET title = ?, description = ?, schedule = ?, location = ?, capacity = ?
             WHERE id = ?",
            params![
                details.title.trim(),
                details.description.trim(),
                details.schedule.trim(),
                details.location.trim(),
                capacity,
                id
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("Volunteer option", id));
        }
        select_option(&conn, id)
    }

    /// Change the review status of an option
    pub async fn set_option_status(&self, id: Id, status: ReviewStatus) -> StoreResult<VolunteerOption> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE volunteer_options SET status = ? WHERE id = ?",
            params![status.as_str(), id],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("Volunteer option", id));
        }
        tracing::info!(option_id = id, status = %status, "Volunteer option status changed");
        select_option(&conn, id)
    }

    /// Remove an option together with its enrollments
    pub async fn delete_option(&self, id: Id) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        let changed = conn.execute("DELETE FROM volunteer_options WHERE id = ?", params![id])?;
        if changed == 0 {
            return Err(StoreError::not_found("Volunteer option", id));
        }
        tracing::info!(option_id = id, "Volunteer option deleted");
        Ok(())
    }

    // ==================== Enrollments ====================

    /// Enroll a user in an approved, non-full option
    pub async fn enroll(&self, option_id: Id, user_id: Id, note: Option<String>) -> StoreResult<VolunteerForm> {
        let conn = self.conn.lock().await;
        let option = select_option(&conn, option_id)?;

        if option.status != ReviewStatus::Approved {
            return Err(StoreError::Conflict(format!(
                "Volunteer option {} is not open for enrollment",
                option_id
            )));
        }

        let already: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM volunteer_forms
                           WHERE option_id = ? AND user_id = ? AND status != 'rejected')",
            params![option_id, user_id],
            |row| row.get(0),
        )?;
        if already {
            return Err(StoreError::Conflict(format!(
                "Already enrolled in volunteer option {}",
                option_id
            )));
        }

        if option.is_full() {
            return Err(StoreError::Full(format!("Volunteer option '{}'", option.title)));
        }

        conn.execute(
            "INSERT INTO volunteer_forms (option_id, user_id, note, status, created_at)
             VALUES (?, ?, ?, ?, ?)",
            params![option_id, user_id, note, ReviewStatus::Pending.as_str(), now_millis()],
        )?;
        let id = conn.last_insert_rowid();

        tracing::info!(form_id = id, option_id, user_id, "Volunteer enrolled");
        select_form(&conn, id)
    }

    /// Enrollments, optionally restricted to one user
    pub async fn list_enrollments(&self, user_id: Option<Id>) -> StoreResult<Vec<VolunteerForm>> {
        let conn = self.conn.lock().await;
        let forms = match user_id {
            Some(uid) => {
                let mut stmt = conn.prepare_cached(&format!(
                    "SELECT {} FROM volunteer_forms WHERE user_id = ? ORDER BY id",
                    FORM_COLUMNS
                ))?;
                let rows = stmt.query_map(params![uid], row_to_form)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare_cached(&format!(
                    "SELECT {} FROM volunteer_forms ORDER BY id",
                    FORM_COLUMNS
                ))?;
                let rows = stmt.query_map([], row_to_form)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(forms)
    }

    /// Review an enrollment
    pub async fn set_enrollment_status(&self, id: Id, status: ReviewStatus) -> StoreResult<VolunteerForm> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE volunteer_forms SET status = ? WHERE id = ?",
            params![status.as_str(), id],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("Volunteer form", id));
        }
        tracing::info!(form_id = id, status = %status, "Enrollment reviewed");
        select_form(&conn, id)
    }

    // ==================== Proposals ====================

    /// Submit a user proposal for review
    pub async fn create_proposal(&self, user_id: Id, details: VolunteerDetails) -> StoreResult<VolunteerProposal> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO volunteer_proposals
                (user_id, title, description, schedule, location, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                user_id,
                details.title.trim(),
                details.description.trim(),
                details.schedule.trim(),
                details.location.trim(),
                ReviewStatus::Pending.as_str(),
                now_millis()
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(proposal_id = id, user_id, "Volunteer proposal submitted");
        select_proposal(&conn, id)
    }

    /// Proposals, optionally restricted to one user
    pub async fn list_proposals(&self, user_id: Option<Id>) -> StoreResult<Vec<VolunteerProposal>> {
        let conn = self.conn.lock().await;
        let proposals = match user_id {
            Some(uid) => {
                let mut stmt = conn.prepare_cached(&format!(
                    "SELECT {} FROM volunteer_proposals WHERE user_id = ? ORDER BY id",
                    PROPOSAL_COLUMNS
                ))?;
                let rows = stmt.query_map(params![uid], row_to_proposal)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare_cached(&format!(
                    "SELECT {} FROM volunteer_proposals ORDER BY id",
                    PROPOSAL_COLUMNS
                ))?;
                let rows = stmt.query_map([], row_to_proposal)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(proposals)
    }

    /// Review a proposal. The first approval publishes it as an option.
    pub async fn review_proposal(&self, id: Id, status: ReviewStatus) -> StoreResult<VolunteerProposal> {
        let mut conn = self.conn.lock().await;
        let proposal = select_proposal(&conn, id)?;

        let tx = conn.transaction()?;
        let option_id = match (status, proposal.option_id) {
            (ReviewStatus::Approved, None) => {
                let details = VolunteerDetails {
                    title: proposal.title.clone(),
                    description: proposal.description.clone(),
                    schedule: proposal.schedule.clone(),
                    location: proposal.location.clone(),
                };
                let option_id = insert_option(&tx, &details, None, now_millis())?;
                tracing::info!(proposal_id = id, option_id, "Proposal published as option");
                Some(option_id)
            }
            (_, existing) => existing,
        };

        tx.execute(
            "UPDATE volunteer_proposals SET status = ?, option_id = ? WHERE id = ?",
            params![status.as_str(), option_id, id],
        )?;
        tx.commit()?;

        tracing::info!(proposal_id = id, status = %status, "Proposal reviewed");
        select_proposal(&conn, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{NewUser, Role};

    fn details(title: &str) -> VolunteerDetails {
        VolunteerDetails {
            title: title.to_string(),
            description: "Sort and pack food".to_string(),
            schedule: "Saturdays 10-14".to_string(),
            location: "Warehouse".to_string(),
        }
    }

    async fn user(store: &Store, email: &str) -> Id {
        store
            .create_user(NewUser {
                name: "Vol".to_string(),
                email: email.to_string(),
                password: "password1".to_string(),
                role: Role::User,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_enroll_counts_and_capacity() {
        let store = Store::open_in_memory().unwrap();
        let option = store.create_option(details("Food bank"), Some(1)).await.unwrap();
        assert_eq!(option.status, ReviewStatus::Approved);
        assert_eq!(option.enrolled, 0);

        let a = user(&store, "a@example.org").await;
        let b = user(&store, "b@example.org").await;

        let form = store.enroll(option.id, a, Some("Weekends".to_string())).await.unwrap();
        assert_eq!(form.status, ReviewStatus::Pending);
        assert_eq!(store.get_option(option.id).await.unwrap().enrolled, 1);

        let dup = store.enroll(option.id, a, None).await.unwrap_err();
        assert!(matches!(dup, StoreError::Conflict(_)));

        let full = store.enroll(option.id, b, None).await.unwrap_err();
        assert!(matches!(full, StoreError::Full(_)));

        // a rejected form frees the seat
        store.set_enrollment_status(form.id, ReviewStatus::Rejected).await.unwrap();
        store.enroll(option.id, b, None).await.unwrap();
        assert_eq!(store.list_enrollments(Some(b)).await.unwrap().len(), 1);
        assert_eq!(store.list_enrollments(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unapproved_option_hidden_and_closed() {
        let store = Store::open_in_memory().unwrap();
        let option = store.create_option(details("Beach cleanup"), None).await.unwrap();
        store.set_option_status(option.id, ReviewStatus::Filed).await.unwrap();

        assert!(store.list_options(true).await.unwrap().is_empty());
        assert_eq!(store.list_options(false).await.unwrap().len(), 1);

        let uid = user(&store, "c@example.org").await;
        let err = store.enroll(option.id, uid, None).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_approving_proposal_publishes_option_once() {
        let store = Store::open_in_memory().unwrap();
        let uid = user(&store, "p@example.org").await;

        let proposal = store.create_proposal(uid, details("Reading club")).await.unwrap();
        assert_eq!(proposal.status, ReviewStatus::Pending);
        assert!(store.list_options(true).await.unwrap().is_empty());

        let approved = store.review_proposal(proposal.id, ReviewStatus::Approved).await.unwrap();
        let option_id = approved.option_id.expect("option published");
        assert_eq!(store.get_option(option_id).await.unwrap().title, "Reading club");

        let again = store.review_proposal(proposal.id, ReviewStatus::Approved).await.unwrap();
        assert_eq!(again.option_id, Some(option_id));
        assert_eq!(store.list_options(false).await.unwrap().len(), 1);
        assert_eq!(store.list_proposals(Some(uid)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_option() {
        let store = Store::open_in_memory().unwrap();
        let option = store.create_option(details("Old"), None).await.unwrap();

        let updated = store.update_option(option.id, details("New"), Some(5)).await.unwrap();
        assert_eq!(updated.title, "New");
        assert_eq!(updated.capacity, Some(5));

        store.delete_option(option.id).await.unwrap();
        assert!(matches!(
            store.delete_option(option.id).await.unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }
}
