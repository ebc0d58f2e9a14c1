//! Workshops and registrations

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::types::from_millis;
use super::{
    is_constraint_violation, now_millis, Id, Store, StoreError, StoreResult, Workshop,
    WorkshopDetails, WorkshopRegistration,
};

const WORKSHOP_SELECT: &str = "SELECT w.id, w.title, w.description, w.date, w.location, \
    w.capacity, w.created_at, \
    (SELECT COUNT(*) FROM workshop_registrations r WHERE r.workshop_id = w.id) \
    FROM workshops w";

fn row_to_workshop(row: &Row<'_>) -> rusqlite::Result<Workshop> {
    Ok(Workshop {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        date: from_millis(row.get(3)?),
        location: row.get(4)?,
        capacity: row.get(5)?,
        created_at: from_millis(row.get(6)?),
        registered: row.get(7)?,
    })
}

fn row_to_registration(row: &Row<'_>) -> rusqlite::Result<WorkshopRegistration> {
    Ok(WorkshopRegistration {
        id: row.get(0)?,
        workshop_id: row.get(1)?,
        user_id: row.get(2)?,
        created_at: from_millis(row.get(3)?),
    })
}

fn select_workshop(conn: &Connection, id: Id) -> StoreResult<Workshop> {
    conn.query_row(
        &format!("{} WHERE w.id = ?", WORKSHOP_SELECT),
        params![id],
        row_to_workshop,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("Workshop", id))
}

impl Store {
    pub async fn create_workshop(&self, details: WorkshopDetails) -> StoreResult<Workshop> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO workshops (title, description, date, location, capacity, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                details.title.trim(),
                details.description.trim(),
                details.date.timestamp_millis(),
                details.location.trim(),
                details.capacity,
                now_millis()
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(workshop_id = id, title = %details.title, "Workshop created");
        select_workshop(&conn, id)
    }

    pub async fn get_workshop(&self, id: Id) -> StoreResult<Workshop> {
        let conn = self.conn.lock().await;
        select_workshop(&conn, id)
    }

    /// Workshops in date order
    pub async fn list_workshops(&self) -> StoreResult<Vec<Workshop>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(&format!("{} ORDER BY w.date, w.id", WORKSHOP_SELECT))?;
        let rows = stmt.query_map([], row_to_workshop)?;
        let workshops = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(workshops)
    }

    pub async fn update_workshop(&self, id: Id, details: WorkshopDetails) -> StoreResult<Workshop> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE workshops SET title = ?, description = ?, date = ?, location = ?, capacity = ?
             WHERE id = ?",
            params![
                details.title.trim(),
                details.description.trim(),
                details.date.timestamp_millis(),
                details.location.trim(),
                details.capacity,
                id
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("Workshop", id));
        }
        select_workshop(&conn, id)
    }

    pub async fn delete_workshop(&self, id: Id) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        let changed = conn.execute("DELETE FROM workshops WHERE id = ?", params![id])?;
        if changed == 0 {
            return Err(StoreError::not_found("Workshop", id));
        }
        tracing::info!(workshop_id = id, "Workshop deleted");
        Ok(())
    }

    /// Take a seat in a workshop; one seat per user, capacity respected
    pub async fn register_workshop(&self, workshop_id: Id, user_id: Id) -> StoreResult<WorkshopRegistration> {
        let conn = self.conn.lock().await;
        let workshop = select_workshop(&conn, workshop_id)?;

        if workshop.seats_left() == 0 {
            return Err(StoreError::Full(format!("Workshop '{}'", workshop.title)));
        }

        let now = now_millis();
        conn.execute(
            "INSERT INTO workshop_registrations (workshop_id, user_id, created_at) VALUES (?, ?, ?)",
            params![workshop_id, user_id, now],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                StoreError::Conflict(format!("Already registered for workshop {}", workshop_id))
            } else {
                StoreError::Database(e)
            }
        })?;

        let id = conn.last_insert_rowid();
        tracing::info!(workshop_id, user_id, "Workshop registration");

        Ok(WorkshopRegistration {
            id,
            workshop_id,
            user_id,
            created_at: from_millis(now),
        })
    }

    /// Give a seat back
    pub async fn unregister_workshop(&self, workshop_id: Id, user_id: Id) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "DELETE FROM workshop_registrations WHERE workshop_id = ? AND user_id = ?",
            params![workshop_id, user_id],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("Workshop registration", workshop_id));
        }
        Ok(())
    }

    pub async fn workshop_registrations(&self, workshop_id: Id) -> StoreResult<Vec<WorkshopRegistration>> {
        let conn = self.conn.lock().await;
        select_workshop(&conn, workshop_id)?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, workshop_id, user_id, created_at FROM workshop_registrations
             WHERE workshop_id = ? ORDER BY id",
        )?;
        let rows = stmt.query_map(params![workshop_id], row_to_registration)?;
        let registrations = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(registrations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{NewUser, Role};
    use chrono::{Duration, Utc};

    fn workshop(title: &str, capacity: i64, days: i64) -> WorkshopDetails {
        WorkshopDetails {
            title: title.to_string(),
            description: "Hands-on session".to_string(),
            date: Utc::now() + Duration::days(days),
            location: "Community hall".to_string(),
            capacity,
        }
    }

    async fn user(store: &Store, email: &str) -> Id {
        store
            .create_user(NewUser {
                name: "W".to_string(),
                email: email.to_string(),
                password: "password1".to_string(),
                role: Role::User,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_full_workshop_rejects_registration() {
        let store = Store::open_in_memory().unwrap();
        let w = store.create_workshop(workshop("Sewing", 1, 3)).await.unwrap();
        let a = user(&store, "a@example.org").await;
        let b = user(&store, "b@example.org").await;

        store.register_workshop(w.id, a).await.unwrap();
        let err = store.register_workshop(w.id, b).await.unwrap_err();
        assert!(matches!(err, StoreError::Full(_)));

        let w = store.get_workshop(w.id).await.unwrap();
        assert_eq!(w.registered, 1);
        assert_eq!(w.seats_left(), 0);
    }

    #[tokio::test]
    async fn test_double_registration_conflicts() {
        let store = Store::open_in_memory().unwrap();
        let w = store.create_workshop(workshop("Cooking", 10, 1)).await.unwrap();
        let a = user(&store, "a@example.org").await;

        store.register_workshop(w.id, a).await.unwrap();
        let err = store.register_workshop(w.id, a).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        store.unregister_workshop(w.id, a).await.unwrap();
        assert!(store.workshop_registrations(w.id).await.unwrap().is_empty());
        assert!(store.unregister_workshop(w.id, a).await.is_err());
    }

    #[tokio::test]
    async fn test_list_in_date_order() {
        let store = Store::open_in_memory().unwrap();
        store.create_workshop(workshop("Later", 5, 10)).await.unwrap();
        store.create_workshop(workshop("Sooner", 5, 2)).await.unwrap();

        let titles: Vec<_> = store
            .list_workshops()
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.title)
            .collect();
        assert_eq!(titles, vec!["Sooner", "Later"]);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = Store::open_in_memory().unwrap();
        let w = store.create_workshop(workshop("Draft", 5, 1)).await.unwrap();
        let updated = store.update_workshop(w.id, workshop("Final", 8, 1)).await.unwrap();
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.capacity, 8);

        store.delete_workshop(w.id).await.unwrap();
        assert!(store.get_workshop(w.id).await.is_err());
    }
}
