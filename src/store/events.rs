//! Published events and news

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::types::from_millis;
use super::{
    now_millis, parse_column, EventNewsDetails, EventNewsItem, EventNewsKind, Id, Store,
    StoreError, StoreResult,
};

const ITEM_COLUMNS: &str = "id, title, description, date, image_url, kind, created_at, updated_at";

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<EventNewsItem> {
    Ok(EventNewsItem {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        date: from_millis(row.get(3)?),
        image_url: row.get(4)?,
        kind: parse_column(row, 5)?,
        created_at: from_millis(row.get(6)?),
        updated_at: from_millis(row.get(7)?),
    })
}

fn select_item(conn: &Connection, id: Id) -> StoreResult<EventNewsItem> {
    conn.query_row(
        &format!("SELECT {} FROM events_news WHERE id = ?", ITEM_COLUMNS),
        params![id],
        row_to_item,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("Event/news item", id))
}

impl Store {
    pub async fn create_item(&self, details: EventNewsDetails) -> StoreResult<EventNewsItem> {
        let now = now_millis();
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO events_news (title, description, date, image_url, kind, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                details.title.trim(),
                details.description.trim(),
                details.date.timestamp_millis(),
                details.image_url,
                details.kind.as_str(),
                now,
                now
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(item_id = id, kind = %details.kind, "Event/news item published");
        select_item(&conn, id)
    }

    pub async fn get_item(&self, id: Id) -> StoreResult<EventNewsItem> {
        let conn = self.conn.lock().await;
        select_item(&conn, id)
    }

    /// Items newest date first, optionally of one kind
    pub async fn list_items(&self, kind: Option<EventNewsKind>) -> StoreResult<Vec<EventNewsItem>> {
        let conn = self.conn.lock().await;
        let items = match kind {
            Some(kind) => {
                let mut stmt = conn.prepare_cached(&format!(
                    "SELECT {} FROM events_news WHERE kind = ? ORDER BY date DESC, id DESC",
                    ITEM_COLUMNS
                ))?;
                let rows = stmt.query_map(params![kind.as_str()], row_to_item)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare_cached(&format!(
                    "SELECT {} FROM events_news ORDER BY date DESC, id DESC",
                    ITEM_COLUMNS
                ))?;
                let rows = stmt.query_map([], row_to_item)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(items)
    }

    pub async fn update_item(&self, id: Id, details: EventNewsDetails) -> StoreResult<EventNewsItem> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE events_news
             SET title = ?, description = ?, date = ?, image_url = ?, kind = ?, updated_at = ?
             WHERE id = ?",
            params![
                details.title.trim(),
                details.description.trim(),
                details.date.timestamp_millis(),
                details.image_url,
                details.kind.as_str(),
                now_millis(),
                id
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("Event/news item", id));
        }
        select_item(&conn, id)
    }

    pub async fn delete_item(&self, id: Id) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        let changed = conn.execute("DELETE FROM events_news WHERE id = ?", params![id])?;
        if changed == 0 {
            return Err(StoreError::not_found("Event/news item", id));
        }
        tracing::info!(item_id = id, "Event/news item deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn item(title: &str, kind: EventNewsKind, days_ago: i64) -> EventNewsDetails {
        EventNewsDetails {
            title: title.to_string(),
            description: "Details".to_string(),
            date: Utc::now() - Duration::days(days_ago),
            image_url: None,
            kind,
        }
    }

    #[tokio::test]
    async fn test_list_by_kind_newest_first() {
        let store = Store::open_in_memory().unwrap();
        store.create_item(item("Old news", EventNewsKind::News, 5)).await.unwrap();
        store.create_item(item("Fresh news", EventNewsKind::News, 1)).await.unwrap();
        store.create_item(item("Gala", EventNewsKind::Event, 0)).await.unwrap();

        let news = store.list_items(Some(EventNewsKind::News)).await.unwrap();
        let titles: Vec<_> = news.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Fresh news", "Old news"]);

        assert_eq!(store.list_items(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = Store::open_in_memory().unwrap();
        let created = store.create_item(item("Draft", EventNewsKind::Event, 0)).await.unwrap();

        let mut changes = item("Charity run", EventNewsKind::Event, 0);
        changes.image_url = Some("https://example.org/run.jpg".to_string());
        let updated = store.update_item(created.id, changes).await.unwrap();
        assert_eq!(updated.title, "Charity run");
        assert!(updated.image_url.is_some());

        store.delete_item(created.id).await.unwrap();
        assert!(matches!(
            store.get_item(created.id).await.unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }
}
