use crate::domain::{
    models::event::{Event, EventDetails, EventFilter, Visibility},
    ports::EventRepository,
};
use crate::error::AppError;
use super::contains_pattern;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const EVENT_DETAILS_SELECT: &str = r#"
    SELECT e.*,
           u.username AS organizer_username,
           c.name AS category_name,
           (SELECT COUNT(*) FROM registrations r
             WHERE r.event_id = e.id AND r.status NOT IN ('cancelled', 'waitlisted')) AS registered_count
    FROM events e
    JOIN users u ON u.id = e.organizer_id
    LEFT JOIN categories c ON c.id = e.category_id
"#;

pub struct SqliteEventRepo {
    pool: SqlitePool,
}

/// SQLite's `LOWER()` only folds ASCII, so the searchable text is folded
/// here and stored alongside the row.
fn search_keys(event: &Event) -> (String, String) {
    let location = event.location.as_deref().unwrap_or("").to_lowercase();
    let search = format!(
        "{}\u{1f}{}\u{1f}{}",
        event.title.to_lowercase(),
        event.description.as_deref().unwrap_or("").to_lowercase(),
        location,
    );
    (search, location)
}

impl SqliteEventRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Ids of the categories whose name matches `name` ignoring case.
    async fn category_ids_named(&self, name: &str) -> Result<Vec<i64>, AppError> {
        let wanted = name.to_lowercase();
        let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM categories")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(rows.into_iter()
            .filter(|(_, n)| n.to_lowercase() == wanted)
            .map(|(id, _)| id)
            .collect())
    }

    async fn fetch_details(&self, id: &str) -> Result<EventDetails, AppError> {
        self.find_by_id(id).await?
            .ok_or(AppError::NotFound("Event not found".into()))
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepo {
    async fn create(&self, event: &Event) -> Result<EventDetails, AppError> {
        let (search_key, location_key) = search_keys(event);
        sqlx::query(
            r#"INSERT INTO events (
                id, organizer_id, title, description, category_id, location,
                start_time, end_time, capacity, is_public, cover_url, metadata,
                created_at, updated_at, search_key, location_key
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#
        )
            .bind(&event.id)
            .bind(&event.organizer_id)
            .bind(&event.title)
            .bind(&event.description)
            .bind(event.category_id)
            .bind(&event.location)
            .bind(event.start_time)
            .bind(event.end_time)
            .bind(event.capacity)
            .bind(event.is_public)
            .bind(&event.cover_url)
            .bind(&event.metadata)
            .bind(event.created_at)
            .bind(event.updated_at)
            .bind(search_key)
            .bind(location_key)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        self.fetch_details(&event.id).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<EventDetails>, AppError> {
        sqlx::query_as::<_, EventDetails>(&format!("{} WHERE e.id = ?", EVENT_DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, filter: &EventFilter) -> Result<Vec<EventDetails>, AppError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(EVENT_DETAILS_SELECT);
        qb.push(" WHERE 1 = 1");

        match &filter.visibility {
            Visibility::PublicOnly => {
                qb.push(" AND e.is_public = ").push_bind(true);
            }
            Visibility::PublicOrOwnedBy(user_id) => {
                qb.push(" AND (e.is_public = ").push_bind(true)
                    .push(" OR e.organizer_id = ").push_bind(user_id.clone())
                    .push(")");
            }
            Visibility::All => {}
        }

        if let Some(organizer_id) = &filter.organizer_id {
            qb.push(" AND e.organizer_id = ").push_bind(organizer_id.clone());
        }
        if let Some(search) = &filter.search {
            qb.push(" AND e.search_key LIKE ").push_bind(contains_pattern(search)).push(" ESCAPE '\\'");
        }
        if let Some(category) = &filter.category {
            let ids = self.category_ids_named(category).await?;
            if ids.is_empty() {
                qb.push(" AND 1 = 0");
            } else {
                qb.push(" AND e.category_id IN (");
                let mut separated = qb.separated(", ");
                for id in ids {
                    separated.push_bind(id);
                }
                separated.push_unseparated(")");
            }
        }
        if let Some(location) = &filter.location {
            qb.push(" AND e.location_key LIKE ").push_bind(contains_pattern(location)).push(" ESCAPE '\\'");
        }
        if let Some(from) = filter.starts_from {
            qb.push(" AND e.start_time >= ").push_bind(from);
        }
        if let Some(before) = filter.starts_before {
            qb.push(" AND e.start_time < ").push_bind(before);
        }

        qb.push(" ORDER BY e.start_time DESC");

        qb.build_query_as::<EventDetails>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, event: &Event) -> Result<EventDetails, AppError> {
        let (search_key, location_key) = search_keys(event);
        let result = sqlx::query(
            r#"UPDATE events SET
                title=?, description=?, category_id=?, location=?,
                start_time=?, end_time=?, capacity=?, is_public=?,
                cover_url=?, metadata=?, updated_at=?, search_key=?, location_key=?
               WHERE id=?"#
        )
            .bind(&event.title)
            .bind(&event.description)
            .bind(event.category_id)
            .bind(&event.location)
            .bind(event.start_time)
            .bind(event.end_time)
            .bind(event.capacity)
            .bind(event.is_public)
            .bind(&event.cover_url)
            .bind(&event.metadata)
            .bind(event.updated_at)
            .bind(search_key)
            .bind(location_key)
            .bind(&event.id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".into()));
        }
        self.fetch_details(&event.id).await
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("DELETE FROM registrations WHERE event_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".into()));
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn count_by_organizer(&self, organizer_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events WHERE organizer_id = ?")
            .bind(organizer_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
