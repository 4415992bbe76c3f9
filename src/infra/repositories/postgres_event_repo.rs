use crate::domain::{
    models::event::{Event, EventDetails, EventFilter, Visibility},
    ports::EventRepository,
};
use crate::error::AppError;
use super::contains_pattern;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

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

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_details(&self, id: &str) -> Result<EventDetails, AppError> {
        self.find_by_id(id).await?
            .ok_or(AppError::NotFound("Event not found".into()))
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepo {
    async fn create(&self, event: &Event) -> Result<EventDetails, AppError> {
        sqlx::query(
            r#"INSERT INTO events (
                id, organizer_id, title, description, category_id, location,
                start_time, end_time, capacity, is_public, cover_url, metadata,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"#
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
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        self.fetch_details(&event.id).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<EventDetails>, AppError> {
        sqlx::query_as::<_, EventDetails>(&format!("{} WHERE e.id = $1", EVENT_DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, filter: &EventFilter) -> Result<Vec<EventDetails>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(EVENT_DETAILS_SELECT);
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
            let pattern = contains_pattern(search);
            qb.push(" AND (e.title ILIKE ").push_bind(pattern.clone()).push(r" ESCAPE '\'")
                .push(" OR COALESCE(e.description, '') ILIKE ").push_bind(pattern.clone()).push(r" ESCAPE '\'")
                .push(" OR COALESCE(e.location, '') ILIKE ").push_bind(pattern).push(r" ESCAPE '\'")
                .push(")");
        }
        if let Some(category) = &filter.category {
            qb.push(" AND LOWER(c.name) = LOWER(").push_bind(category.clone()).push(")");
        }
        if let Some(location) = &filter.location {
            qb.push(" AND COALESCE(e.location, '') ILIKE ")
                .push_bind(contains_pattern(location))
                .push(r" ESCAPE '\'");
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
        let result = sqlx::query(
            r#"UPDATE events SET
                title=$1, description=$2, category_id=$3, location=$4,
                start_time=$5, end_time=$6, capacity=$7, is_public=$8,
                cover_url=$9, metadata=$10, updated_at=$11
               WHERE id=$12"#
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

        sqlx::query("DELETE FROM registrations WHERE event_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let result = sqlx::query("DELETE FROM events WHERE id = $1")
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
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events WHERE organizer_id = $1")
            .bind(organizer_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
