use crate::domain::{
    models::registration::{Attendee, RegisteredEvent, Registration, ALREADY_REGISTERED},
    ports::RegistrationRepository,
};
use crate::error::{is_unique_violation, AppError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

const REGISTERED_EVENT_SELECT: &str = r#"
    SELECT r.id AS registration_id, e.id AS event_id, e.title, e.description, e.location,
           c.name AS category_name, e.start_time, e.end_time, e.cover_url,
           r.status, r.attended, r.rating, r.comment, r.notification_read,
           r.created_at AS registered_at
    FROM registrations r
    JOIN events e ON e.id = r.event_id
    LEFT JOIN categories c ON c.id = e.category_id
"#;

pub struct SqliteRegistrationRepo {
    pool: SqlitePool,
}

impl SqliteRegistrationRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationRepository for SqliteRegistrationRepo {
    async fn create(&self, registration: &Registration) -> Result<Registration, AppError> {
        sqlx::query_as::<_, Registration>(
            r#"INSERT INTO registrations (
                id, event_id, user_id, status, attended, rating, comment,
                notification_read, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *"#
        )
            .bind(&registration.id)
            .bind(&registration.event_id)
            .bind(&registration.user_id)
            .bind(&registration.status)
            .bind(registration.attended)
            .bind(registration.rating)
            .bind(&registration.comment)
            .bind(registration.notification_read)
            .bind(registration.created_at)
            .bind(registration.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                // A concurrent join that slipped past the lookup lands here.
                if is_unique_violation(&e) {
                    AppError::Validation(ALREADY_REGISTERED.into())
                } else {
                    AppError::Database(e)
                }
            })
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Registration>, AppError> {
        sqlx::query_as::<_, Registration>("SELECT * FROM registrations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_event_and_user(&self, event_id: &str, user_id: &str) -> Result<Option<Registration>, AppError> {
        sqlx::query_as::<_, Registration>("SELECT * FROM registrations WHERE event_id = ? AND user_id = ?")
            .bind(event_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Attendee>, AppError> {
        sqlx::query_as::<_, Attendee>(
            r#"SELECT r.id, r.user_id, u.username, r.status, r.attended, r.rating, r.comment,
                      r.created_at AS registration_date
               FROM registrations r
               JOIN users u ON u.id = r.user_id
               WHERE r.event_id = ?
               ORDER BY r.created_at"#
        )
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<RegisteredEvent>, AppError> {
        sqlx::query_as::<_, RegisteredEvent>(
            &format!("{} WHERE r.user_id = ? ORDER BY e.start_time ASC", REGISTERED_EVENT_SELECT)
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_upcoming_for_user(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<RegisteredEvent>, AppError> {
        sqlx::query_as::<_, RegisteredEvent>(&format!(
            "{} WHERE r.user_id = ? AND e.start_time > ? AND r.status <> 'cancelled' ORDER BY e.start_time ASC",
            REGISTERED_EVENT_SELECT
        ))
            .bind(user_id)
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, registration: &Registration) -> Result<Registration, AppError> {
        sqlx::query_as::<_, Registration>(
            r#"UPDATE registrations SET
                status=?, attended=?, rating=?, comment=?, notification_read=?, updated_at=?
               WHERE id=? RETURNING *"#
        )
            .bind(&registration.status)
            .bind(registration.attended)
            .bind(registration.rating)
            .bind(&registration.comment)
            .bind(registration.notification_read)
            .bind(registration.updated_at)
            .bind(&registration.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Registration not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM registrations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Registration not found".into()));
        }
        Ok(())
    }

    async fn count_seated(&self, event_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM registrations WHERE event_id = ? AND status NOT IN ('cancelled', 'waitlisted')"
        )
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_by_user(&self, user_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM registrations WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn mark_all_read(&self, user_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE registrations SET notification_read = ?, updated_at = ? WHERE user_id = ? AND notification_read = ?"
        )
            .bind(true)
            .bind(Utc::now())
            .bind(user_id)
            .bind(false)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}
