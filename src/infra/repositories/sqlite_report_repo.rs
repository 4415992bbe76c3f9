use crate::domain::{
    models::report::{CategoryCount, EventStatsRow, MonthlyCount, RegistrationCounts, ReportScope, RoleCount, UserActivity},
    ports::ReportRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const STATUS_COUNTS: &str = r#"
    COUNT(r.id) AS total,
    COUNT(CASE WHEN r.status = 'registered' THEN 1 END) AS registered,
    COUNT(CASE WHEN r.status = 'confirmed' THEN 1 END) AS confirmed,
    COUNT(CASE WHEN r.status = 'attended' THEN 1 END) AS attended,
    COUNT(CASE WHEN r.status = 'cancelled' THEN 1 END) AS cancelled,
    COUNT(CASE WHEN r.status = 'waitlisted' THEN 1 END) AS waitlisted,
    COUNT(r.rating) AS ratings_count,
    AVG(r.rating) AS average_rating
"#;

pub struct SqliteReportRepo {
    pool: SqlitePool,
}

impl SqliteReportRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn push_scope(qb: &mut QueryBuilder<Sqlite>, scope: &ReportScope) {
    qb.push(" WHERE 1 = 1");
    if let Some(organizer_id) = &scope.organizer_id {
        qb.push(" AND e.organizer_id = ").push_bind(organizer_id.clone());
    }
    if let Some(since) = scope.since {
        qb.push(" AND e.start_time >= ").push_bind(since);
    }
    if let Some(until) = scope.until {
        qb.push(" AND e.start_time < ").push_bind(until);
    }
}

#[async_trait]
impl ReportRepository for SqliteReportRepo {
    async fn registration_counts(&self, event_id: &str) -> Result<RegistrationCounts, AppError> {
        sqlx::query_as::<_, RegistrationCounts>(
            &format!("SELECT {} FROM registrations r WHERE r.event_id = ?", STATUS_COUNTS)
        )
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn event_stats(&self, scope: &ReportScope) -> Result<Vec<EventStatsRow>, AppError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            r#"SELECT e.id AS event_id, e.title, e.start_time, e.end_time, e.location, e.capacity,
                      e.is_public, c.name AS category_name, u.username AS organizer_username, {}
               FROM events e
               JOIN users u ON u.id = e.organizer_id
               LEFT JOIN categories c ON c.id = e.category_id
               LEFT JOIN registrations r ON r.event_id = e.id"#,
            STATUS_COUNTS
        ));
        push_scope(&mut qb, scope);
        qb.push(" GROUP BY e.id, e.title, e.start_time, e.end_time, e.location, e.capacity, e.is_public, c.name, u.username");
        qb.push(" ORDER BY e.start_time DESC");

        qb.build_query_as::<EventStatsRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn events_by_category(&self, scope: &ReportScope) -> Result<Vec<CategoryCount>, AppError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT c.name AS category, COUNT(e.id) AS count FROM events e LEFT JOIN categories c ON c.id = e.category_id"
        );
        push_scope(&mut qb, scope);
        qb.push(" GROUP BY c.name ORDER BY c.name");

        qb.build_query_as::<CategoryCount>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn registrations_by_month(&self, scope: &ReportScope) -> Result<Vec<MonthlyCount>, AppError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT substr(r.created_at, 1, 7) AS month, COUNT(*) AS count FROM registrations r JOIN events e ON e.id = r.event_id"
        );
        push_scope(&mut qb, scope);
        qb.push(" GROUP BY 1 ORDER BY 1");

        qb.build_query_as::<MonthlyCount>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_users(&self) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_active_users(&self) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(DISTINCT user_id) FROM registrations")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn users_by_role(&self) -> Result<Vec<RoleCount>, AppError> {
        sqlx::query_as::<_, RoleCount>("SELECT role, COUNT(*) AS count FROM profiles GROUP BY role")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn new_users_by_month(&self) -> Result<Vec<MonthlyCount>, AppError> {
        sqlx::query_as::<_, MonthlyCount>(
            "SELECT substr(created_at, 1, 7) AS month, COUNT(*) AS count FROM users GROUP BY 1 ORDER BY 1"
        )
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn top_attendees(&self, limit: i64) -> Result<Vec<UserActivity>, AppError> {
        sqlx::query_as::<_, UserActivity>(
            r#"SELECT u.id AS user_id, u.username,
                      COUNT(r.id) AS registrations,
                      COUNT(CASE WHEN r.attended THEN 1 END) AS attended
               FROM users u
               JOIN registrations r ON r.user_id = u.id
               GROUP BY u.id, u.username
               ORDER BY COUNT(CASE WHEN r.attended THEN 1 END) DESC, COUNT(r.id) DESC, u.username
               LIMIT ?"#
        )
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
