use crate::domain::{models::user::{Account, Profile, Role, User}, ports::UserRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::error;

const ACCOUNT_SELECT: &str =
    "SELECT u.id, u.username, u.email, p.role, u.created_at FROM users u JOIN profiles p ON p.user_id = u.id";

pub struct PostgresUserRepo {
    pool: PgPool,
}

impl PostgresUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepo {
    async fn create(&self, user: &User, role: Role) -> Result<Account, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("INSERT INTO users (id, username, email, password_hash, created_at) VALUES ($1, $2, $3, $4, $5)")
            .bind(&user.id).bind(&user.username).bind(&user.email).bind(&user.password_hash).bind(user.created_at)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        sqlx::query("INSERT INTO profiles (user_id, role, created_at) VALUES ($1, $2, $3)")
            .bind(&user.id).bind(role.as_str()).bind(user.created_at)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;

        Ok(Account {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: role.as_str().to_string(),
            created_at: user.created_at,
        })
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT id, username, email, password_hash, created_at FROM users WHERE username = $1")
            .bind(username).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT id, username, email, password_hash, created_at FROM users WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_account(&self, id: &str) -> Result<Option<Account>, AppError> {
        sqlx::query_as::<_, Account>(&format!("{} WHERE u.id = $1", ACCOUNT_SELECT))
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn ensure_profile(&self, user_id: &str) -> Result<Profile, AppError> {
        let profile = Profile::new(user_id.to_string(), Role::Student);
        sqlx::query("INSERT INTO profiles (user_id, role, created_at) VALUES ($1, $2, $3) ON CONFLICT (user_id) DO NOTHING")
            .bind(&profile.user_id).bind(&profile.role).bind(profile.created_at)
            .execute(&self.pool).await.map_err(AppError::Database)?;

        sqlx::query_as::<_, Profile>("SELECT user_id, role, created_at FROM profiles WHERE user_id = $1")
            .bind(user_id).fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn update_identity(&self, id: &str, username: &str, email: &str) -> Result<Account, AppError> {
        let result = sqlx::query("UPDATE users SET username = $1, email = $2 WHERE id = $3")
            .bind(username).bind(email).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        self.find_account(id).await?
            .ok_or(AppError::NotFound("User not found".into()))
    }

    async fn update_password(&self, id: &str, password_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn set_role(&self, id: &str, role: Role) -> Result<Account, AppError> {
        sqlx::query(
            "INSERT INTO profiles (user_id, role, created_at) VALUES ($1, $2, $3)
             ON CONFLICT (user_id) DO UPDATE SET role = EXCLUDED.role"
        )
            .bind(id).bind(role.as_str()).bind(Utc::now())
            .execute(&self.pool).await.map_err(AppError::Database)?;

        self.find_account(id).await?
            .ok_or(AppError::NotFound("User not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("DELETE FROM registrations WHERE event_id IN (SELECT id FROM events WHERE organizer_id = $1)")
            .bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM events WHERE organizer_id = $1")
            .bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM registrations WHERE user_id = $1")
            .bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Postgres user deletion failed: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
