use crate::domain::models::{
    user::{Account, Profile, Role, User},
    auth::RefreshTokenRecord,
    category::Category,
    event::{Event, EventDetails, EventFilter},
    registration::{Attendee, RegisteredEvent, Registration},
    report::{CategoryCount, EventStatsRow, MonthlyCount, RegistrationCounts, ReportScope, RoleCount, UserActivity},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts the user and its profile in one transaction.
    async fn create(&self, user: &User, role: Role) -> Result<Account, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_account(&self, id: &str) -> Result<Option<Account>, AppError>;
    async fn ensure_profile(&self, user_id: &str) -> Result<Profile, AppError>;
    async fn update_identity(&self, id: &str, username: &str, email: &str) -> Result<Account, AppError>;
    async fn update_password(&self, id: &str, password_hash: &str) -> Result<(), AppError>;
    async fn set_role(&self, id: &str, role: Role) -> Result<Account, AppError>;
    /// Removes the user along with its events, registrations and tokens.
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AppError>;
    /// Marks an unconsumed token as used; returns how many rows changed (0 or 1).
    async fn consume_refresh_token(&self, token_hash: &str, at: DateTime<Utc>) -> Result<u64, AppError>;
    async fn delete_refresh_token(&self, token_hash: &str) -> Result<(), AppError>;
    async fn delete_refresh_family(&self, family_id: &str) -> Result<(), AppError>;
    async fn delete_for_user(&self, user_id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, name: &str) -> Result<Category, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Category>, AppError>;
    async fn list(&self) -> Result<Vec<Category>, AppError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<EventDetails, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<EventDetails>, AppError>;
    async fn list(&self, filter: &EventFilter) -> Result<Vec<EventDetails>, AppError>;
    async fn update(&self, event: &Event) -> Result<EventDetails, AppError>;
    /// Removes the event and its registrations in one transaction.
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn count_by_organizer(&self, organizer_id: &str) -> Result<i64, AppError>;
}

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    async fn create(&self, registration: &Registration) -> Result<Registration, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Registration>, AppError>;
    async fn find_by_event_and_user(&self, event_id: &str, user_id: &str) -> Result<Option<Registration>, AppError>;
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Attendee>, AppError>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<RegisteredEvent>, AppError>;
    async fn list_upcoming_for_user(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<RegisteredEvent>, AppError>;
    async fn update(&self, registration: &Registration) -> Result<Registration, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn count_seated(&self, event_id: &str) -> Result<i64, AppError>;
    async fn count_by_user(&self, user_id: &str) -> Result<i64, AppError>;
    async fn mark_all_read(&self, user_id: &str) -> Result<u64, AppError>;
}

#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn registration_counts(&self, event_id: &str) -> Result<RegistrationCounts, AppError>;
    async fn event_stats(&self, scope: &ReportScope) -> Result<Vec<EventStatsRow>, AppError>;
    async fn events_by_category(&self, scope: &ReportScope) -> Result<Vec<CategoryCount>, AppError>;
    async fn registrations_by_month(&self, scope: &ReportScope) -> Result<Vec<MonthlyCount>, AppError>;
    async fn count_users(&self) -> Result<i64, AppError>;
    async fn count_active_users(&self) -> Result<i64, AppError>;
    async fn users_by_role(&self) -> Result<Vec<RoleCount>, AppError>;
    async fn new_users_by_month(&self) -> Result<Vec<MonthlyCount>, AppError>;
    async fn top_attendees(&self, limit: i64) -> Result<Vec<UserActivity>, AppError>;
}
