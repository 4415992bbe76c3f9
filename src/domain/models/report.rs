use serde::Serialize;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::collections::BTreeMap;
use super::event::EventStatus;

/// Per-status registration counts for some scope of events.
#[derive(Debug, FromRow, Clone, Default)]
pub struct RegistrationCounts {
    pub total: i64,
    pub registered: i64,
    pub confirmed: i64,
    pub attended: i64,
    pub cancelled: i64,
    pub waitlisted: i64,
    pub ratings_count: i64,
    pub average_rating: Option<f64>,
}

impl RegistrationCounts {
    /// Registrations holding a seat (not cancelled, not waitlisted).
    pub fn active(&self) -> i64 {
        self.total - self.cancelled - self.waitlisted
    }
}

#[derive(Debug, FromRow, Clone)]
pub struct EventStatsRow {
    pub event_id: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
    pub is_public: bool,
    pub category_name: Option<String>,
    pub organizer_username: String,
    #[sqlx(flatten)]
    pub counts: RegistrationCounts,
}

#[derive(Debug, FromRow, Clone)]
pub struct CategoryCount {
    pub category: Option<String>,
    pub count: i64,
}

#[derive(Debug, Serialize, FromRow, Clone)]
pub struct MonthlyCount {
    pub month: String,
    pub count: i64,
}

#[derive(Debug, FromRow, Clone)]
pub struct RoleCount {
    pub role: String,
    pub count: i64,
}

#[derive(Debug, Serialize, FromRow, Clone)]
pub struct UserActivity {
    pub user_id: String,
    pub username: String,
    pub registrations: i64,
    pub attended: i64,
}

/// Which events a report covers. Bounds apply to `start_time`.
#[derive(Debug, Clone, Default)]
pub struct ReportScope {
    pub organizer_id: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct StatusBreakdown {
    pub registered: i64,
    pub confirmed: i64,
    pub attended: i64,
    pub cancelled: i64,
    pub waitlisted: i64,
}

#[derive(Debug, Serialize, Clone)]
pub struct RegistrationSummary {
    pub total_registrations: i64,
    pub by_status: StatusBreakdown,
    pub attended_count: i64,
    pub attendance_rate: f64,
    pub occupancy_rate: f64,
    pub confirmation_rate: f64,
    pub average_rating: Option<f64>,
    pub ratings_count: i64,
}

#[derive(Debug, Serialize, Clone)]
pub struct EventReportRow {
    pub id: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub category: String,
    pub organizer: String,
    pub location: Option<String>,
    pub capacity: Option<i32>,
    pub is_public: bool,
    pub status: EventStatus,
    pub total_registrations: i64,
    pub confirmed: i64,
    pub attended: i64,
    pub attendance_rate: f64,
    pub occupancy_rate: f64,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Serialize, Clone)]
pub struct OrganizerSummary {
    pub total_events: usize,
    pub total_registrations: i64,
    pub total_attended: i64,
    pub attendance_rate: f64,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Serialize, Clone)]
pub struct GlobalStats {
    pub total_events: usize,
    pub total_registrations: i64,
    pub total_confirmed: i64,
    pub total_attended: i64,
    pub total_confirmed_and_attended: i64,
    pub confirmation_rate: f64,
    pub attendance_rate: f64,
    pub total_users: i64,
    pub events_by_category: BTreeMap<String, i64>,
    pub registrations_by_month: Vec<MonthlyCount>,
    pub period: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct RoleBreakdown {
    pub student: i64,
    pub organizer: i64,
    pub admin: i64,
}
