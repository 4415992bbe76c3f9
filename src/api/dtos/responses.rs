use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::domain::models::event::{EventDetails, EventStatus};
use crate::domain::models::registration::Attendee;
use crate::domain::models::report::{
    EventReportRow, GlobalStats, MonthlyCount, OrganizerSummary, RegistrationSummary, RoleBreakdown, UserActivity,
};
use crate::domain::services::notifications::Notification;
use crate::domain::services::reporting::UNCATEGORIZED;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub id: String,
    pub username: String,
    pub role: String,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub event_count: i64,
    pub organized_count: i64,
}

#[derive(Serialize)]
pub struct EventCountResponse {
    pub event_count: i64,
}

#[derive(Serialize)]
pub struct DetailResponse {
    pub detail: String,
}

#[derive(Serialize)]
pub struct CheckRegistrationResponse {
    pub is_registered: bool,
    pub registration_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct EventSummary {
    pub id: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
    pub category: String,
    pub organizer: String,
    pub is_public: bool,
    pub status: EventStatus,
}

impl EventSummary {
    pub fn from_details(details: &EventDetails, now: DateTime<Utc>) -> Self {
        let event = &details.event;
        Self {
            id: event.id.clone(),
            title: event.title.clone(),
            start_time: event.start_time,
            end_time: event.end_time,
            location: event.location.clone(),
            capacity: event.capacity,
            category: details.category_name.clone().unwrap_or_else(|| UNCATEGORIZED.to_string()),
            organizer: details.organizer_username.clone(),
            is_public: event.is_public,
            status: event.status_at(now),
        }
    }
}

#[derive(Serialize)]
pub struct EventReportResponse {
    pub success: bool,
    pub event: EventSummary,
    pub stats: RegistrationSummary,
    pub registrations: Vec<Attendee>,
}

#[derive(Serialize)]
pub struct OrganizerReportResponse {
    pub success: bool,
    pub summary: OrganizerSummary,
    pub events: Vec<EventReportRow>,
}

#[derive(Serialize)]
pub struct GlobalReportResponse {
    pub success: bool,
    pub stats: GlobalStats,
    pub events: Vec<EventReportRow>,
}

#[derive(Serialize)]
pub struct UserAnalyticsResponse {
    pub success: bool,
    pub total_users: i64,
    pub users_by_role: RoleBreakdown,
    pub active_users: i64,
    pub new_users_by_month: Vec<MonthlyCount>,
    pub top_attendees: Vec<UserActivity>,
}

#[derive(Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

#[derive(Serialize)]
pub struct MarkReadResponse {
    pub updated: u64,
}
