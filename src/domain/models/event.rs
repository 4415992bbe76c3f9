use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Event {
    pub id: String,
    pub organizer_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub capacity: Option<i32>,
    pub is_public: bool,
    pub cover_url: Option<String>,
    pub metadata: Json<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewEventParams {
    pub organizer_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub capacity: Option<i32>,
    pub is_public: bool,
    pub cover_url: Option<String>,
    pub metadata: Value,
}

impl Event {
    pub fn new(params: NewEventParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            organizer_id: params.organizer_id,
            title: params.title,
            description: params.description,
            category_id: params.category_id,
            location: params.location,
            start_time: params.start_time,
            end_time: params.end_time,
            capacity: params.capacity,
            is_public: params.is_public,
            cover_url: params.cover_url,
            metadata: Json(params.metadata),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("Title must not be empty".into()));
        }
        if let Some(end) = self.end_time
            && end <= self.start_time {
            return Err(AppError::Validation("End time must be after start time".into()));
        }
        if let Some(capacity) = self.capacity
            && capacity < 0 {
            return Err(AppError::Validation("Capacity must not be negative".into()));
        }
        if !self.metadata.0.is_object() {
            return Err(AppError::Validation("Metadata must be a JSON object".into()));
        }
        Ok(())
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> EventStatus {
        EventStatus::at(self.start_time, self.end_time, now)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Finished,
    Upcoming,
    Active,
}

impl EventStatus {
    pub fn at(start: DateTime<Utc>, end: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match end {
            Some(end) if end < now => EventStatus::Finished,
            _ if start > now => EventStatus::Upcoming,
            _ => EventStatus::Active,
        }
    }
}

/// An event together with the columns joined in for display.
#[derive(Debug, Serialize, FromRow, Clone)]
pub struct EventDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: Event,
    pub organizer_username: String,
    pub category_name: Option<String>,
    pub registered_count: i64,
}

#[derive(Debug, Clone)]
pub enum Visibility {
    PublicOnly,
    PublicOrOwnedBy(String),
    All,
}

#[derive(Debug, Clone)]
pub struct EventFilter {
    pub visibility: Visibility,
    pub organizer_id: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub starts_from: Option<DateTime<Utc>>,
    pub starts_before: Option<DateTime<Utc>>,
}

impl EventFilter {
    pub fn new(visibility: Visibility) -> Self {
        Self {
            visibility,
            organizer_id: None,
            search: None,
            category: None,
            location: None,
            starts_from: None,
            starts_before: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Event {
        Event::new(NewEventParams {
            organizer_id: "org".into(),
            title: "Hackathon".into(),
            description: None,
            category_id: None,
            location: None,
            start_time: start,
            end_time: end,
            capacity: Some(10),
            is_public: true,
            cover_url: None,
            metadata: serde_json::json!({}),
        })
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let start = Utc.with_ymd_and_hms(2025, 1, 10, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap();
        assert!(sample(start, Some(end)).validate().is_err());
        assert!(sample(start, Some(start)).validate().is_err());
        assert!(sample(start, None).validate().is_ok());
        assert!(sample(start, Some(end + chrono::Duration::hours(2))).validate().is_ok());
    }

    #[test]
    fn test_negative_capacity_is_rejected() {
        let start = Utc.with_ymd_and_hms(2025, 1, 10, 10, 0, 0).unwrap();
        let mut event = sample(start, None);
        event.capacity = Some(-1);
        assert!(event.validate().is_err());
        event.capacity = Some(0);
        assert!(event.validate().is_ok());
    }

    #[test]
    fn test_status_relative_to_now() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let hour = chrono::Duration::hours(1);
        assert_eq!(EventStatus::at(now - hour * 3, Some(now - hour), now), EventStatus::Finished);
        assert_eq!(EventStatus::at(now + hour, None, now), EventStatus::Upcoming);
        assert_eq!(EventStatus::at(now - hour, Some(now + hour), now), EventStatus::Active);
        assert_eq!(EventStatus::at(now - hour, None, now), EventStatus::Active);
    }
}
