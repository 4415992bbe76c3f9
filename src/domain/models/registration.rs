use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use crate::error::AppError;

pub const ALREADY_REGISTERED: &str = "ya estás inscrito.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Registered,
    Confirmed,
    Attended,
    Cancelled,
    Waitlisted,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Registered => "registered",
            RegistrationStatus::Confirmed => "confirmed",
            RegistrationStatus::Attended => "attended",
            RegistrationStatus::Cancelled => "cancelled",
            RegistrationStatus::Waitlisted => "waitlisted",
        }
    }

    /// Whether the registration holds a seat against the event capacity.
    pub fn occupies_seat(&self) -> bool {
        !matches!(self, RegistrationStatus::Cancelled | RegistrationStatus::Waitlisted)
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registered" => Ok(RegistrationStatus::Registered),
            "confirmed" => Ok(RegistrationStatus::Confirmed),
            "attended" => Ok(RegistrationStatus::Attended),
            "cancelled" => Ok(RegistrationStatus::Cancelled),
            "waitlisted" => Ok(RegistrationStatus::Waitlisted),
            other => Err(AppError::Validation(format!("Invalid status '{}'", other))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Registration {
    pub id: String,
    pub event_id: String,
    pub user_id: String,
    pub status: String,
    pub attended: bool,
    pub rating: Option<i32>,
    pub comment: Option<String>,
    pub notification_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    pub fn new(event_id: String, user_id: String, status: RegistrationStatus) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            user_id,
            status: status.as_str().to_string(),
            attended: false,
            rating: None,
            comment: None,
            notification_read: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_status(&mut self, status: RegistrationStatus) {
        self.status = status.as_str().to_string();
        if status == RegistrationStatus::Attended {
            self.attended = true;
        }
        self.updated_at = Utc::now();
    }

    /// Marks the registration attended, whatever state it was in.
    pub fn confirm_attendance(&mut self) {
        self.set_status(RegistrationStatus::Attended);
    }

    pub fn rate(&mut self, rating: i32, comment: Option<String>) -> Result<(), AppError> {
        self.rating = Some(validate_rating(rating)?);
        if comment.is_some() {
            self.comment = comment;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

pub fn validate_rating(rating: i32) -> Result<i32, AppError> {
    if (1..=5).contains(&rating) {
        Ok(rating)
    } else {
        Err(AppError::Validation("rating must be between 1 and 5".into()))
    }
}

/// Accepts only JSON integers in [1, 5]; `4.5`, `"5"` or `null` are rejected.
pub fn parse_rating(value: &Value) -> Result<i32, AppError> {
    let rating = value.as_i64()
        .ok_or_else(|| AppError::Validation("rating must be between 1 and 5".into()))?;
    let rating = i32::try_from(rating)
        .map_err(|_| AppError::Validation("rating must be between 1 and 5".into()))?;
    validate_rating(rating)
}

/// A registration row as seen by the event organizer.
#[derive(Debug, Serialize, FromRow, Clone)]
pub struct Attendee {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub status: String,
    pub attended: bool,
    pub rating: Option<i32>,
    pub comment: Option<String>,
    pub registration_date: DateTime<Utc>,
}

/// A registration row as seen by the registrant, with event details.
#[derive(Debug, Serialize, FromRow, Clone)]
pub struct RegisteredEvent {
    pub registration_id: String,
    pub event_id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub category_name: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub cover_url: Option<String>,
    pub status: String,
    pub attended: bool,
    pub rating: Option<i32>,
    pub comment: Option<String>,
    pub notification_read: bool,
    pub registered_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rating_range() {
        for ok in 1..=5 {
            assert_eq!(validate_rating(ok).unwrap(), ok);
        }
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        assert!(validate_rating(-3).is_err());
    }

    #[test]
    fn test_rating_json_must_be_integer() {
        assert_eq!(parse_rating(&json!(4)).unwrap(), 4);
        assert!(parse_rating(&json!(4.5)).is_err());
        assert!(parse_rating(&json!("5")).is_err());
        assert!(parse_rating(&json!(null)).is_err());
        assert!(parse_rating(&json!(10_000_000_000i64)).is_err());
    }

    #[test]
    fn test_confirm_attendance_from_any_state() {
        for start in [RegistrationStatus::Waitlisted, RegistrationStatus::Cancelled, RegistrationStatus::Registered] {
            let mut reg = Registration::new("e".into(), "u".into(), start);
            reg.confirm_attendance();
            assert_eq!(reg.status, "attended");
            assert!(reg.attended);
        }
    }

    #[test]
    fn test_status_round_trip_and_seats() {
        let status: RegistrationStatus = "waitlisted".parse().unwrap();
        assert!(!status.occupies_seat());
        assert!(RegistrationStatus::Confirmed.occupies_seat());
        assert!("pending".parse::<RegistrationStatus>().is_err());
    }

    #[test]
    fn test_rate_keeps_comment_when_absent() {
        let mut reg = Registration::new("e".into(), "u".into(), RegistrationStatus::Registered);
        reg.rate(5, Some("Great".into())).unwrap();
        reg.rate(4, None).unwrap();
        assert_eq!(reg.rating, Some(4));
        assert_eq!(reg.comment.as_deref(), Some("Great"));
        assert!(reg.rate(7, None).is_err());
        assert_eq!(reg.rating, Some(4));
    }
}
