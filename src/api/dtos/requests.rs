use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use crate::error::AppError;

/// Lets `Option<Option<T>>` fields tell an explicit `null` from an absent key.
fn explicit<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Deserialize)]
pub struct LogoutRequest {
    pub refresh: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct ReplaceProfileRequest {
    pub username: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<i64>,
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub capacity: Option<i32>,
    pub is_public: Option<bool>,
    pub cover_url: Option<String>,
    pub metadata: Option<Value>,
}

/// Partial update. For nullable columns `Some(None)` clears the value.
#[derive(Deserialize, Default)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "explicit")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit")]
    pub category: Option<Option<i64>>,
    #[serde(default, deserialize_with = "explicit")]
    pub location: Option<Option<String>>,
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "explicit")]
    pub end_time: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "explicit")]
    pub capacity: Option<Option<i32>>,
    pub is_public: Option<bool>,
    #[serde(default, deserialize_with = "explicit")]
    pub cover_url: Option<Option<String>>,
    pub metadata: Option<Value>,
}

#[derive(Deserialize, Default)]
pub struct EventListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub mine: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateRegistrationRequest {
    pub status: Option<String>,
    pub attended: Option<bool>,
}

#[derive(Deserialize)]
pub struct RateRequest {
    #[serde(default)]
    pub rating: Value,
    pub comment: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct GlobalReportQuery {
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

fn parse_day(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", value)))
}

/// Turns inclusive `YYYY-MM-DD` bounds into a half-open `[from, before)` range.
pub fn date_bounds(
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), AppError> {
    let from = start_date
        .filter(|s| !s.is_empty())
        .map(parse_day)
        .transpose()?
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc());

    let before = end_date
        .filter(|s| !s.is_empty())
        .map(parse_day)
        .transpose()?
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc() + Duration::days(1));

    Ok((from, before))
}
