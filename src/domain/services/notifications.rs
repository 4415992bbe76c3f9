use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use crate::domain::models::registration::RegisteredEvent;

pub const UPCOMING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Serialize, Clone)]
pub struct Notification {
    pub registration_id: String,
    pub event_id: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub location: Option<String>,
    pub status: String,
    pub is_today: bool,
    pub is_upcoming: bool,
    pub unread: bool,
}

pub fn project(entry: RegisteredEvent, now: DateTime<Utc>) -> Notification {
    let is_today = entry.start_time.date_naive() == now.date_naive();
    let is_upcoming = !is_today
        && entry.start_time > now
        && entry.start_time - now <= Duration::days(UPCOMING_WINDOW_DAYS);

    Notification {
        registration_id: entry.registration_id,
        event_id: entry.event_id,
        title: entry.title,
        start_time: entry.start_time,
        location: entry.location,
        status: entry.status,
        is_today,
        is_upcoming,
        unread: !entry.notification_read,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(start: DateTime<Utc>, read: bool) -> RegisteredEvent {
        RegisteredEvent {
            registration_id: "r".into(),
            event_id: "e".into(),
            title: "Workshop".into(),
            description: None,
            location: Some("Aula 3".into()),
            category_name: None,
            start_time: start,
            end_time: None,
            cover_url: None,
            status: "registered".into(),
            attended: false,
            rating: None,
            comment: None,
            notification_read: read,
            registered_at: start - Duration::days(30),
        }
    }

    #[test]
    fn test_today_and_upcoming_flags() {
        let now = Utc.with_ymd_and_hms(2025, 4, 10, 8, 0, 0).unwrap();

        let later_today = project(entry(now + Duration::hours(4), false), now);
        assert!(later_today.is_today);
        assert!(!later_today.is_upcoming);
        assert!(later_today.unread);

        let in_three_days = project(entry(now + Duration::days(3), true), now);
        assert!(!in_three_days.is_today);
        assert!(in_three_days.is_upcoming);
        assert!(!in_three_days.unread);

        let next_month = project(entry(now + Duration::days(30), false), now);
        assert!(!next_month.is_today);
        assert!(!next_month.is_upcoming);
    }
}
