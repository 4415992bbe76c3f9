//! Rate math and report shaping shared by the organizer and admin reports.
//!
//! Every report is recomputed from the aggregate rows the report repository
//! returns; nothing here is cached.

use std::collections::BTreeMap;
use std::str::FromStr;
use chrono::{DateTime, Duration, Utc};
use crate::domain::models::event::EventStatus;
use crate::domain::models::report::{
    CategoryCount, EventReportRow, EventStatsRow, OrganizerSummary, RegistrationCounts,
    RegistrationSummary, RoleBreakdown, RoleCount, StatusBreakdown,
};
use crate::error::AppError;

pub const UNCATEGORIZED: &str = "Uncategorized";
pub const TOP_EVENTS_LIMIT: usize = 50;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percentage(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    round2(part as f64 / whole as f64 * 100.0)
}

/// Attended as a percentage of `denominator`; 0 when there is nothing to divide by.
pub fn attendance_rate(attended: i64, denominator: i64) -> f64 {
    percentage(attended, denominator)
}

/// Seats taken as a percentage of capacity; an unbounded event counts as full.
pub fn occupancy_rate(active: i64, capacity: Option<i32>) -> f64 {
    match capacity {
        Some(cap) if cap > 0 => percentage(active, cap as i64),
        _ => 100.0,
    }
}

pub fn confirmation_rate(confirmed_or_attended: i64, total: i64) -> f64 {
    percentage(confirmed_or_attended, total)
}

pub fn summarize(counts: &RegistrationCounts, capacity: Option<i32>) -> RegistrationSummary {
    RegistrationSummary {
        total_registrations: counts.total,
        by_status: StatusBreakdown {
            registered: counts.registered,
            confirmed: counts.confirmed,
            attended: counts.attended,
            cancelled: counts.cancelled,
            waitlisted: counts.waitlisted,
        },
        attended_count: counts.attended,
        attendance_rate: attendance_rate(counts.attended, counts.total),
        occupancy_rate: occupancy_rate(counts.active(), capacity),
        confirmation_rate: confirmation_rate(counts.confirmed + counts.attended, counts.total),
        average_rating: counts.average_rating.map(round2),
        ratings_count: counts.ratings_count,
    }
}

pub fn event_row(row: &EventStatsRow, now: DateTime<Utc>) -> EventReportRow {
    let counts = &row.counts;
    EventReportRow {
        id: row.event_id.clone(),
        title: row.title.clone(),
        start_time: row.start_time,
        end_time: row.end_time,
        category: row.category_name.clone().unwrap_or_else(|| UNCATEGORIZED.to_string()),
        organizer: row.organizer_username.clone(),
        location: row.location.clone(),
        capacity: row.capacity,
        is_public: row.is_public,
        status: EventStatus::at(row.start_time, row.end_time, now),
        total_registrations: counts.total,
        confirmed: counts.confirmed,
        attended: counts.attended,
        attendance_rate: attendance_rate(counts.attended, counts.total),
        occupancy_rate: occupancy_rate(counts.active(), row.capacity),
        average_rating: counts.average_rating.map(round2),
    }
}

/// Folds per-event counts into one set. The average rating is weighted by
/// how many ratings each event received.
pub fn combine(rows: &[EventStatsRow]) -> RegistrationCounts {
    let mut total = RegistrationCounts::default();
    let mut rating_sum = 0.0;
    for row in rows {
        let c = &row.counts;
        total.total += c.total;
        total.registered += c.registered;
        total.confirmed += c.confirmed;
        total.attended += c.attended;
        total.cancelled += c.cancelled;
        total.waitlisted += c.waitlisted;
        total.ratings_count += c.ratings_count;
        if let Some(avg) = c.average_rating {
            rating_sum += avg * c.ratings_count as f64;
        }
    }
    if total.ratings_count > 0 {
        total.average_rating = Some(rating_sum / total.ratings_count as f64);
    }
    total
}

pub fn organizer_summary(rows: &[EventStatsRow]) -> OrganizerSummary {
    let totals = combine(rows);
    OrganizerSummary {
        total_events: rows.len(),
        total_registrations: totals.total,
        total_attended: totals.attended,
        attendance_rate: attendance_rate(totals.attended, totals.total),
        average_rating: totals.average_rating.map(round2),
    }
}

pub fn category_distribution(counts: Vec<CategoryCount>) -> BTreeMap<String, i64> {
    let mut map = BTreeMap::new();
    for c in counts {
        let name = c.category.unwrap_or_else(|| UNCATEGORIZED.to_string());
        *map.entry(name).or_insert(0) += c.count;
    }
    map
}

pub fn role_breakdown(counts: Vec<RoleCount>) -> RoleBreakdown {
    let mut breakdown = RoleBreakdown::default();
    for c in counts {
        match c.role.as_str() {
            "student" => breakdown.student += c.count,
            "organizer" => breakdown.organizer += c.count,
            "admin" => breakdown.admin += c.count,
            _ => {}
        }
    }
    breakdown
}

/// Rolling window selected by the `period` query parameter of the global report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    All,
    Today,
    Week,
    Month,
}

impl ReportPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPeriod::All => "all",
            ReportPeriod::Today => "today",
            ReportPeriod::Week => "week",
            ReportPeriod::Month => "month",
        }
    }

    pub fn since(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            ReportPeriod::All => None,
            ReportPeriod::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|midnight| midnight.and_utc()),
            ReportPeriod::Week => Some(now - Duration::days(7)),
            ReportPeriod::Month => Some(now - Duration::days(30)),
        }
    }
}

impl FromStr for ReportPeriod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(ReportPeriod::All),
            "today" => Ok(ReportPeriod::Today),
            "week" => Ok(ReportPeriod::Week),
            "month" => Ok(ReportPeriod::Month),
            other => Err(AppError::Validation(format!("Invalid period '{}'", other))),
        }
    }
}

/// The later of two optional lower bounds.
pub fn latest(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, None) => x,
        (None, y) => y,
    }
}
