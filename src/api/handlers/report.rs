use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::requests::{date_bounds, GlobalReportQuery};
use crate::api::dtos::responses::{
    EventReportResponse, EventSummary, GlobalReportResponse, OrganizerReportResponse, UserAnalyticsResponse,
};
use crate::api::extractors::{auth::AuthUser, path::AppPath, query::AppQuery};
use crate::domain::models::report::{GlobalStats, ReportScope};
use crate::domain::models::user::{CurrentUser, Role};
use crate::domain::services::reporting::{
    attendance_rate, category_distribution, combine, confirmation_rate, event_row, latest,
    organizer_summary, role_breakdown, summarize, ReportPeriod, TOP_EVENTS_LIMIT,
};
use std::sync::Arc;
use tracing::debug;

const TOP_ATTENDEES_LIMIT: i64 = 10;

fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    if !user.is_admin() {
        return Err(AppError::Forbidden("Only administrators can view this report".into()));
    }
    Ok(())
}

/// Per-event statistics, shared by the organizer report and the event's
/// attendance report.
pub async fn build_event_report(
    state: &AppState,
    user: &CurrentUser,
    event_id: &str,
) -> Result<EventReportResponse, AppError> {
    let details = state.event_repo.find_by_id(event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    if !user.can_manage(&details.event.organizer_id) {
        return Err(AppError::Forbidden("You do not have permission to view this report".into()));
    }

    let counts = state.report_repo.registration_counts(event_id).await?;
    let registrations = state.registration_repo.list_by_event(event_id).await?;

    debug!("Event report for {} covers {} registrations", event_id, counts.total);

    Ok(EventReportResponse {
        success: true,
        event: EventSummary::from_details(&details, Utc::now()),
        stats: summarize(&counts, details.event.capacity),
        registrations,
    })
}

pub async fn organizer_event_report(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(build_event_report(&state, &user, &id).await?))
}

pub async fn organizer_all_events(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let scope = match user.role {
        Role::Admin => ReportScope::default(),
        Role::Organizer => ReportScope { organizer_id: Some(user.id.clone()), ..ReportScope::default() },
        Role::Student => return Err(AppError::Forbidden("Only organizers can view this report".into())),
    };

    let rows = state.report_repo.event_stats(&scope).await?;
    let now = Utc::now();

    Ok(Json(OrganizerReportResponse {
        success: true,
        summary: organizer_summary(&rows),
        events: rows.iter().map(|row| event_row(row, now)).collect(),
    }))
}

pub async fn admin_global(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    AppQuery(query): AppQuery<GlobalReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&user)?;

    let period: ReportPeriod = match query.period.as_deref() {
        None | Some("") => ReportPeriod::All,
        Some(raw) => raw.parse()?,
    };
    let (from, before) = date_bounds(query.start_date.as_deref(), query.end_date.as_deref())?;

    let now = Utc::now();
    let scope = ReportScope {
        organizer_id: None,
        since: latest(period.since(now), from),
        until: before,
    };

    let mut rows = state.report_repo.event_stats(&scope).await?;
    let totals = combine(&rows);
    let confirmed_and_attended = totals.confirmed + totals.attended;

    let stats = GlobalStats {
        total_events: rows.len(),
        total_registrations: totals.total,
        total_confirmed: totals.confirmed,
        total_attended: totals.attended,
        total_confirmed_and_attended: confirmed_and_attended,
        confirmation_rate: confirmation_rate(confirmed_and_attended, totals.total),
        attendance_rate: attendance_rate(totals.attended, totals.total),
        total_users: state.report_repo.count_users().await?,
        events_by_category: category_distribution(state.report_repo.events_by_category(&scope).await?),
        registrations_by_month: state.report_repo.registrations_by_month(&scope).await?,
        period: period.as_str().to_string(),
        generated_at: now,
    };

    rows.sort_by(|a, b| b.counts.total.cmp(&a.counts.total));
    let events = rows.iter()
        .take(TOP_EVENTS_LIMIT)
        .map(|row| event_row(row, now))
        .collect();

    Ok(Json(GlobalReportResponse { success: true, stats, events }))
}

pub async fn admin_user_analytics(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&user)?;

    Ok(Json(UserAnalyticsResponse {
        success: true,
        total_users: state.report_repo.count_users().await?,
        users_by_role: role_breakdown(state.report_repo.users_by_role().await?),
        active_users: state.report_repo.count_active_users().await?,
        new_users_by_month: state.report_repo.new_users_by_month().await?,
        top_attendees: state.report_repo.top_attendees(TOP_ATTENDEES_LIMIT).await?,
    }))
}
