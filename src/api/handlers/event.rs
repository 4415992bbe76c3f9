use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::requests::{date_bounds, CreateEventRequest, EventListQuery, UpdateEventRequest};
use crate::api::dtos::responses::CheckRegistrationResponse;
use crate::api::extractors::{auth::AuthUser, json::AppJson, maybe_auth::MaybeAuthUser, path::AppPath, query::AppQuery};
use crate::api::handlers::report::build_event_report;
use crate::domain::models::event::{Event, EventDetails, EventFilter, NewEventParams, Visibility};
use crate::domain::models::registration::{Registration, RegistrationStatus, ALREADY_REGISTERED};
use crate::domain::models::user::CurrentUser;
use std::sync::Arc;
use tracing::info;

/// Private events are only visible to their organizer and to admins.
fn ensure_visible(details: &EventDetails, user: Option<&CurrentUser>) -> Result<(), AppError> {
    if details.event.is_public {
        return Ok(());
    }
    match user {
        Some(u) if u.can_manage(&details.event.organizer_id) => Ok(()),
        _ => Err(AppError::Forbidden("You do not have permission to view this event".into())),
    }
}

async fn load_event(state: &AppState, id: &str) -> Result<EventDetails, AppError> {
    state.event_repo.find_by_id(id).await?
        .ok_or(AppError::NotFound("Event not found".into()))
}

async fn ensure_category_exists(state: &AppState, category_id: Option<i64>) -> Result<(), AppError> {
    if let Some(id) = category_id
        && state.category_repo.find_by_id(id).await?.is_none() {
        return Err(AppError::Validation(format!("Invalid category id {}", id)));
    }
    Ok(())
}

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    AppJson(payload): AppJson<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !user.role.can_organize() {
        return Err(AppError::Forbidden("Only organizers can create events".into()));
    }

    ensure_category_exists(&state, payload.category).await?;

    let event = Event::new(NewEventParams {
        organizer_id: user.id.clone(),
        title: payload.title.trim().to_string(),
        description: payload.description,
        category_id: payload.category,
        location: payload.location,
        start_time: payload.start_time,
        end_time: payload.end_time,
        capacity: payload.capacity,
        is_public: payload.is_public.unwrap_or(true),
        cover_url: payload.cover_url,
        metadata: payload.metadata.unwrap_or_else(|| json!({})),
    });
    event.validate()?;

    let created = state.event_repo.create(&event).await?;

    info!("Event created: {} by {}", created.event.id, user.id);

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(user): MaybeAuthUser,
    AppQuery(query): AppQuery<EventListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let visibility = match &user {
        None => Visibility::PublicOnly,
        Some(u) if u.is_admin() => Visibility::All,
        Some(u) => Visibility::PublicOrOwnedBy(u.id.clone()),
    };

    let (starts_from, starts_before) = date_bounds(query.start_date.as_deref(), query.end_date.as_deref())?;

    let mut filter = EventFilter::new(visibility);
    filter.search = query.search.filter(|s| !s.trim().is_empty());
    filter.category = query.category.filter(|s| !s.trim().is_empty());
    filter.location = query.location.filter(|s| !s.trim().is_empty());
    filter.starts_from = starts_from;
    filter.starts_before = starts_before;

    if query.mine.unwrap_or(false) {
        match &user {
            Some(u) => filter.organizer_id = Some(u.id.clone()),
            None => return Ok(Json(Vec::<EventDetails>::new())),
        }
    }

    Ok(Json(state.event_repo.list(&filter).await?))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(user): MaybeAuthUser,
    AppPath(id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let details = load_event(&state, &id).await?;
    ensure_visible(&details, user.as_ref())?;
    Ok(Json(details))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<String>,
    AppJson(payload): AppJson<UpdateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let details = load_event(&state, &id).await?;
    if !user.can_manage(&details.event.organizer_id) {
        return Err(AppError::Forbidden("You do not have permission to edit this event".into()));
    }

    let mut event = details.event;
    if let Some(v) = payload.title { event.title = v.trim().to_string(); }
    if let Some(v) = payload.description { event.description = v; }
    if let Some(v) = payload.category {
        ensure_category_exists(&state, v).await?;
        event.category_id = v;
    }
    if let Some(v) = payload.location { event.location = v; }
    if let Some(v) = payload.start_time { event.start_time = v; }
    if let Some(v) = payload.end_time { event.end_time = v; }
    if let Some(v) = payload.capacity { event.capacity = v; }
    if let Some(v) = payload.is_public { event.is_public = v; }
    if let Some(v) = payload.cover_url { event.cover_url = v; }
    if let Some(v) = payload.metadata { event.metadata = sqlx::types::Json(v); }

    event.validate()?;
    event.updated_at = Utc::now();

    let updated = state.event_repo.update(&event).await?;

    info!("Event updated: {} by {}", event.id, user.id);

    Ok(Json(updated))
}

pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let details = load_event(&state, &id).await?;
    if !user.can_manage(&details.event.organizer_id) {
        return Err(AppError::Forbidden("You do not have permission to delete this event".into()));
    }

    state.event_repo.delete(&id).await?;

    info!("Event deleted: {} by {}", id, user.id);

    Ok(StatusCode::NO_CONTENT)
}

pub async fn join_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let details = load_event(&state, &id).await?;
    ensure_visible(&details, Some(&user))?;

    if state.registration_repo.find_by_event_and_user(&id, &user.id).await?.is_some() {
        return Err(AppError::Validation(ALREADY_REGISTERED.into()));
    }

    // A capacity of 0 means unbounded, as in the occupancy rate
    let status = match details.event.capacity {
        Some(capacity) if capacity > 0 && state.registration_repo.count_seated(&id).await? >= capacity as i64 => {
            RegistrationStatus::Waitlisted
        }
        _ => RegistrationStatus::Registered,
    };

    let registration = state.registration_repo
        .create(&Registration::new(id.clone(), user.id.clone(), status))
        .await?;

    info!("User {} joined event {} as {}", user.id, id, registration.status);

    Ok((StatusCode::CREATED, Json(registration)))
}

pub async fn list_registrations(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let details = load_event(&state, &id).await?;
    if !user.can_manage(&details.event.organizer_id) {
        return Err(AppError::Forbidden("Only the organizer can see registrations".into()));
    }

    Ok(Json(state.registration_repo.list_by_event(&id).await?))
}

pub async fn check_registration(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    load_event(&state, &id).await?;

    let registration = state.registration_repo.find_by_event_and_user(&id, &user.id).await?;

    Ok(Json(CheckRegistrationResponse {
        is_registered: registration.is_some(),
        registration_id: registration.as_ref().map(|r| r.id.clone()),
        status: registration.map(|r| r.status),
    }))
}

pub async fn attendance_report(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(build_event_report(&state, &user, &id).await?))
}
