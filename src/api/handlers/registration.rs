use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::requests::{RateRequest, UpdateRegistrationRequest};
use crate::api::extractors::{auth::AuthUser, json::AppJson, path::AppPath};
use crate::domain::models::registration::{parse_rating, Registration, RegistrationStatus};
use crate::domain::models::user::CurrentUser;
use std::sync::Arc;
use tracing::info;

/// How the caller relates to a registration.
struct Access {
    registrant: bool,
    manager: bool,
}

async fn load_with_access(
    state: &AppState,
    user: &CurrentUser,
    id: &str,
) -> Result<(Registration, Access), AppError> {
    let registration = state.registration_repo.find_by_id(id).await?
        .ok_or(AppError::NotFound("Registration not found".into()))?;

    let event = state.event_repo.find_by_id(&registration.event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    let access = Access {
        registrant: registration.user_id == user.id,
        manager: user.can_manage(&event.event.organizer_id),
    };
    Ok((registration, access))
}

pub async fn get_registration(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let (registration, access) = load_with_access(&state, &user, &id).await?;
    if !access.registrant && !access.manager {
        return Err(AppError::Forbidden("You do not have access to this registration".into()));
    }
    Ok(Json(registration))
}

pub async fn update_registration(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<String>,
    AppJson(payload): AppJson<UpdateRegistrationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status = payload.status.as_deref()
        .map(str::parse::<RegistrationStatus>)
        .transpose()?;

    let (mut registration, access) = load_with_access(&state, &user, &id).await?;

    if access.manager {
        if let Some(status) = status {
            registration.set_status(status);
        }
        if let Some(attended) = payload.attended {
            registration.attended = attended;
            registration.updated_at = Utc::now();
        }
    } else if access.registrant {
        // Registrants may only withdraw
        if status != Some(RegistrationStatus::Cancelled) || payload.attended.is_some() {
            return Err(AppError::Forbidden("You can only cancel your own registration".into()));
        }
        registration.set_status(RegistrationStatus::Cancelled);
    } else {
        return Err(AppError::Forbidden("You do not have access to this registration".into()));
    }

    let updated = state.registration_repo.update(&registration).await?;

    info!("Registration {} updated by {} (status {})", updated.id, user.id, updated.status);

    Ok(Json(updated))
}

pub async fn rate_registration(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<String>,
    AppJson(payload): AppJson<RateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (mut registration, access) = load_with_access(&state, &user, &id).await?;
    if !access.registrant {
        return Err(AppError::Forbidden("Only the registrant can rate this event".into()));
    }

    let rating = parse_rating(&payload.rating)?;
    registration.rate(rating, payload.comment)?;

    let updated = state.registration_repo.update(&registration).await?;

    info!("Registration {} rated {} by {}", updated.id, rating, user.id);

    Ok(Json(updated))
}

pub async fn confirm_attendance(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let (mut registration, access) = load_with_access(&state, &user, &id).await?;
    if !access.registrant && !access.manager {
        return Err(AppError::Forbidden("You do not have access to this registration".into()));
    }

    registration.confirm_attendance();
    let updated = state.registration_repo.update(&registration).await?;

    info!("Attendance confirmed for registration {} by {}", updated.id, user.id);

    Ok(Json(updated))
}

pub async fn my_events(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.registration_repo.list_by_user(&user.id).await?))
}
