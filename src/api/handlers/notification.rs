use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::responses::{MarkReadResponse, NotificationsResponse};
use crate::api::extractors::auth::AuthUser;
use crate::domain::services::notifications::project;
use std::sync::Arc;
use tracing::info;

pub async fn user_events(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let notifications: Vec<_> = state.registration_repo
        .list_upcoming_for_user(&user.id, now)
        .await?
        .into_iter()
        .map(|entry| project(entry, now))
        .collect();

    let unread_count = notifications.iter().filter(|n| n.unread).count();

    Ok(Json(NotificationsResponse { notifications, unread_count }))
}

pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.registration_repo.mark_all_read(&user.id).await?;

    info!("Marked {} notifications read for {}", updated, user.id);

    Ok(Json(MarkReadResponse { updated }))
}
