use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::requests::CreateCategoryRequest;
use crate::api::extractors::{auth::AuthUser, json::AppJson};
use std::sync::Arc;
use tracing::info;

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.category_repo.list().await?))
}

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    AppJson(payload): AppJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !user.is_admin() {
        return Err(AppError::Forbidden("Only administrators can create categories".into()));
    }

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Category name must not be empty".into()));
    }

    let category = state.category_repo.create(name).await?;

    info!("Category created: {} ({})", category.name, category.id);

    Ok((StatusCode::CREATED, Json(category)))
}
