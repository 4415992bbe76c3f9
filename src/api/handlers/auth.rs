use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::requests::{LoginRequest, LogoutRequest, RefreshRequest};
use crate::api::dtos::responses::DetailResponse;
use crate::api::extractors::json::AppJson;
use crate::domain::models::auth::{AuthResponse, TokenPair, UserSummary};
use crate::domain::models::user::Account;
use crate::domain::services::auth_service::verify_password;
use std::sync::Arc;
use tracing::info;

fn auth_response(tokens: TokenPair, account: Account) -> AuthResponse {
    AuthResponse {
        access: tokens.access,
        refresh: tokens.refresh,
        user: UserSummary {
            id: account.id,
            username: account.username,
            role: account.role,
        },
    }
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_repo.find_by_username(&payload.username).await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    // Accounts created outside the API may lack a profile
    state.user_repo.ensure_profile(&user.id).await?;
    let account = state.user_repo.find_account(&user.id).await?
        .ok_or(AppError::Internal)?;

    let tokens = state.auth_service.login(&account).await?;

    info!("User logged in: {}", account.id);

    Ok(Json(auth_response(tokens, account)))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let redeemed = state.auth_service.redeem_refresh_token(&payload.refresh).await?;

    let account = state.user_repo.find_account(&redeemed.user_id).await?
        .ok_or(AppError::Unauthorized)?;

    let tokens = state.auth_service.rotate(&account, &redeemed).await?;

    info!("Token refreshed for user: {}", account.id);

    Ok(Json(auth_response(tokens, account)))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<LogoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(refresh) = payload.refresh {
        state.auth_service.logout(&refresh).await?;
    }

    info!("User logged out");

    Ok(Json(DetailResponse { detail: "Successfully logged out.".into() }))
}
