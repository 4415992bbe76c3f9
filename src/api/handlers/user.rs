use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::{is_unique_violation, AppError};
use crate::api::dtos::requests::{
    ChangePasswordRequest, RegisterRequest, ReplaceProfileRequest, SetRoleRequest, UpdateProfileRequest,
};
use crate::api::dtos::responses::{DetailResponse, EventCountResponse, ProfileResponse, RegisterResponse};
use crate::api::extractors::{auth::AuthUser, json::AppJson, path::AppPath};
use crate::domain::models::user::{Account, CurrentUser, Role, User};
use crate::domain::services::auth_service::{hash_password, verify_password};
use std::sync::Arc;
use tracing::info;

const MIN_PASSWORD_LEN: usize = 8;
const USERNAME_TAKEN: &str = "A user with that username already exists.";

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    if !email.contains('@') {
        return Err(AppError::Validation("Enter a valid email address".into()));
    }
    Ok(())
}

fn validate_username(username: &str) -> Result<(), AppError> {
    if username.trim().is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    Ok(())
}

fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    if !user.is_admin() {
        return Err(AppError::Forbidden("Only administrators can do this".into()));
    }
    Ok(())
}

async fn profile_response(state: &AppState, account: Account) -> Result<ProfileResponse, AppError> {
    let event_count = state.registration_repo.count_by_user(&account.id).await?;
    let organized_count = state.event_repo.count_by_organizer(&account.id).await?;

    Ok(ProfileResponse {
        id: account.id,
        username: account.username,
        email: account.email,
        role: account.role,
        created_at: account.created_at,
        event_count,
        organized_count,
    })
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let username = payload.username.trim().to_string();
    validate_username(&username)?;
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    validate_password(&payload.password)?;
    validate_email(&payload.email)?;

    let role = match payload.role.as_deref() {
        None | Some("") => Role::Student,
        Some(raw) => match raw.parse::<Role>()? {
            Role::Admin => return Err(AppError::Validation("Cannot register as admin".into())),
            role => role,
        },
    };

    if state.user_repo.find_by_username(&username).await?.is_some() {
        return Err(AppError::Validation(USERNAME_TAKEN.into()));
    }

    let user = User::new(username, payload.email.trim().to_string(), hash_password(&payload.password)?);
    let account = state.user_repo.create(&user, role).await.map_err(|e| match e {
        AppError::Database(db) if is_unique_violation(&db) => AppError::Validation(USERNAME_TAKEN.into()),
        other => other,
    })?;

    info!("Registered user {} as {}", account.username, account.role);

    Ok((StatusCode::CREATED, Json(RegisterResponse {
        message: "User created successfully".into(),
        id: account.id,
        username: account.username,
        role: account.role,
    })))
}

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let account = state.user_repo.find_account(&user.id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    Ok(Json(profile_response(&state, account).await?))
}

async fn apply_identity(
    state: &AppState,
    current: &CurrentUser,
    username: String,
    email: String,
) -> Result<ProfileResponse, AppError> {
    let username = username.trim().to_string();
    validate_username(&username)?;
    validate_email(&email)?;

    if let Some(existing) = state.user_repo.find_by_username(&username).await?
        && existing.id != current.id {
        return Err(AppError::Validation(USERNAME_TAKEN.into()));
    }

    let account = state.user_repo.update_identity(&current.id, &username, &email).await
        .map_err(|e| match e {
            AppError::Database(db) if is_unique_violation(&db) => AppError::Validation(USERNAME_TAKEN.into()),
            other => other,
        })?;

    info!("Profile updated for user {}", account.id);
    profile_response(state, account).await
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let account = state.user_repo.find_account(&user.id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    let username = payload.username.unwrap_or(account.username);
    let email = payload.email.unwrap_or(account.email);

    Ok(Json(apply_identity(&state, &user, username, email).await?))
}

pub async fn replace_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    AppJson(payload): AppJson<ReplaceProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(apply_identity(&state, &user, payload.username, payload.email).await?))
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let stored = state.user_repo.find_by_id(&user.id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    if !verify_password(&payload.old_password, &stored.password_hash)? {
        return Err(AppError::Validation("Old password is incorrect".into()));
    }
    validate_password(&payload.new_password)?;

    state.user_repo.update_password(&user.id, &hash_password(&payload.new_password)?).await?;
    state.auth_service.revoke_all(&user.id).await?;

    info!("Password changed for user {}", user.id);

    Ok(Json(DetailResponse { detail: "Password updated successfully".into() }))
}

pub async fn my_event_count(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let event_count = state.registration_repo.count_by_user(&user.id).await?;
    Ok(Json(EventCountResponse { event_count }))
}

pub async fn cancel_registration(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    AppPath(registration_id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let registration = state.registration_repo.find_by_id(&registration_id).await?
        .ok_or(AppError::NotFound("Registration not found".into()))?;

    if registration.user_id != user.id {
        return Err(AppError::Forbidden("You can only cancel your own registrations".into()));
    }

    state.registration_repo.delete(&registration.id).await?;

    info!("User {} cancelled registration {}", user.id, registration.id);

    Ok(Json(DetailResponse { detail: "Registration cancelled successfully".into() }))
}

pub async fn set_role(
    State(state): State<Arc<AppState>>,
    AuthUser(admin): AuthUser,
    AppPath(user_id): AppPath<String>,
    AppJson(payload): AppJson<SetRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&admin)?;
    let role: Role = payload.role.parse()?;

    state.user_repo.find_by_id(&user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    let account = state.user_repo.set_role(&user_id, role).await?;

    info!("Admin {} set role of {} to {}", admin.id, account.id, role);

    Ok(Json(account))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AuthUser(admin): AuthUser,
    AppPath(user_id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&admin)?;

    if admin.id == user_id {
        return Err(AppError::Conflict("Administrators cannot delete their own account".into()));
    }

    state.user_repo.delete(&user_id).await?;

    info!("Admin {} deleted user {}", admin.id, user_id);

    Ok(StatusCode::NO_CONTENT)
}
