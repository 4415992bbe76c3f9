use axum::{
    extract::{FromRequestParts, FromRef},
    http::{header::AUTHORIZATION, request::Parts},
};
use crate::state::AppState;
use crate::domain::models::user::CurrentUser;
use crate::error::AppError;
use std::sync::Arc;
use tracing::Span;

pub struct AuthUser(pub CurrentUser);

/// The token of an `Authorization: Bearer <token>` header, if any.
pub(crate) fn bearer_token(parts: &Parts) -> Option<&str> {
    parts.headers.get(AUTHORIZATION)?
        .to_str().ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Verifies the access token and loads the caller with the role currently
/// stored in its profile. `None` when the token is invalid or the user is gone.
pub(crate) async fn resolve_caller(app_state: &AppState, token: &str) -> Result<Option<CurrentUser>, AppError> {
    let claims = match app_state.auth_service.verify_access_token(token) {
        Ok(claims) => claims,
        Err(_) => return Ok(None),
    };

    let account = app_state.user_repo.find_account(&claims.sub).await?;
    Ok(account.map(CurrentUser::from))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Forbidden("Authentication credentials were not provided.".into()))?
            .to_string();

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let user = resolve_caller(&app_state, &token).await?
            .ok_or_else(|| AppError::Forbidden("Given token not valid for any user".into()))?;

        Span::current().record("user_id", &user.id);

        Ok(AuthUser(user))
    }
}
