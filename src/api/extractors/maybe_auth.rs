use axum::{
    extract::{FromRequestParts, FromRef},
    http::request::Parts,
};
use crate::state::AppState;
use crate::domain::models::user::CurrentUser;
use crate::error::AppError;
use super::auth::{bearer_token, resolve_caller};
use std::sync::Arc;
use tracing::{debug, Span};

pub struct MaybeAuthUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = match bearer_token(parts) {
            Some(token) => token.to_string(),
            None => return Ok(MaybeAuthUser(None)),
        };

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        // Expired or forged tokens fall back to anonymous access
        let user = resolve_caller(&app_state, &token).await?;
        match &user {
            Some(user) => {
                Span::current().record("user_id", &user.id);
            }
            None => debug!("MaybeAuth: token rejected, continuing as guest"),
        }

        Ok(MaybeAuthUser(user))
    }
}
