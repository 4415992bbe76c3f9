use axum::extract::FromRequestParts;
use crate::error::AppError;

/// `axum::extract::Query` with rejections routed through `AppError`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
