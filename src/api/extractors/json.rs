use axum::extract::FromRequest;
use axum::response::{IntoResponse, Response};
use crate::error::AppError;
use serde::Serialize;

/// `axum::Json` whose rejections surface as 400 with the usual error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl<T: Serialize> IntoResponse for AppJson<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}
