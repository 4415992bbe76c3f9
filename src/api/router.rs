use axum::{
    body::Body,
    extract::Request,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{auth, category, event, health, notification, registration, report, user};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Users & auth
        .route("/api/users/login/", post(auth::login))
        .route("/api/users/token/refresh/", post(auth::refresh))
        .route("/api/users/logout/", post(auth::logout))
        .route("/api/users/register/", post(user::register))
        .route("/api/users/profile/", get(user::get_profile).put(user::replace_profile).patch(user::update_profile))
        .route("/api/users/change-password/", post(user::change_password))
        .route("/api/users/my-event-count/", get(user::my_event_count))
        .route("/api/users/cancel-registration/{id}/", delete(user::cancel_registration))
        .route("/api/users/{id}/role/", patch(user::set_role))
        .route("/api/users/{id}/", delete(user::delete_user))

        // Categories
        .route("/api/categories/", get(category::list_categories).post(category::create_category))

        // Events
        .route("/api/events/", get(event::list_events).post(event::create_event))
        .route("/api/events/{id}/", get(event::get_event).patch(event::update_event).delete(event::delete_event))
        .route("/api/events/{id}/join/", post(event::join_event))
        .route("/api/events/{id}/registrations/", get(event::list_registrations))
        .route("/api/events/{id}/check_registration/", get(event::check_registration))
        .route("/api/events/{id}/attendance_report/", get(event::attendance_report))

        // Registrations
        .route("/api/registrations/my_events/", get(registration::my_events))
        .route("/api/registrations/{id}/", get(registration::get_registration).patch(registration::update_registration))
        .route("/api/registrations/{id}/rate/", patch(registration::rate_registration))
        .route("/api/registrations/{id}/confirm_attendance/", post(registration::confirm_attendance))

        // Reports
        .route("/api/reports/organizer/event/{id}/", get(report::organizer_event_report))
        .route("/api/reports/organizer/all-events/", get(report::organizer_all_events))
        .route("/api/reports/admin/global/", get(report::admin_global))
        .route("/api/reports/admin/user-analytics/", get(report::admin_user_analytics))

        // Notifications
        .route("/api/notifications/user-events/", get(notification::user_events))
        .route("/api/notifications/mark-all-read/", post(notification::mark_all_read))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
