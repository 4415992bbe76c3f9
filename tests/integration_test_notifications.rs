mod common;

use axum::http::StatusCode;
use chrono::{Duration, SecondsFormat, Utc};
use common::TestApp;
use eventify::domain::models::user::Role;
use serde_json::json;

fn from_now(offset: Duration) -> String {
    (Utc::now() + offset).to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[tokio::test]
async fn test_user_events_lists_upcoming_registrations() {
    let app = TestApp::new().await;
    let owner = app.create_user("olga", Role::Organizer).await;
    let student = app.create_user("sam", Role::Student).await;

    let soon_start = Utc::now() + Duration::minutes(30);
    let soon = app.create_event(&owner, "Soon", &soon_start.to_rfc3339_opts(SecondsFormat::Secs, true), json!({})).await;
    let this_week = app.create_event(&owner, "This week", &from_now(Duration::days(3)), json!({})).await;
    let far = app.create_event(&owner, "Far", &from_now(Duration::days(40)), json!({})).await;
    let past = app.create_event(&owner, "Past", &from_now(Duration::days(-2)), json!({})).await;
    let dropped = app.create_event(&owner, "Dropped", &from_now(Duration::days(2)), json!({})).await;

    for event in [&soon, &this_week, &far, &past] {
        let (status, _) = app.join(&student, event["id"].as_str().unwrap()).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (_, cancelled) = app.join(&student, dropped["id"].as_str().unwrap()).await;
    app.patch(
        &format!("/api/registrations/{}/", cancelled["id"].as_str().unwrap()),
        Some(&student.token),
        json!({ "status": "cancelled" }),
    ).await;

    let (status, _) = app.get("/api/notifications/user-events/", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/api/notifications/user-events/", Some(&student.token)).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["notifications"].as_array().unwrap();
    let titles: Vec<_> = items.iter().map(|n| n["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Soon", "This week", "Far"]);
    assert_eq!(body["unread_count"], 3);

    // "Soon" may fall on tomorrow when the test runs just before midnight UTC
    let starts_today = soon_start.date_naive() == Utc::now().date_naive();
    assert_eq!(items[0]["is_today"], starts_today);
    assert_eq!(items[0]["is_upcoming"], !starts_today);
    assert_eq!(items[1]["is_today"], false);
    assert_eq!(items[1]["is_upcoming"], true);
    assert_eq!(items[2]["is_upcoming"], false);
    assert_eq!(items[2]["unread"], true);
    assert_eq!(items[1]["event_id"], this_week["id"]);
}

#[tokio::test]
async fn test_mark_all_read() {
    let app = TestApp::new().await;
    let owner = app.create_user("olga", Role::Organizer).await;
    let student = app.create_user("sam", Role::Student).await;
    let peer = app.create_user("pia", Role::Student).await;

    for (title, days) in [("One", 1), ("Two", 2)] {
        let event = app.create_event(&owner, title, &from_now(Duration::days(days)), json!({})).await;
        app.join(&student, event["id"].as_str().unwrap()).await;
        app.join(&peer, event["id"].as_str().unwrap()).await;
    }

    let (status, body) = app.post("/api/notifications/mark-all-read/", Some(&student.token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 2);

    let (_, body) = app.get("/api/notifications/user-events/", Some(&student.token)).await;
    assert_eq!(body["unread_count"], 0);
    assert_eq!(body["notifications"].as_array().unwrap().len(), 2);

    // Already read rows are left alone
    let (_, body) = app.post("/api/notifications/mark-all-read/", Some(&student.token), json!({})).await;
    assert_eq!(body["updated"], 0);

    let (_, body) = app.get("/api/notifications/user-events/", Some(&peer.token)).await;
    assert_eq!(body["unread_count"], 2);
}
