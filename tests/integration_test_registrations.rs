mod common;

use axum::http::StatusCode;
use common::TestApp;
use eventify::domain::models::user::Role;
use serde_json::json;

#[tokio::test]
async fn test_second_join_is_rejected() {
    let app = TestApp::new().await;
    let owner = app.create_user("olga", Role::Organizer).await;
    let student = app.create_user("sam", Role::Student).await;
    let event = app.create_event(&owner, "Hackathon", "2031-05-10T09:00:00Z", json!({})).await;
    let event_id = event["id"].as_str().unwrap();

    let (status, body) = app.join(&student, event_id).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "registered");
    assert_eq!(body["attended"], false);
    assert_eq!(body["user_id"], student.id.as_str());

    let (status, body) = app.join(&student, event_id).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ya estás inscrito.");

    let (status, _) = app.join(&student, "missing-event").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.post(&format!("/api/events/{}/join/", event_id), None, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_full_event_waitlists() {
    let app = TestApp::new().await;
    let owner = app.create_user("olga", Role::Organizer).await;
    let first = app.create_user("ana", Role::Student).await;
    let second = app.create_user("bea", Role::Student).await;
    let third = app.create_user("cris", Role::Student).await;
    let event = app.create_event(&owner, "Tiny seminar", "2031-05-10T09:00:00Z", json!({ "capacity": 1 })).await;
    let event_id = event["id"].as_str().unwrap();

    let (_, body) = app.join(&first, event_id).await;
    assert_eq!(body["status"], "registered");
    let (_, waitlisted) = app.join(&second, event_id).await;
    assert_eq!(waitlisted["status"], "waitlisted");

    let (_, body) = app.get(&format!("/api/events/{}/", event_id), None).await;
    assert_eq!(body["registered_count"], 1);

    // Capacity 0 does not bound the event
    let open = app.create_event(&owner, "Open house", "2031-05-11T09:00:00Z", json!({ "capacity": 0 })).await;
    let (_, body) = app.join(&third, open["id"].as_str().unwrap()).await;
    assert_eq!(body["status"], "registered");
}

#[tokio::test]
async fn test_check_and_list_registrations() {
    let app = TestApp::new().await;
    let owner = app.create_user("olga", Role::Organizer).await;
    let stranger = app.create_user("oscar", Role::Organizer).await;
    let student = app.create_user("sam", Role::Student).await;
    let event = app.create_event(&owner, "Career fair", "2031-05-10T09:00:00Z", json!({})).await;
    let event_id = event["id"].as_str().unwrap();
    let check_uri = format!("/api/events/{}/check_registration/", event_id);

    let (status, body) = app.get(&check_uri, Some(&student.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_registered"], false);
    assert!(body["registration_id"].is_null());

    let (_, joined) = app.join(&student, event_id).await;

    let (_, body) = app.get(&check_uri, Some(&student.token)).await;
    assert_eq!(body["is_registered"], true);
    assert_eq!(body["registration_id"], joined["id"]);
    assert_eq!(body["status"], "registered");

    let list_uri = format!("/api/events/{}/registrations/", event_id);
    let (status, _) = app.get(&list_uri, Some(&stranger.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get(&list_uri, Some(&student.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get(&list_uri, Some(&owner.token)).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["username"], "sam");
    assert_eq!(rows[0]["user_id"], student.id.as_str());
    assert!(rows[0]["registration_date"].as_str().is_some());
}

#[tokio::test]
async fn test_registration_access_and_status_changes() {
    let app = TestApp::new().await;
    let owner = app.create_user("olga", Role::Organizer).await;
    let student = app.create_user("sam", Role::Student).await;
    let peer = app.create_user("pia", Role::Student).await;
    let event = app.create_event(&owner, "Film club", "2031-05-10T19:00:00Z", json!({})).await;
    let (_, joined) = app.join(&student, event["id"].as_str().unwrap()).await;
    let uri = format!("/api/registrations/{}/", joined["id"].as_str().unwrap());

    let (status, _) = app.get(&uri, Some(&peer.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get(&uri, Some(&owner.token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/api/registrations/missing/", Some(&owner.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.patch(&uri, Some(&owner.token), json!({ "status": "pending" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.patch(&uri, Some(&owner.token), json!({ "status": "confirmed" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");

    // The registrant may only withdraw
    let (status, _) = app.patch(&uri, Some(&student.token), json!({ "status": "attended" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.patch(&uri, Some(&peer.token), json!({ "status": "cancelled" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.patch(&uri, Some(&student.token), json!({ "status": "cancelled" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    let (status, body) = app.patch(&uri, Some(&owner.token), json!({ "status": "attended" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "attended");
    assert_eq!(body["attended"], true);
}

#[tokio::test]
async fn test_rating_rules() {
    let app = TestApp::new().await;
    let owner = app.create_user("olga", Role::Organizer).await;
    let student = app.create_user("sam", Role::Student).await;
    let event = app.create_event(&owner, "Concert", "2031-05-10T19:00:00Z", json!({})).await;
    let (_, joined) = app.join(&student, event["id"].as_str().unwrap()).await;
    let uri = format!("/api/registrations/{}/rate/", joined["id"].as_str().unwrap());

    for bad in [json!(0), json!(6), json!(4.5), json!("5"), json!(null), json!(-1)] {
        let (status, body) = app.patch(&uri, Some(&student.token), json!({ "rating": bad })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "rating {} accepted", bad);
        assert_eq!(body["error"], "rating must be between 1 and 5");
    }
    let (status, _) = app.patch(&uri, Some(&student.token), json!({ "comment": "no rating" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.patch(&uri, Some(&owner.token), json!({ "rating": 5 })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    for good in 1..=5 {
        let (status, body) = app.patch(&uri, Some(&student.token), json!({ "rating": good, "comment": "Loved it" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rating"], good);
        assert_eq!(body["comment"], "Loved it");
    }
}

#[tokio::test]
async fn test_confirm_attendance_from_any_state() {
    let app = TestApp::new().await;
    let owner = app.create_user("olga", Role::Organizer).await;
    let student = app.create_user("sam", Role::Student).await;
    let peer = app.create_user("pia", Role::Student).await;
    let event = app.create_event(&owner, "Lab tour", "2031-05-10T10:00:00Z", json!({})).await;
    let (_, joined) = app.join(&student, event["id"].as_str().unwrap()).await;
    let id = joined["id"].as_str().unwrap();

    app.patch(&format!("/api/registrations/{}/", id), Some(&student.token), json!({ "status": "cancelled" })).await;

    let confirm_uri = format!("/api/registrations/{}/confirm_attendance/", id);
    let (status, _) = app.post(&confirm_uri, Some(&peer.token), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.post(&confirm_uri, Some(&student.token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "attended");
    assert_eq!(body["attended"], true);
}

#[tokio::test]
async fn test_cancel_registration_hard_deletes() {
    let app = TestApp::new().await;
    let owner = app.create_user("olga", Role::Organizer).await;
    let student = app.create_user("sam", Role::Student).await;
    let peer = app.create_user("pia", Role::Student).await;
    let event = app.create_event(&owner, "Debate", "2031-05-10T10:00:00Z", json!({})).await;
    let event_id = event["id"].as_str().unwrap();
    let (_, joined) = app.join(&student, event_id).await;
    let uri = format!("/api/users/cancel-registration/{}/", joined["id"].as_str().unwrap());

    let (status, _) = app.delete(&uri, Some(&peer.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.delete(&uri, Some(&student.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["detail"].as_str().is_some());

    let (status, _) = app.delete(&uri, Some(&student.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The slot is free again
    let (status, _) = app.join(&student, event_id).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_my_events_and_counts() {
    let app = TestApp::new().await;
    let owner = app.create_user("olga", Role::Organizer).await;
    let student = app.create_user("sam", Role::Student).await;
    let tech = {
        let (_, body) = app.get("/api/categories/", None).await;
        body.as_array().unwrap().iter().find(|c| c["name"] == "Tecnología").unwrap()["id"].as_i64().unwrap()
    };

    let late = app.create_event(&owner, "Late", "2031-09-01T10:00:00Z", json!({ "category": tech })).await;
    let early = app.create_event(&owner, "Early", "2031-02-01T10:00:00Z", json!({})).await;
    app.join(&student, late["id"].as_str().unwrap()).await;
    app.join(&student, early["id"].as_str().unwrap()).await;

    let (status, body) = app.get("/api/registrations/my_events/", Some(&student.token)).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["title"], "Early");
    assert_eq!(rows[1]["title"], "Late");
    assert_eq!(rows[1]["category_name"], "Tecnología");
    assert_eq!(rows[1]["status"], "registered");

    let (_, body) = app.get("/api/users/my-event-count/", Some(&student.token)).await;
    assert_eq!(body["event_count"], 2);

    let (_, body) = app.get("/api/users/profile/", Some(&owner.token)).await;
    assert_eq!(body["organized_count"], 2);
    assert_eq!(body["event_count"], 0);
}
