mod common;

use axum::http::StatusCode;
use common::TestApp;
use eventify::domain::models::user::Role;
use serde_json::{json, Value};

async fn category_id(app: &TestApp, name: &str) -> i64 {
    let (status, body) = app.get("/api/categories/", None).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array().unwrap().iter()
        .find(|c| c["name"] == name)
        .and_then(|c| c["id"].as_i64())
        .expect("seeded category missing")
}

fn titles(body: &Value) -> Vec<String> {
    body.as_array().unwrap().iter()
        .map(|e| e["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_categories_are_seeded_and_admin_managed() {
    let app = TestApp::new().await;
    let admin = app.create_user("root", Role::Admin).await;
    let organizer = app.create_user("olga", Role::Organizer).await;

    let (status, body) = app.get("/api/categories/", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body.as_array().unwrap().iter().map(|c| c["name"].as_str().unwrap()).collect();
    for expected in ["Académico", "Cultural", "Deportivo", "Social", "Tecnología", "Networking"] {
        assert!(names.contains(&expected), "missing {}", expected);
    }

    let (status, _) = app.post("/api/categories/", Some(&organizer.token), json!({ "name": "Música" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.post("/api/categories/", Some(&admin.token), json!({ "name": "Música" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Música");

    let (status, _) = app.post("/api/categories/", Some(&admin.token), json!({ "name": "Música" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app.post("/api/categories/", Some(&admin.token), json!({ "name": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_event_permissions_and_representation() {
    let app = TestApp::new().await;
    let organizer = app.create_user("olga", Role::Organizer).await;
    let student = app.create_user("sam", Role::Student).await;
    let cultural = category_id(&app, "Cultural").await;

    let payload = json!({
        "title": "Poetry slam",
        "description": "Open mic",
        "category": cultural,
        "location": "Aula Magna",
        "start_time": "2031-03-10T18:00:00Z",
        "end_time": "2031-03-10T21:00:00Z",
        "capacity": 40,
        "metadata": { "speakers": 3 }
    });

    let (status, _) = app.post("/api/events/", None, payload.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.post("/api/events/", Some(&student.token), payload.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.post("/api/events/", Some(&organizer.token), payload).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Poetry slam");
    assert_eq!(body["organizer_id"], organizer.id.as_str());
    assert_eq!(body["organizer_username"], "olga");
    assert_eq!(body["category_id"], cultural);
    assert_eq!(body["category_name"], "Cultural");
    assert_eq!(body["registered_count"], 0);
    assert_eq!(body["is_public"], true);
    assert_eq!(body["capacity"], 40);
    assert_eq!(body["metadata"]["speakers"], 3);

    let (status, _) = app.post("/api/events/", Some(&organizer.token), json!({
        "title": "Bad category", "start_time": "2031-03-10T18:00:00Z", "category": 99999
    })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/api/events/", Some(&organizer.token), json!({
        "title": "Negative", "start_time": "2031-03-10T18:00:00Z", "capacity": -2
    })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/api/events/", Some(&organizer.token), json!({
        "title": "", "start_time": "2031-03-10T18:00:00Z"
    })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/api/events/", Some(&organizer.token), json!({
        "title": "Bad time", "start_time": "next tuesday"
    })).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_end_before_start_is_rejected() {
    let app = TestApp::new().await;
    let organizer = app.create_user("olga", Role::Organizer).await;

    let (status, body) = app.post("/api/events/", Some(&organizer.token), json!({
        "title": "Backwards",
        "start_time": "2025-01-10T10:00:00Z",
        "end_time": "2025-01-10T09:00:00Z"
    })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_visibility_rules() {
    let app = TestApp::new().await;
    let admin = app.create_user("root", Role::Admin).await;
    let owner = app.create_user("olga", Role::Organizer).await;
    let other = app.create_user("oscar", Role::Organizer).await;
    let student = app.create_user("sam", Role::Student).await;

    app.create_event(&owner, "Public talk", "2031-01-05T10:00:00Z", json!({})).await;
    let private = app.create_event(&owner, "Staff meeting", "2031-01-06T10:00:00Z", json!({ "is_public": false })).await;
    app.create_event(&other, "Other secret", "2031-01-07T10:00:00Z", json!({ "is_public": false })).await;
    let private_uri = format!("/api/events/{}/", private["id"].as_str().unwrap());

    let (status, body) = app.get("/api/events/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Public talk"]);

    let (_, body) = app.get("/api/events/", Some(&student.token)).await;
    assert_eq!(titles(&body), vec!["Public talk"]);

    // Newest first
    let (_, body) = app.get("/api/events/", Some(&owner.token)).await;
    assert_eq!(titles(&body), vec!["Staff meeting", "Public talk"]);

    let (_, body) = app.get("/api/events/", Some(&admin.token)).await;
    assert_eq!(titles(&body), vec!["Other secret", "Staff meeting", "Public talk"]);

    // A bad token is treated as anonymous on public routes
    let (status, body) = app.get("/api/events/", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Public talk"]);

    let (status, _) = app.get(&private_uri, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get(&private_uri, Some(&other.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get(&private_uri, Some(&owner.token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&private_uri, Some(&admin.token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/api/events/does-not-exist/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.join(&student, private["id"].as_str().unwrap()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_filters() {
    let app = TestApp::new().await;
    let owner = app.create_user("olga", Role::Organizer).await;
    let other = app.create_user("oscar", Role::Organizer).await;
    let sports = category_id(&app, "Deportivo").await;
    let tech = category_id(&app, "Tecnología").await;

    app.create_event(&owner, "Futsal Cup", "2031-03-05T10:00:00Z", json!({ "category": sports, "location": "Gimnasio Norte" })).await;
    app.create_event(&owner, "Rust Workshop", "2031-04-10T10:00:00Z", json!({ "category": tech, "description": "Systems programming", "location": "Lab 2" })).await;
    app.create_event(&other, "Chess evening", "2031-03-20T19:00:00Z", json!({ "location": "Biblioteca" })).await;

    let (_, body) = app.get("/api/events/?search=rust", None).await;
    assert_eq!(titles(&body), vec!["Rust Workshop"]);
    let (_, body) = app.get("/api/events/?search=SYSTEMS", None).await;
    assert_eq!(titles(&body), vec!["Rust Workshop"]);

    let (_, body) = app.get("/api/events/?category=deportivo", None).await;
    assert_eq!(titles(&body), vec!["Futsal Cup"]);

    let (_, body) = app.get("/api/events/?location=norte", None).await;
    assert_eq!(titles(&body), vec!["Futsal Cup"]);

    let (_, body) = app.get("/api/events/?start_date=2031-03-01&end_date=2031-03-31", None).await;
    assert_eq!(titles(&body), vec!["Chess evening", "Futsal Cup"]);

    let (_, body) = app.get("/api/events/?end_date=2031-03-05", None).await;
    assert_eq!(titles(&body), vec!["Futsal Cup"]);

    let (status, _) = app.get("/api/events/?start_date=05-03-2031", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get("/api/events/?mine=true", Some(&other.token)).await;
    assert_eq!(titles(&body), vec!["Chess evening"]);
    let (_, body) = app.get("/api/events/?mine=true", None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_folds_accents_and_matches_wildcards_literally() {
    let app = TestApp::new().await;
    let owner = app.create_user("olga", Role::Organizer).await;
    let tech = category_id(&app, "Tecnología").await;

    app.create_event(&owner, "Éxito profesional", "2031-03-05T10:00:00Z", json!({ "location": "Salón Ñandú" })).await;
    app.create_event(&owner, "Descuento 100% real", "2031-03-06T10:00:00Z", json!({ "category": tech })).await;
    app.create_event(&owner, "Descuento 100 veces", "2031-03-07T10:00:00Z", json!({})).await;
    app.create_event(&owner, "snake_case night", "2031-03-08T10:00:00Z", json!({})).await;
    app.create_event(&owner, "snakeXcase night", "2031-03-09T10:00:00Z", json!({})).await;

    // ÉXITO
    let (_, body) = app.get("/api/events/?search=%C3%89XITO", None).await;
    assert_eq!(titles(&body), vec!["Éxito profesional"]);
    // ñandú
    let (_, body) = app.get("/api/events/?location=%C3%B1and%C3%BA", None).await;
    assert_eq!(titles(&body), vec!["Éxito profesional"]);

    let (_, body) = app.get("/api/events/?search=100%25", None).await;
    assert_eq!(titles(&body), vec!["Descuento 100% real"]);
    let (_, body) = app.get("/api/events/?search=snake_case", None).await;
    assert_eq!(titles(&body), vec!["snake_case night"]);

    // TECNOLOGÍA
    let (_, body) = app.get("/api/events/?category=TECNOLOG%C3%8DA", None).await;
    assert_eq!(titles(&body), vec!["Descuento 100% real"]);
    let (_, body) = app.get("/api/events/?category=Inexistente", None).await;
    assert!(body.as_array().unwrap().is_empty());

    // Keys follow edits
    let (_, body) = app.get("/api/events/?search=profesional", None).await;
    let id = body[0]["id"].as_str().unwrap().to_string();
    let (status, _) = app.patch(&format!("/api/events/{}/", id), Some(&owner.token), json!({ "title": "Reunión anual" })).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get("/api/events/?search=REUNI%C3%93N", None).await;
    assert_eq!(titles(&body), vec!["Reunión anual"]);
    let (_, body) = app.get("/api/events/?search=%C3%A9xito", None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_query_uses_error_body() {
    let app = TestApp::new().await;
    let admin = app.create_user("root", Role::Admin).await;

    let (status, body) = app.get("/api/events/?mine=maybe", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());

    let (status, body) = app.get("/api/reports/admin/global/?period=week&period=month", Some(&admin.token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_update_event() {
    let app = TestApp::new().await;
    let admin = app.create_user("root", Role::Admin).await;
    let owner = app.create_user("olga", Role::Organizer).await;
    let other = app.create_user("oscar", Role::Organizer).await;
    let social = category_id(&app, "Social").await;

    let event = app.create_event(&owner, "Mixer", "2031-06-01T18:00:00Z", json!({ "category": social, "location": "Patio" })).await;
    let uri = format!("/api/events/{}/", event["id"].as_str().unwrap());

    let (status, _) = app.patch(&uri, Some(&other.token), json!({ "title": "Hijacked" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.patch(&uri, Some(&owner.token), json!({ "title": "Spring Mixer", "category": null })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Spring Mixer");
    assert_eq!(body["category_id"], Value::Null);
    assert_eq!(body["category_name"], Value::Null);
    assert_eq!(body["location"], "Patio");
    assert_ne!(body["updated_at"], event["updated_at"]);

    // Validation runs on the merged record
    let (status, _) = app.patch(&uri, Some(&owner.token), json!({ "end_time": "2031-06-01T17:00:00Z" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.patch(&uri, Some(&admin.token), json!({ "capacity": 25, "is_public": false })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["capacity"], 25);
    assert_eq!(body["is_public"], false);
}

#[tokio::test]
async fn test_delete_event_removes_registrations() {
    let app = TestApp::new().await;
    let owner = app.create_user("olga", Role::Organizer).await;
    let other = app.create_user("oscar", Role::Organizer).await;
    let student = app.create_user("sam", Role::Student).await;

    let event = app.create_event(&owner, "Farewell", "2031-07-01T18:00:00Z", json!({})).await;
    let event_id = event["id"].as_str().unwrap();
    let (_, registration) = app.join(&student, event_id).await;

    let uri = format!("/api/events/{}/", event_id);
    let (status, _) = app.delete(&uri, Some(&other.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete(&uri, Some(&owner.token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&uri, Some(&owner.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get(&format!("/api/registrations/{}/", registration["id"].as_str().unwrap()), Some(&student.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/api/users/my-event-count/", Some(&student.token)).await;
    assert_eq!(body["event_count"], 0);
}
