//! Integration tests for the backend REST client.

use carnet_core::api::ApiClient;
use carnet_core::models::{CategoryId, NoteDraft, NoteId, TaskDraft, TaskId};
use carnet_core::session::{MemoryPersistence, SessionGate, SessionState};
use carnet_core::Error;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_json() -> serde_json::Value {
    json!({"id": 1, "name": "Ada", "email": "ada@example.com"})
}

#[tokio::test]
async fn login_returns_credentials_that_sign_in_the_gate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({"email": "ada@example.com", "password": "secret1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "tok123", "user": user_json()})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&format!("{}/api", server.uri())).unwrap();
    let credentials = client.login("ada@example.com", "secret1").await.unwrap();
    assert_eq!(credentials.access_token, "tok123");

    let gate = SessionGate::new(MemoryPersistence::new());
    gate.restore().await;
    gate.sign_in(credentials.access_token, credentials.user)
        .await
        .unwrap();
    assert_eq!(gate.state(), SessionState::Authenticated);
}

#[tokio::test]
async fn login_rejects_short_password_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let error = client.login("ada@example.com", "123").await.unwrap_err();
    assert!(matches!(error, Error::Validation(_)));
}

#[tokio::test]
async fn login_failure_reports_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let error = client
        .login("ada@example.com", "secret1")
        .await
        .unwrap_err();
    assert_eq!(error.to_string(), "API error: Invalid credentials");
}

#[tokio::test]
async fn login_with_profile_missing_id_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"access_token": "tok", "user": {"name": "Ada", "email": "ada@example.com"}}),
        ))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let error = client
        .login("ada@example.com", "secret1")
        .await
        .unwrap_err();
    assert!(error.to_string().contains("user is unusable"));
}

#[tokio::test]
async fn qr_login_follows_scanned_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/qr-login/abc123"))
        .and(header("accept", "application/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "qr-token", "user": user_json()})),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let credentials = client
        .qr_login(&format!("{}/auth/qr-login/abc123", server.uri()))
        .await
        .unwrap();
    assert_eq!(credentials.access_token, "qr-token");
    assert_eq!(credentials.user.email, "ada@example.com");
}

#[tokio::test]
async fn qr_login_rejects_foreign_codes() {
    let client = ApiClient::new("https://api.example.com").unwrap();
    let error = client
        .qr_login("https://example.com/promo")
        .await
        .unwrap_err();
    assert!(matches!(error, Error::Validation(_)));
}

#[tokio::test]
async fn list_notes_sends_bearer_token_and_unwraps_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes"))
        .and(header("authorization", "Bearer tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": 1, "title": "Groceries", "content": "Milk",
                 "categories": [{"id": 2, "name": "Home", "color": "#FF5733"}]},
                {"id": 2, "title": "Ideas", "content": "Rust", "categories": []}
            ]
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let notes = client.list_notes("tok123").await.unwrap();
    assert_eq!(notes.len(), 2);
    assert!(notes[0].has_category(CategoryId(2)));
    assert_eq!(notes[1].id, NoteId(2));
}

#[tokio::test]
async fn unauthorized_response_maps_to_unauthorized_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let error = client.list_tasks("expired").await.unwrap_err();
    assert!(matches!(error, Error::Unauthorized));
}

#[tokio::test]
async fn create_note_posts_title_content_and_categories() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notes"))
        .and(body_json(
            json!({"title": "Groceries", "content": "Milk", "categories": [2, 3]}),
        ))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "Note created",
            "data": {"id": 9, "title": "Groceries", "content": "Milk"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let draft = NoteDraft::new("Groceries", "Milk").with_categories([CategoryId(2), CategoryId(3)]);
    let created = client.create_note("tok", &draft).await.unwrap();
    assert_eq!(created.message.as_deref(), Some("Note created"));
    assert_eq!(created.data.map(|note| note.id), Some(NoteId(9)));
}

#[tokio::test]
async fn create_task_drops_blank_subtasks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .and(body_json(json!({
            "description": "Pack",
            "is_completed": false,
            "note_id": 4,
            "subtasks": [{"description": "Socks", "is_completed": false}]
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let draft = TaskDraft::new("Pack")
        .with_note(Some(NoteId(4)))
        .with_subtasks(["Socks", "   "]);
    let created = client.create_task("tok", draft).await.unwrap();
    assert!(created.data.is_none());
}

#[tokio::test]
async fn toggle_and_delete_task_hit_expected_routes() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/tasks/5/toggle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Toggled"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/tasks/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let toggled = client.toggle_task("tok", TaskId(5)).await.unwrap();
    assert_eq!(toggled.message.as_deref(), Some("Toggled"));
    let deleted = client.delete_task("tok", TaskId(5)).await.unwrap();
    assert_eq!(deleted.message.as_deref(), Some("Deleted"));
}

#[tokio::test]
async fn server_error_surfaces_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let error = client.list_categories("tok").await.unwrap_err();
    assert_eq!(error.to_string(), "API error: boom (500)");
}
