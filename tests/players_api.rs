//! End-to-end scenario against the full router with an in-memory store.
//!
//! Walks one player through their lifecycle: admin creates a record with
//! defaulted statistics, the public reads it back through a URL-encoded
//! path, an unauthenticated write bounces, an admin partial update lands
//! without disturbing the statistics.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use pavilion::http::{router, AdminAuth, AdminClaims, AppState};
use pavilion::links::LinksService;
use pavilion::players::PlayerService;
use pavilion::store::MemoryStore;

const SECRET: &str = "integration-secret";

fn app() -> Router {
    let state = AppState {
        players: Arc::new(PlayerService::new(Arc::new(MemoryStore::new("contactId")))),
        links: Arc::new(LinksService::new(Arc::new(MemoryStore::new("id")))),
        auth: Arc::new(AdminAuth::new(SECRET)),
    };
    router(state, &[])
}

fn admin_token() -> String {
    let claims = AdminClaims {
        sub: "admin-1".to_string(),
        role: "admin".to_string(),
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("encode token")
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("oneshot");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

#[tokio::test]
async fn test_player_lifecycle_over_http() {
    let app = app();
    let admin = admin_token();

    // Admin creates the player; statistics default in full.
    let (status, body) = send(
        &app,
        "POST",
        "/players",
        Some(&admin),
        Some(json!({"contactId": "+911234567890", "displayName": "Rahul"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["battingStats"]["matches"], json!(0));
    assert_eq!(body["data"]["bowlingStats"]["best"], json!("0/0"));
    let created = body["data"].clone();

    // Public read through the URL-encoded contact id returns the same
    // payload.
    let (status, body) = send(&app, "GET", "/players/%2B911234567890", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], created);

    // Unauthenticated write bounces without touching the record.
    let (status, _) = send(
        &app,
        "PATCH",
        "/players/%2B911234567890",
        None,
        Some(json!({"displayName": "Rahul K"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = send(&app, "GET", "/players/%2B911234567890", None, None).await;
    assert_eq!(body["data"]["displayName"], json!("Rahul"));

    // Admin partial update lands; statistics stay untouched.
    let (status, body) = send(
        &app,
        "PATCH",
        "/players/%2B911234567890",
        Some(&admin),
        Some(json!({"displayName": "Rahul K"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["displayName"], json!("Rahul K"));
    assert_eq!(body["data"]["battingStats"], created["battingStats"]);
    assert_eq!(body["data"]["bowlingStats"], created["bowlingStats"]);
    assert_eq!(body["data"]["recordId"], created["recordId"]);
    assert_eq!(body["data"]["createdAt"], created["createdAt"]);
}
