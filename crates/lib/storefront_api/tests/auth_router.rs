//! Router-level auth tests. The pool is lazy and never connected: every
//! request here is answered before the store would be consulted.

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use axum::http::{Request, StatusCode};
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;
use storefront_api::{AppState, config::ApiConfig};
use storefront_core::auth::jwt::TokenCodec;
use tower::ServiceExt;

const SECRET: &str = "router-test-secret";

fn app() -> (Router, AppState) {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost:5432/storefront_unused")
        .expect("lazy pool");
    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        pg_connection_url: "postgres://localhost:5432/storefront_unused".into(),
        jwt_secret: SECRET.into(),
        jwt_algorithm: "HS256".into(),
        access_token_ttl_minutes: 60,
        bcrypt_cost: 4,
    };
    let state = AppState::new(pool, config).expect("state");
    (storefront_api::router(state.clone()), state)
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Option<String>, serde_json::Value) {
    let resp = app.oneshot(req).await.expect("request");
    let status = resp.status();
    let challenge = resp
        .headers()
        .get(WWW_AUTHENTICATE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).expect("parse JSON")
    };
    (status, challenge, json)
}

fn get_me(authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/users/me");
    if let Some(value) = authorization {
        builder = builder.header(AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

fn assert_rejected(status: StatusCode, challenge: Option<String>, json: &serde_json::Value) {
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(challenge.as_deref(), Some("Bearer"));
    assert_eq!(json["error"], "unauthorized");
    assert_eq!(json["message"], "Could not validate credentials");
}

#[tokio::test]
async fn root_says_hello() {
    let (app, _) = app();
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, _, json) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({"message": "Hello World"}));
}

#[tokio::test]
async fn missing_header_is_rejected() {
    let (app, _) = app();
    let (status, challenge, json) = send(app, get_me(None)).await;
    assert_rejected(status, challenge, &json);
}

#[tokio::test]
async fn non_bearer_scheme_is_rejected() {
    let (app, _) = app();
    let (status, challenge, json) = send(app, get_me(Some("Basic YWxpY2U6czNjcmV0IQ=="))).await;
    assert_rejected(status, challenge, &json);
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let (app, _) = app();
    let (status, challenge, json) = send(app, get_me(Some("Bearer not.a.token"))).await;
    assert_rejected(status, challenge, &json);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let (app, state) = app();
    let token = state
        .codec
        .issue("alice@example.com", Duration::minutes(-1))
        .unwrap();
    let (status, challenge, json) = send(app, get_me(Some(&format!("Bearer {token}")))).await;
    assert_rejected(status, challenge, &json);
}

#[tokio::test]
async fn token_from_another_key_is_rejected() {
    let (app, _) = app();
    let token = TokenCodec::hs256(b"some-other-secret")
        .unwrap()
        .issue("alice@example.com", Duration::minutes(5))
        .unwrap();
    let (status, challenge, json) = send(app, get_me(Some(&format!("Bearer {token}")))).await;
    assert_rejected(status, challenge, &json);
}

#[tokio::test]
async fn item_creation_requires_auth() {
    let (app, _) = app();
    let req = Request::builder()
        .method("POST")
        .uri("/items")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"name":"Lamp","description":"A desk lamp","price":10.0}"#,
        ))
        .unwrap();
    let (status, challenge, json) = send(app, req).await;
    assert_rejected(status, challenge, &json);
}

#[tokio::test]
async fn oversized_password_registration_is_bad_request() {
    let (app, _) = app();
    let body = serde_json::json!({
        "name": "alice",
        "email": "alice@example.com",
        "password": "p".repeat(73),
    });
    let req = Request::builder()
        .method("POST")
        .uri("/users")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, challenge, json) = send(app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(challenge.is_none());
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn invalid_registration_fields_are_bad_request() {
    let (app, _) = app();
    let body = serde_json::json!({
        "name": "al",
        "email": "not-an-email",
        "password": "s3cret!",
    });
    let req = Request::builder()
        .method("POST")
        .uri("/users")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, _, json) = send(app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn oversized_password_login_is_unauthorized() {
    let (app, _) = app();
    let req = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!(
            "username=alice%40example.com&password={}",
            "p".repeat(100)
        )))
        .unwrap();
    let (status, challenge, json) = send(app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(challenge.as_deref(), Some("Bearer"));
    assert_eq!(json["message"], "Incorrect email or password");
}

#[tokio::test]
async fn malformed_login_form_is_json_bad_request() {
    let (app, _) = app();
    let req = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=alice%40example.com"))
        .unwrap();
    let (status, _, json) = send(app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert!(json["message"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn malformed_registration_body_is_json_bad_request() {
    let (app, _) = app();
    for (content_type, body) in [
        ("application/json", r#"{"name": "alice", "email": "alice@example.com"}"#),
        ("application/json", "{not json"),
        ("text/plain", r#"{"name": "alice"}"#),
    ] {
        let req = Request::builder()
            .method("POST")
            .uri("/users")
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();
        let (status, _, json) = send(app.clone(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
        assert_eq!(json["error"], "validation_error");
        assert!(json["message"].is_string());
    }
}
