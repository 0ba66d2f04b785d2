//! End-to-end flow against a real PostgreSQL.
//!
//! Runs only when `DATABASE_URL` points at a database the test may migrate.

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use storefront_api::{AppState, config::ApiConfig};
use tower::ServiceExt;

async fn app() -> Option<Router> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping");
        return None;
    };
    let pool = sqlx::PgPool::connect(&url).await.expect("connect to PG");
    storefront_api::migrate(&pool).await.expect("migrate");

    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        pg_connection_url: url,
        jwt_secret: "flow-test-secret".into(),
        jwt_algorithm: "HS256".into(),
        access_token_ttl_minutes: 60,
        bcrypt_cost: 4,
    };
    Some(storefront_api::router(
        AppState::new(pool, config).expect("state"),
    ))
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn json_req(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn bare_req(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn login_req(email: &str, password: &str) -> Request<Body> {
    let email = email.replace('@', "%40");
    Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={email}&password={password}")))
        .unwrap()
}

#[tokio::test]
async fn register_login_purchase_flow() {
    let Some(app) = app().await else { return };
    let tag = chrono::Utc::now().timestamp_micros() % 100_000_000;
    let alice_email = format!("alice{tag}@example.com");
    let bob_email = format!("bob{tag}@example.com");

    // Register two users.
    let (status, alice) = call(
        &app,
        json_req(
            "POST",
            "/users",
            None,
            json!({"name": format!("alice{tag}"), "email": alice_email, "password": "s3cret!"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(alice.get("password").is_none());
    assert!(alice.get("password_hash").is_none());
    let alice_id = alice["id"].as_i64().unwrap();

    let (status, bob) = call(
        &app,
        json_req(
            "POST",
            "/users",
            None,
            json!({"name": format!("bob{tag}"), "email": bob_email, "password": "hunter2"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let bob_id = bob["id"].as_i64().unwrap();

    // Duplicate email is refused.
    let (status, json) = call(
        &app,
        json_req(
            "POST",
            "/users",
            None,
            json!({"name": format!("carol{tag}"), "email": alice_email, "password": "x"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Email already exists");

    // Wrong password and unknown user look the same.
    let (s1, j1) = call(&app, login_req(&alice_email, "wrong")).await;
    let (s2, j2) = call(&app, login_req(&format!("nobody{tag}@example.com"), "s3cret!")).await;
    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!((s1, &j1), (s2, &j2));

    // Login and resolve.
    let (status, json) = call(&app, login_req(&alice_email, "s3cret!")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["token_type"], "bearer");
    let token = json["access_token"].as_str().unwrap().to_string();

    let (status, me) = call(&app, bare_req("GET", "/users/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"].as_i64(), Some(alice_id));
    assert_eq!(me["items_bought"], json!([]));

    // Create an item and buy it.
    let (status, item) = call(
        &app,
        json_req(
            "POST",
            "/items",
            Some(&token),
            json!({"name": format!("lamp{tag}"), "description": "A desk lamp", "price": 19.99}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let item_id = item["id"].as_i64().unwrap();

    let uri = format!("/users/{alice_id}/{item_id}");
    let (status, account) = call(&app, bare_req("PUT", &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account["items_bought"][0]["id"].as_i64(), Some(item_id));

    let (status, json) = call(&app, bare_req("PUT", &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "User already owns this item");

    let (status, owners) = call(
        &app,
        bare_req("GET", &format!("/items/show_owner/{item_id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(owners[0]["email"], alice_email.as_str());

    let (status, json) = call(&app, bare_req("GET", "/items/price_avg", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["price_avg"].as_f64().unwrap() > 0.0);

    // Alice cannot act for Bob.
    let (status, _) = call(
        &app,
        bare_req("DELETE", &format!("/users/{bob_id}"), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Give the item back, then clean up.
    let (status, json) = call(&app, bare_req("DELETE", &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["message"],
        format!("Item 'lamp{tag}' was removed from user 'alice{tag}'")
    );

    let (status, _) = call(
        &app,
        bare_req("DELETE", &format!("/items/{item_id}"), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = call(
        &app,
        bare_req("DELETE", &format!("/users/{alice_id}"), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], format!("User 'alice{tag}' was deleted"));

    // The token names a subject that no longer exists.
    let (status, _) = call(&app, bare_req("GET", "/users/me", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let bob_token = {
        let (_, json) = call(&app, login_req(&bob_email, "hunter2")).await;
        json["access_token"].as_str().unwrap().to_string()
    };
    let (status, _) = call(
        &app,
        bare_req("DELETE", &format!("/users/{bob_id}"), Some(&bob_token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
