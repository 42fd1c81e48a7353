#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use chirpy::{ServerConfig, create_app, db::Database};
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &[u8] = b"test-jwt-secret-at-least-32-bytes!!";
pub const TEST_POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

/// Create a test app backed by an in-memory database.
pub async fn create_test_app() -> (Router, Database) {
    create_test_app_with_platform("dev").await
}

pub async fn create_test_app_with_platform(platform: &str) -> (Router, Database) {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db: db.clone(),
        jwt_secret: TEST_JWT_SECRET.to_vec(),
        jwt_issuer: "chirpy".to_string(),
        jwt_duration_secs: 600,
        refresh_token_duration_days: 60,
        platform: platform.to_string(),
        polka_key: TEST_POLKA_KEY.to_string(),
        app_dir: "./app".to_string(),
    };
    (create_app(&config), db)
}

/// Build a JSON request.
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a JSON request carrying a bearer token.
pub fn auth_json_request(
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a bodyless request carrying a bearer token.
pub fn bearer_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}

/// Create a user via the API and return the response body.
pub async fn create_user(app: &Router, email: &str, password: &str) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            serde_json::json!({ "email": email, "password": password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await
}

/// Log in via the API and return the response body (user fields plus
/// `token` and `refreshToken`).
pub async fn login(app: &Router, email: &str, password: &str) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/login",
            serde_json::json!({ "email": email, "password": password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    body_json(response).await
}

/// Create a user and log in, returning `(access_token, refresh_token)`.
pub async fn signup_and_login(app: &Router, email: &str, password: &str) -> (String, String) {
    create_user(app, email, password).await;
    let body = login(app, email, password).await;
    (
        body["token"].as_str().unwrap().to_string(),
        body["refreshToken"].as_str().unwrap().to_string(),
    )
}
