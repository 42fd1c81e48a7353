//! Tests for login, the authenticated-request gate, refresh rotation, and
//! revocation.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::*;
use tower::ServiceExt;

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_returns_token_pair_and_public_fields() {
    let (app, _db) = create_test_app().await;
    create_user(&app, "alice@example.com", "pw123").await;

    let body = login(&app, "alice@example.com", "pw123").await;

    assert_eq!(body["email"], "alice@example.com");
    assert!(body["token"].as_str().is_some());
    assert!(body["refreshToken"].as_str().is_some());
    assert_eq!(body["isChirpyRed"], false);
    assert!(body.get("hashedPassword").is_none());
    assert!(body.get("hashed_password").is_none());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let (app, _db) = create_test_app().await;
    create_user(&app, "alice@example.com", "pw123").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/login",
            serde_json::json!({ "email": "alice@example.com", "password": "wrong" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_unknown_email_same_error() {
    let (app, _db) = create_test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/login",
            serde_json::json!({ "email": "ghost@example.com", "password": "pw123" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid username or password");
}

// =============================================================================
// Authenticated-request gate
// =============================================================================

#[tokio::test]
async fn test_access_token_authenticates_protected_endpoint() {
    let (app, _db) = create_test_app().await;
    create_user(&app, "alice@example.com", "pw123").await;
    let (access, _refresh) = signup_and_login(&app, "bob@example.com", "pw456").await;

    let response = app
        .clone()
        .oneshot(auth_json_request(
            "POST",
            "/api/chirps",
            &access,
            serde_json::json!({ "body": "hello from bob" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;

    // The chirp is attributed to the token's subject
    let bob = login(&app, "bob@example.com", "pw456").await;
    assert_eq!(body["userId"], bob["id"]);
}

#[tokio::test]
async fn test_no_authorization_header_is_401_not_500() {
    let (app, _db) = create_test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/chirps",
            serde_json::json!({ "body": "anonymous chirp" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_authorization_header_rejected() {
    let (app, _db) = create_test_app().await;

    for auth_value in ["Bearer", "Basic abc", "bearer abc"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chirps")
                    .header("content-type", "application/json")
                    .header("authorization", auth_value)
                    .body(Body::from(
                        serde_json::json!({ "body": "hi" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "header {:?} should be rejected",
            auth_value
        );
    }
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let (app, _db) = create_test_app().await;

    let response = app
        .clone()
        .oneshot(auth_json_request(
            "POST",
            "/api/chirps",
            "not-a-real-token",
            serde_json::json!({ "body": "hi" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_rejected() {
    let (app, _db) = create_test_app().await;
    signup_and_login(&app, "alice@example.com", "pw123").await;

    let forged = chirpy::jwt::JwtConfig::new(b"some-other-secret-32-bytes-long!!", "chirpy", 600)
        .make_token("some-user-id")
        .unwrap();

    let response = app
        .clone()
        .oneshot(auth_json_request(
            "POST",
            "/api/chirps",
            &forged,
            serde_json::json!({ "body": "forged" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_fallback_authenticates() {
    let (app, _db) = create_test_app().await;
    let (_access, refresh) = signup_and_login(&app, "alice@example.com", "pw123").await;

    // The bearer credential is not a valid JWT; the authenticator falls
    // back to resolving it as a refresh token.
    let response = app
        .clone()
        .oneshot(auth_json_request(
            "POST",
            "/api/chirps",
            &refresh,
            serde_json::json!({ "body": "via refresh token" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
}

// =============================================================================
// Refresh rotation
// =============================================================================

#[tokio::test]
async fn test_refresh_returns_new_pair() {
    let (app, _db) = create_test_app().await;
    let (_access, refresh) = signup_and_login(&app, "alice@example.com", "pw123").await;

    let response = app
        .clone()
        .oneshot(bearer_request("POST", "/api/refresh", &refresh))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["token"].as_str().is_some());
    let rotated = body["refreshToken"].as_str().unwrap();
    assert_ne!(rotated, refresh);
}

#[tokio::test]
async fn test_original_refresh_token_is_single_use() {
    let (app, _db) = create_test_app().await;
    let (_access, refresh) = signup_and_login(&app, "alice@example.com", "pw123").await;

    let response = app
        .clone()
        .oneshot(bearer_request("POST", "/api/refresh", &refresh))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let rotated = body["refreshToken"].as_str().unwrap().to_string();

    // Redeeming the original token again fails
    let response = app
        .clone()
        .oneshot(bearer_request("POST", "/api/refresh", &refresh))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The successor still works
    let response = app
        .clone()
        .oneshot(bearer_request("POST", "/api/refresh", &rotated))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_with_unknown_token() {
    let (app, _db) = create_test_app().await;

    let response = app
        .clone()
        .oneshot(bearer_request("POST", "/api/refresh", "no-such-token"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_with_expired_token() {
    let (app, db) = create_test_app().await;
    let (_access, refresh) = signup_and_login(&app, "alice@example.com", "pw123").await;

    sqlx::query(
        "UPDATE refresh_tokens SET expires_at = datetime('now', '-1 hour') WHERE token = ?",
    )
    .bind(&refresh)
    .execute(db.pool())
    .await
    .unwrap();

    let response = app
        .clone()
        .oneshot(bearer_request("POST", "/api/refresh", &refresh))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_access_token_is_not_a_refresh_token() {
    let (app, _db) = create_test_app().await;
    let (access, _refresh) = signup_and_login(&app, "alice@example.com", "pw123").await;

    let response = app
        .clone()
        .oneshot(bearer_request("POST", "/api/refresh", &access))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Revocation
// =============================================================================

#[tokio::test]
async fn test_revoke_then_refresh_fails() {
    let (app, _db) = create_test_app().await;
    let (_access, refresh) = signup_and_login(&app, "alice@example.com", "pw123").await;

    let response = app
        .clone()
        .oneshot(bearer_request("POST", "/api/revoke", &refresh))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(bearer_request("POST", "/api/refresh", &refresh))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_revoked_token_no_longer_authenticates() {
    let (app, _db) = create_test_app().await;
    let (_access, refresh) = signup_and_login(&app, "alice@example.com", "pw123").await;

    app.clone()
        .oneshot(bearer_request("POST", "/api/revoke", &refresh))
        .await
        .unwrap();

    // Re-authentication fallback with the revoked token fails
    let response = app
        .clone()
        .oneshot(auth_json_request(
            "POST",
            "/api/chirps",
            &refresh,
            serde_json::json!({ "body": "should not post" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_revoke_unknown_token_is_not_found() {
    let (app, _db) = create_test_app().await;

    let response = app
        .clone()
        .oneshot(bearer_request("POST", "/api/revoke", "no-such-token"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_revoke_twice_is_not_found() {
    let (app, _db) = create_test_app().await;
    let (_access, refresh) = signup_and_login(&app, "alice@example.com", "pw123").await;

    let response = app
        .clone()
        .oneshot(bearer_request("POST", "/api/revoke", &refresh))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(bearer_request("POST", "/api/revoke", &refresh))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
