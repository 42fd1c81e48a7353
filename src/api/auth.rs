//! Session API endpoints.
//!
//! - POST `/login` - Exchange credentials for an access/refresh token pair
//! - POST `/refresh` - Rotate a refresh token for a new pair
//! - POST `/revoke` - Revoke a refresh token

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ResultExt};
use super::users::UserResponse;
use crate::auth::{extract_bearer, verify_password};
use crate::db::Database;
use crate::session::SessionManager;

#[derive(Clone)]
pub struct AuthState {
    pub db: Database,
    pub session: SessionManager,
}

pub fn router(state: AuthState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/revoke", post(revoke))
        .with_state(state)
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    #[serde(flatten)]
    user: UserResponse,
    token: String,
    #[serde(rename = "refreshToken")]
    refresh_token: String,
}

#[derive(Serialize)]
struct TokenPairResponse {
    token: String,
    #[serde(rename = "refreshToken")]
    refresh_token: String,
}

async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("missing required fields"));
    }

    // Same message for unknown email and bad password
    let user = state
        .db
        .users()
        .get_by_email(&payload.email)
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized("invalid username or password"))?;

    if !verify_password(&payload.password, &user.hashed_password) {
        return Err(ApiError::unauthorized("invalid username or password"));
    }

    let pair = state.session.login(&user.id).await?;

    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            user: UserResponse::from(user),
            token: pair.access_token,
            refresh_token: pair.refresh_token,
        }),
    ))
}

async fn refresh(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = extract_bearer(&headers)?;

    let pair = state.session.refresh(&refresh_token).await?;

    Ok((
        StatusCode::OK,
        Json(TokenPairResponse {
            token: pair.access_token,
            refresh_token: pair.refresh_token,
        }),
    ))
}

async fn revoke(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = extract_bearer(&headers)?;

    state.session.revoke(&refresh_token).await?;

    Ok(StatusCode::NO_CONTENT)
}
