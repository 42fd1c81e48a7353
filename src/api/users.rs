//! User management API endpoints.
//!
//! - POST `/` - Create a user from email and password
//! - PUT `/` - Update the authenticated user's email and password

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{post, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ApiError, ResultExt};
use crate::auth::{ApiAuth, hash_password};
use crate::db::{Database, User};
use crate::impl_has_auth_state;
use crate::jwt::JwtConfig;

#[derive(Clone)]
pub struct UsersState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl_has_auth_state!(UsersState);

pub fn router(state: UsersState) -> Router {
    Router::new()
        .route("/", post(create_user))
        .route("/", put(update_user))
        .with_state(state)
}

#[derive(Deserialize)]
struct UserCredentialsRequest {
    email: String,
    password: String,
}

/// Public user fields; the password hash never leaves the server.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    #[serde(rename = "isChirpyRed")]
    pub is_chirpy_red: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            is_chirpy_red: user.is_chirpy_red,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

fn validate_credentials(payload: &UserCredentialsRequest) -> Result<(), ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("missing required fields"));
    }
    Ok(())
}

async fn create_user(
    State(state): State<UsersState>,
    Json(payload): Json<UserCredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_credentials(&payload)?;

    let hashed = hash_password(&payload.password)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))?;

    let user = state
        .db
        .users()
        .create(&payload.email, &hashed)
        .await
        .db_err("Failed to create user")?
        .ok_or_else(|| ApiError::conflict("email already taken"))?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

async fn update_user(
    State(state): State<UsersState>,
    ApiAuth(user): ApiAuth,
    Json(payload): Json<UserCredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_credentials(&payload)?;

    let hashed = hash_password(&payload.password)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))?;

    let updated = state
        .db
        .users()
        .update(&user.id, &payload.email, &hashed)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                ApiError::conflict("email already taken")
            }
            _ => ApiError::db_error("Failed to update user", e),
        })?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok((StatusCode::OK, Json(UserResponse::from(updated))))
}
