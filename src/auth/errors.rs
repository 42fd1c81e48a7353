//! Authentication error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Errors produced by the authentication path.
#[derive(Debug)]
pub enum AuthError {
    /// Missing or malformed Authorization header
    NotAuthenticated,
    /// Credential failed verification (expired, forged, revoked, unknown)
    InvalidToken,
    /// Token verified but the subject user no longer exists
    UserNotFound,
    /// Authenticated but not allowed to touch this resource
    Forbidden,
    /// Underlying store failure
    DatabaseError,
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::NotAuthenticated | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AuthError::NotAuthenticated => "Not authenticated",
            AuthError::InvalidToken => "Invalid or expired token",
            AuthError::UserNotFound => "User not found",
            AuthError::Forbidden => "Forbidden",
            AuthError::DatabaseError => "Database error",
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response()
    }
}
