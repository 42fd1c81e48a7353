//! Axum extractor for authenticated requests.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::bearer::extract_bearer;
use super::errors::AuthError;
use super::state::HasAuthState;
use crate::db::User;

/// Core authentication logic: an ordered sequence of attempts over the
/// bearer credential. The access-token path runs first; if verification
/// fails the same credential is resolved as a refresh token. The final
/// error reflects the fallback's failure, not the first attempt's.
async fn authenticate_request<S>(parts: &Parts, state: &S) -> Result<User, AuthError>
where
    S: HasAuthState + Send + Sync,
{
    let token = extract_bearer(&parts.headers)?;

    // Attempt 1: signed access token
    if let Ok(user_id) = state.jwt().validate_token(&token) {
        let user = state
            .db()
            .users()
            .get_by_id(&user_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get user: {}", e);
                AuthError::DatabaseError
            })?;
        // A verified token whose subject is gone is a 404, not a reason
        // to try the refresh path.
        return user.ok_or(AuthError::UserNotFound);
    }

    // Attempt 2: opaque refresh token. Only currently valid tokens
    // (unrevoked, unexpired) resolve to a user.
    let user = state
        .db()
        .refresh_tokens()
        .user_for_token(&token)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve refresh token: {}", e);
            AuthError::DatabaseError
        })?;

    user.ok_or(AuthError::InvalidToken)
}

/// Extractor for endpoints that require authentication.
/// Unauthenticated requests are rejected before the handler runs.
pub struct ApiAuth(pub User);

impl<S> FromRequestParts<S> for ApiAuth
where
    S: HasAuthState + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authenticate_request(parts, state).await.map(ApiAuth)
    }
}
