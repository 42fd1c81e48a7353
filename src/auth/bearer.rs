//! Authorization header parsing.
//!
//! Credentials arrive as `Authorization: <Scheme> <token>`. Access and
//! refresh tokens use the `Bearer` scheme; the webhook caller presents
//! `ApiKey`. The form is exact: one scheme keyword, one space, one token.

use axum::http::{HeaderMap, header::AUTHORIZATION};

use super::errors::AuthError;

const BEARER_SCHEME: &str = "Bearer";
const API_KEY_SCHEME: &str = "ApiKey";

fn extract_with_scheme(headers: &HeaderMap, scheme: &str) -> Result<String, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::NotAuthenticated)?
        .to_str()
        .map_err(|_| AuthError::NotAuthenticated)?;

    let mut parts = header.splitn(2, ' ');
    if parts.next() != Some(scheme) {
        return Err(AuthError::NotAuthenticated);
    }
    match parts.next() {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(AuthError::NotAuthenticated),
    }
}

/// Extract a bearer token from the Authorization header.
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, AuthError> {
    extract_with_scheme(headers, BEARER_SCHEME)
}

/// Extract an API key from the Authorization header (webhook caller).
pub fn extract_api_key(headers: &HeaderMap) -> Result<String, AuthError> {
    extract_with_scheme(headers, API_KEY_SCHEME)
}
