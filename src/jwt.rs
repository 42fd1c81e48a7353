//! JWT access token generation and validation.
//!
//! Access tokens are short-lived, stateless, and carry only an issuer and
//! subject claim. Revocation is handled purely by expiry; long-lived
//! credentials are opaque refresh tokens tracked in the database.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Default access token duration: 10 minutes
pub const DEFAULT_ACCESS_TOKEN_DURATION_SECS: u64 = 600;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Issuer (fixed service name)
    pub iss: String,
    /// Subject (user UUID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Configuration for JWT operations.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    duration_secs: u64,
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret and issuer.
    pub fn new(secret: &[u8], issuer: &str, duration_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.to_string(),
            duration_secs,
        }
    }

    /// Token duration in seconds.
    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    /// Generate an access token for a user.
    pub fn make_token(&self, user_id: &str) -> Result<String, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| JwtError::TimeError)?
            .as_secs();

        let claims = AccessClaims {
            iss: self.issuer.clone(),
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.duration_secs,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)
    }

    /// Validate an access token and return the subject (user UUID).
    /// Fails on bad signature, expiry, issuer mismatch, or missing subject.
    pub fn validate_token(&self, token: &str) -> Result<String, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);

        let token_data =
            jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &validation)
                .map_err(JwtError::Decoding)?;

        if token_data.claims.sub.is_empty() {
            return Err(JwtError::MissingSubject);
        }

        Ok(token_data.claims.sub)
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug)]
pub enum JwtError {
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Error decoding the token (bad signature, expired, issuer mismatch)
    Decoding(jsonwebtoken::errors::Error),
    /// System time error
    TimeError,
    /// Token has no subject claim
    MissingSubject,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::Decoding(e) => write!(f, "Failed to decode token: {}", e),
            JwtError::TimeError => write!(f, "System time error"),
            JwtError::MissingSubject => write!(f, "No user ID in token"),
        }
    }
}

impl std::error::Error for JwtError {}
