//! Session lifecycle: login, refresh rotation, and revocation.
//!
//! Login mints an access token and persists a fresh refresh token. Refresh
//! rotates: the presented token is redeemed (conditionally revoked) and its
//! successor inserted in a single transaction, so a refresh token can be
//! redeemed at most once and no successor survives a partial failure. Two
//! concurrent refreshes of the same token race on the row-level conditional
//! update; exactly one wins.

use std::sync::Arc;

use crate::db::Database;
use crate::jwt::{JwtConfig, JwtError};

/// Access/refresh token pair handed to a client.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Errors from session operations.
#[derive(Debug)]
pub enum SessionError {
    /// Refresh token absent, revoked, or expired
    InvalidToken,
    /// Token to revoke does not exist (or is already revoked)
    NotFound,
    /// Refresh token primary-key collision
    Collision,
    /// Access token minting failed
    Jwt(JwtError),
    /// Underlying store failure
    Storage(sqlx::Error),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::InvalidToken => write!(f, "invalid refresh token"),
            SessionError::NotFound => write!(f, "refresh token not found"),
            SessionError::Collision => write!(f, "refresh token collision"),
            SessionError::Jwt(e) => write!(f, "failed to mint access token: {}", e),
            SessionError::Storage(e) => write!(f, "storage error: {}", e),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<sqlx::Error> for SessionError {
    fn from(e: sqlx::Error) -> Self {
        SessionError::Storage(e)
    }
}

impl From<JwtError> for SessionError {
    fn from(e: JwtError) -> Self {
        SessionError::Jwt(e)
    }
}

/// Orchestrates the token codec and the refresh token store.
#[derive(Clone)]
pub struct SessionManager {
    db: Database,
    jwt: Arc<JwtConfig>,
    refresh_ttl_days: u32,
}

impl SessionManager {
    pub fn new(db: Database, jwt: Arc<JwtConfig>, refresh_ttl_days: u32) -> Self {
        Self {
            db,
            jwt,
            refresh_ttl_days,
        }
    }

    /// Start a session: mint an access token and persist a new refresh token.
    pub async fn login(&self, user_id: &str) -> Result<TokenPair, SessionError> {
        let access_token = self.jwt.make_token(user_id)?;
        let refresh = self
            .db
            .refresh_tokens()
            .create(user_id, self.refresh_ttl_days)
            .await?
            .ok_or(SessionError::Collision)?;

        Ok(TokenPair {
            access_token,
            refresh_token: refresh.token,
        })
    }

    /// Rotate a refresh token: redeem the presented token and mint its
    /// successor pair. The presented token must be currently valid; redemption
    /// is single-use. Revoke-old and create-new commit together or not at all.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, SessionError> {
        let store = self.db.refresh_tokens();

        let mut tx = self.db.begin().await?;

        let redeemed = store
            .redeem(&mut *tx, refresh_token)
            .await?
            .ok_or(SessionError::InvalidToken)?;

        let successor = store
            .create_in(&mut *tx, &redeemed.user_id, self.refresh_ttl_days)
            .await?
            .ok_or(SessionError::Collision)?;

        let access_token = self.jwt.make_token(&redeemed.user_id)?;

        tx.commit().await?;

        Ok(TokenPair {
            access_token,
            refresh_token: successor.token,
        })
    }

    /// Revoke a refresh token. Revoking an unknown or already-revoked token
    /// is an error; callers wanting idempotence must catch `NotFound`.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), SessionError> {
        let revoked = self.db.refresh_tokens().revoke(refresh_token).await?;
        if !revoked {
            return Err(SessionError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::JwtConfig;

    async fn setup() -> (Database, SessionManager, String) {
        let db = Database::open(":memory:").await.unwrap();
        let jwt = Arc::new(JwtConfig::new(b"test-secret", "chirpy", 600));
        let session = SessionManager::new(db.clone(), jwt, 60);
        let user = db
            .users()
            .create("alice@example.com", "hash")
            .await
            .unwrap()
            .unwrap();
        (db, session, user.id)
    }

    #[tokio::test]
    async fn test_login_persists_refresh_token() {
        let (db, session, user_id) = setup().await;

        let pair = session.login(&user_id).await.unwrap();

        let stored = db
            .refresh_tokens()
            .get(&pair.refresh_token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.user_id, user_id);
        assert!(stored.revoked_at.is_none());
    }

    #[tokio::test]
    async fn test_refresh_rotates_token() {
        let (db, session, user_id) = setup().await;
        let pair = session.login(&user_id).await.unwrap();

        let rotated = session.refresh(&pair.refresh_token).await.unwrap();
        assert_ne!(rotated.refresh_token, pair.refresh_token);

        // Presented token is now revoked
        let old = db
            .refresh_tokens()
            .get(&pair.refresh_token)
            .await
            .unwrap()
            .unwrap();
        assert!(old.revoked_at.is_some());

        // Old token is single-use
        assert!(matches!(
            session.refresh(&pair.refresh_token).await,
            Err(SessionError::InvalidToken)
        ));

        // Successor still works
        assert!(session.refresh(&rotated.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_unknown_token() {
        let (_db, session, _user_id) = setup().await;

        assert!(matches!(
            session.refresh("no-such-token").await,
            Err(SessionError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_refresh_expired_token() {
        let (db, session, user_id) = setup().await;
        let pair = session.login(&user_id).await.unwrap();

        sqlx::query(
            "UPDATE refresh_tokens SET expires_at = datetime('now', '-1 hour') WHERE token = ?",
        )
        .bind(&pair.refresh_token)
        .execute(db.pool())
        .await
        .unwrap();

        assert!(matches!(
            session.refresh(&pair.refresh_token).await,
            Err(SessionError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_revoke() {
        let (db, session, user_id) = setup().await;
        let pair = session.login(&user_id).await.unwrap();

        session.revoke(&pair.refresh_token).await.unwrap();

        assert!(
            db.refresh_tokens()
                .user_for_token(&pair.refresh_token)
                .await
                .unwrap()
                .is_none()
        );

        // Revoking again, or revoking an unknown token, is a caller error
        assert!(matches!(
            session.revoke(&pair.refresh_token).await,
            Err(SessionError::NotFound)
        ));
        assert!(matches!(
            session.revoke("no-such-token").await,
            Err(SessionError::NotFound)
        ));
    }
}
