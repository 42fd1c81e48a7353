//! Refresh token storage.
//!
//! Refresh tokens are opaque 32-byte random strings, hex-encoded and keyed
//! on the token itself. A token is valid only while `revoked_at` is unset
//! and `expires_at` lies in the future. Revocation is a one-way transition;
//! rows are never deleted outside the dev-only reset.

use rand::RngCore;
use sqlx::sqlite::SqlitePool;

use super::user::UserRow;
use super::User;

#[derive(Clone)]
pub struct RefreshTokenStore {
    pool: SqlitePool,
}

/// A stored refresh token record.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: String,
    pub created_at: String,
    pub expires_at: String,
    pub revoked_at: Option<String>,
}

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    token: String,
    user_id: String,
    created_at: String,
    expires_at: String,
    revoked_at: Option<String>,
}

impl From<RefreshTokenRow> for RefreshToken {
    fn from(row: RefreshTokenRow) -> Self {
        Self {
            token: row.token,
            user_id: row.user_id,
            created_at: row.created_at,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
        }
    }
}

/// Generate an opaque refresh token: 32 random bytes, hex-encoded.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

impl RefreshTokenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new refresh token for a user, expiring after `ttl_days`.
    /// Returns `None` on the vanishingly unlikely primary-key collision.
    pub async fn create(
        &self,
        user_id: &str,
        ttl_days: u32,
    ) -> Result<Option<RefreshToken>, sqlx::Error> {
        self.create_in(&self.pool, user_id, ttl_days).await
    }

    /// Create a new refresh token using the given executor, allowing the
    /// insert to participate in a caller-owned transaction.
    pub async fn create_in<'e, E>(
        &self,
        executor: E,
        user_id: &str,
        ttl_days: u32,
    ) -> Result<Option<RefreshToken>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let token = generate_token();
        let ttl_modifier = format!("+{} days", ttl_days);
        let row: Option<RefreshTokenRow> = sqlx::query_as(
            "INSERT INTO refresh_tokens (token, user_id, expires_at)
             VALUES (?, ?, datetime('now', ?))
             ON CONFLICT DO NOTHING
             RETURNING token, user_id, created_at, expires_at, revoked_at",
        )
        .bind(&token)
        .bind(user_id)
        .bind(&ttl_modifier)
        .fetch_optional(executor)
        .await?;
        Ok(row.map(RefreshToken::from))
    }

    /// Get a refresh token record by its token string, valid or not.
    pub async fn get(&self, token: &str) -> Result<Option<RefreshToken>, sqlx::Error> {
        let row: Option<RefreshTokenRow> = sqlx::query_as(
            "SELECT token, user_id, created_at, expires_at, revoked_at
             FROM refresh_tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(RefreshToken::from))
    }

    /// Revoke a token. Does not check expiry. Returns false when the token
    /// does not exist or was already revoked.
    pub async fn revoke(&self, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = datetime('now')
             WHERE token = ? AND revoked_at IS NULL",
        )
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Redeem a token for rotation: revoke it only if it is currently valid
    /// (unrevoked and unexpired), returning the revoked record. The
    /// conditional update is atomic at the row level, so two concurrent
    /// redemptions of the same token cannot both succeed.
    pub async fn redeem<'e, E>(
        &self,
        executor: E,
        token: &str,
    ) -> Result<Option<RefreshToken>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let row: Option<RefreshTokenRow> = sqlx::query_as(
            "UPDATE refresh_tokens SET revoked_at = datetime('now')
             WHERE token = ? AND revoked_at IS NULL AND expires_at > datetime('now')
             RETURNING token, user_id, created_at, expires_at, revoked_at",
        )
        .bind(token)
        .fetch_optional(executor)
        .await?;
        Ok(row.map(RefreshToken::from))
    }

    /// Resolve the owning user of a currently valid token. Expired or
    /// revoked tokens yield `None` even when the row exists.
    pub async fn user_for_token(&self, token: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT u.id, u.email, u.hashed_password, u.is_chirpy_red, u.created_at, u.updated_at
             FROM users u
             INNER JOIN refresh_tokens rt ON rt.user_id = u.id
             WHERE rt.token = ? AND rt.revoked_at IS NULL AND rt.expires_at > datetime('now')",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }
}
