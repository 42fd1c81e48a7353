use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub hashed_password: String,
    pub is_chirpy_red: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(sqlx::FromRow)]
pub(super) struct UserRow {
    id: String,
    email: String,
    hashed_password: String,
    is_chirpy_red: i32,
    created_at: String,
    updated_at: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            hashed_password: row.hashed_password,
            is_chirpy_red: row.is_chirpy_red != 0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user. Returns `None` when the email is already taken.
    pub async fn create(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        let row: Option<UserRow> = sqlx::query_as(
            "INSERT INTO users (id, email, hashed_password) VALUES (?, ?, ?)
             ON CONFLICT DO NOTHING
             RETURNING id, email, hashed_password, is_chirpy_red, created_at, updated_at",
        )
        .bind(&id)
        .bind(email)
        .bind(hashed_password)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// Get a user by email.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, hashed_password, is_chirpy_red, created_at, updated_at
             FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, hashed_password, is_chirpy_red, created_at, updated_at
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// Update a user's email and password hash. Returns the updated record,
    /// or `None` when the user does not exist.
    pub async fn update(
        &self,
        id: &str,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "UPDATE users
             SET email = ?, hashed_password = ?, updated_at = datetime('now')
             WHERE id = ?
             RETURNING id, email, hashed_password, is_chirpy_red, created_at, updated_at",
        )
        .bind(email)
        .bind(hashed_password)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// Mark a user as Chirpy Red (webhook upgrade). Returns false when the
    /// user does not exist.
    pub async fn upgrade_red(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET is_chirpy_red = 1, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete all users. Chirps and refresh tokens cascade. Dev-only reset.
    pub async fn delete_all(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
