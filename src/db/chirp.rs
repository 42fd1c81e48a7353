//! Chirp storage.

use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct ChirpStore {
    pool: SqlitePool,
}

/// Sort order for chirp listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn from_query(s: &str) -> Self {
        match s {
            "desc" => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Chirp {
    pub id: String,
    pub user_id: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(sqlx::FromRow)]
struct ChirpRow {
    id: String,
    user_id: String,
    body: String,
    created_at: String,
    updated_at: String,
}

impl From<ChirpRow> for Chirp {
    fn from(row: ChirpRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            body: row.body,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl ChirpStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new chirp for a user.
    pub async fn create(&self, user_id: &str, body: &str) -> Result<Chirp, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        let row: ChirpRow = sqlx::query_as(
            "INSERT INTO chirps (id, user_id, body) VALUES (?, ?, ?)
             RETURNING id, user_id, body, created_at, updated_at",
        )
        .bind(&id)
        .bind(user_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    /// List all chirps ordered by creation time.
    pub async fn list(&self, sort: SortOrder) -> Result<Vec<Chirp>, sqlx::Error> {
        let query = match sort {
            SortOrder::Asc => {
                "SELECT id, user_id, body, created_at, updated_at FROM chirps
                 ORDER BY created_at ASC, id ASC"
            }
            SortOrder::Desc => {
                "SELECT id, user_id, body, created_at, updated_at FROM chirps
                 ORDER BY created_at DESC, id DESC"
            }
        };
        let rows: Vec<ChirpRow> = sqlx::query_as(query).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Chirp::from).collect())
    }

    /// List all chirps by a single author.
    pub async fn list_by_user(
        &self,
        user_id: &str,
        sort: SortOrder,
    ) -> Result<Vec<Chirp>, sqlx::Error> {
        let query = match sort {
            SortOrder::Asc => {
                "SELECT id, user_id, body, created_at, updated_at FROM chirps
                 WHERE user_id = ? ORDER BY created_at ASC, id ASC"
            }
            SortOrder::Desc => {
                "SELECT id, user_id, body, created_at, updated_at FROM chirps
                 WHERE user_id = ? ORDER BY created_at DESC, id DESC"
            }
        };
        let rows: Vec<ChirpRow> = sqlx::query_as(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Chirp::from).collect())
    }

    /// Get a chirp by ID.
    pub async fn get(&self, id: &str) -> Result<Option<Chirp>, sqlx::Error> {
        let row: Option<ChirpRow> =
            sqlx::query_as("SELECT id, user_id, body, created_at, updated_at FROM chirps WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Chirp::from))
    }

    /// Delete a chirp by ID. Returns false when no row matched.
    pub async fn delete(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn user_id(db: &Database, email: &str) -> String {
        db.users().create(email, "hash").await.unwrap().unwrap().id
    }

    #[tokio::test]
    async fn test_create_and_get_chirp() {
        let db = Database::open(":memory:").await.unwrap();
        let author = user_id(&db, "alice@example.com").await;

        let chirp = db.chirps().create(&author, "hello world").await.unwrap();
        assert_eq!(chirp.user_id, author);
        assert_eq!(chirp.body, "hello world");

        let fetched = db.chirps().get(&chirp.id).await.unwrap().unwrap();
        assert_eq!(fetched.body, "hello world");

        assert!(db.chirps().get("no-such-id").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_sort_order() {
        let db = Database::open(":memory:").await.unwrap();
        let author = user_id(&db, "alice@example.com").await;

        // Backdate rows so ordering does not depend on insert timing
        for (body, created) in [("first", "2024-01-01"), ("second", "2024-06-01")] {
            let id = uuid::Uuid::new_v4().to_string();
            sqlx::query("INSERT INTO chirps (id, user_id, body, created_at) VALUES (?, ?, ?, ?)")
                .bind(&id)
                .bind(&author)
                .bind(body)
                .bind(created)
                .execute(db.pool())
                .await
                .unwrap();
        }

        let asc = db.chirps().list(SortOrder::Asc).await.unwrap();
        assert_eq!(asc[0].body, "first");
        assert_eq!(asc[1].body, "second");

        let desc = db.chirps().list(SortOrder::Desc).await.unwrap();
        assert_eq!(desc[0].body, "second");
        assert_eq!(desc[1].body, "first");
    }

    #[tokio::test]
    async fn test_list_by_user() {
        let db = Database::open(":memory:").await.unwrap();
        let alice = user_id(&db, "alice@example.com").await;
        let bob = user_id(&db, "bob@example.com").await;

        db.chirps().create(&alice, "from alice").await.unwrap();
        db.chirps().create(&bob, "from bob").await.unwrap();

        let chirps = db
            .chirps()
            .list_by_user(&alice, SortOrder::Asc)
            .await
            .unwrap();
        assert_eq!(chirps.len(), 1);
        assert_eq!(chirps[0].body, "from alice");
    }

    #[tokio::test]
    async fn test_delete_chirp() {
        let db = Database::open(":memory:").await.unwrap();
        let author = user_id(&db, "alice@example.com").await;
        let chirp = db.chirps().create(&author, "temp").await.unwrap();

        assert!(db.chirps().delete(&chirp.id).await.unwrap());
        assert!(!db.chirps().delete(&chirp.id).await.unwrap());
    }
}
