//! SQLite implementation of the IdentityRepository

use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::domain::{IdentityRepository, User, UserStatus};
use crate::error::{Error, Result};

/// Role given to identities created on demand
const DEFAULT_ROLE: &str = "administrator";

/// SQLite implementation of the identity repository
#[derive(Clone)]
pub struct SqliteIdentityRepository {
    pool: SqlitePool,
}

impl SqliteIdentityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityRepository for SqliteIdentityRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, first_name, last_name, role, status FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn ensure_user(&self, username: &str) -> Result<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::InvalidInput("username cannot be empty".into()));
        }

        let result = sqlx::query(
            "INSERT OR IGNORE INTO users (id, username, role, status) VALUES (?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(username)
        .bind(DEFAULT_ROLE)
        .bind(UserStatus::Valid.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            info!(username = %username, "Created user");
        }

        self.find_by_username(username)
            .await?
            .ok_or_else(|| Error::UserNotFound(username.to_string()))
    }

    async fn count_users(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    username: String,
    first_name: Option<String>,
    last_name: Option<String>,
    role: String,
    status: String,
}

impl UserRow {
    fn into_user(self) -> Result<User> {
        let status = UserStatus::parse(&self.status)
            .ok_or_else(|| Error::Other(format!("Invalid user status: {}", self.status)))?;

        Ok(User {
            id: self.id,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    #[tokio::test]
    async fn test_ensure_user_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        let repo = SqliteIdentityRepository::new(db.pool().clone());

        let first = repo.ensure_user("system").await.unwrap();
        let second = repo.ensure_user("system").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.role, DEFAULT_ROLE);
        assert_eq!(first.status, UserStatus::Valid);
        assert_eq!(repo.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_by_username() {
        let db = Database::in_memory().await.unwrap();
        let repo = SqliteIdentityRepository::new(db.pool().clone());

        assert!(repo.find_by_username("system").await.unwrap().is_none());
        repo.ensure_user("system").await.unwrap();
        assert!(repo.find_by_username("system").await.unwrap().is_some());
        assert!(repo.find_by_username("System").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ensure_user_rejects_blank_username() {
        let db = Database::in_memory().await.unwrap();
        let repo = SqliteIdentityRepository::new(db.pool().clone());

        assert!(matches!(
            repo.ensure_user("  ").await,
            Err(Error::InvalidInput(_))
        ));
    }
}
