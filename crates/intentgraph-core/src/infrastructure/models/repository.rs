//! SQLite implementation of the ModelRegistry

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::domain::{Language, ModelRecord, ModelRegistry, ModelState, ModelTag};
use crate::error::{Error, Result};

/// SQLite implementation of the model registry
#[derive(Clone)]
pub struct SqliteModelRegistry {
    pool: SqlitePool,
}

impl SqliteModelRegistry {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ModelRegistry for SqliteModelRegistry {
    async fn register(&self, record: &ModelRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO models (id, path, language, fingerprint, state, tag, user_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.path)
        .bind(record.language.as_str())
        .bind(&record.fingerprint)
        .bind(record.state.as_str())
        .bind(record.tag.as_str())
        .bind(&record.user_id)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(model_id = %record.id, path = %record.path, "Model registered");
        Ok(())
    }

    async fn list(&self, language: Option<Language>) -> Result<Vec<ModelRecord>> {
        let rows: Vec<ModelRow> = match language {
            Some(language) => {
                sqlx::query_as(
                    "SELECT * FROM models WHERE language = ? ORDER BY created_at DESC, rowid DESC",
                )
                .bind(language.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT * FROM models ORDER BY created_at DESC, rowid DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.into_iter().map(|r| r.into_record()).collect()
    }
}

#[derive(Debug, FromRow)]
struct ModelRow {
    id: String,
    path: String,
    language: String,
    fingerprint: String,
    state: String,
    tag: String,
    user_id: String,
    created_at: String,
}

impl ModelRow {
    fn into_record(self) -> Result<ModelRecord> {
        let language = Language::parse(&self.language)
            .ok_or_else(|| Error::Other(format!("Invalid language: {}", self.language)))?;
        let state = ModelState::parse(&self.state)
            .ok_or_else(|| Error::Other(format!("Invalid model state: {}", self.state)))?;
        let tag = ModelTag::parse(&self.tag)
            .ok_or_else(|| Error::Other(format!("Invalid model tag: {}", self.tag)))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::Other(format!("Invalid timestamp '{}': {}", self.created_at, e)))?;

        Ok(ModelRecord {
            id: self.id,
            path: self.path,
            language,
            fingerprint: self.fingerprint,
            state,
            tag,
            user_id: self.user_id,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IdentityRepository;
    use crate::infrastructure::SqliteIdentityRepository;
    use crate::storage::Database;

    #[tokio::test]
    async fn test_register_and_list() {
        let db = Database::in_memory().await.unwrap();
        let user = SqliteIdentityRepository::new(db.pool().clone())
            .ensure_user("system")
            .await
            .unwrap();
        let registry = SqliteModelRegistry::new(db.pool().clone());

        registry
            .register(&ModelRecord::new("out/artifact_en.json", Language::En, "aa", &user.id))
            .await
            .unwrap();
        registry
            .register(&ModelRecord::new("out/artifact_fr.json", Language::Fr, "bb", &user.id))
            .await
            .unwrap();

        assert_eq!(registry.list(None).await.unwrap().len(), 2);

        let french = registry.list(Some(Language::Fr)).await.unwrap();
        assert_eq!(french.len(), 1);
        assert_eq!(french[0].fingerprint, "bb");
        assert_eq!(french[0].state, ModelState::Disabled);
        assert_eq!(french[0].tag, ModelTag::None);
    }

    #[tokio::test]
    async fn test_register_requires_known_user() {
        let db = Database::in_memory().await.unwrap();
        let registry = SqliteModelRegistry::new(db.pool().clone());

        let result = registry
            .register(&ModelRecord::new("x.json", Language::Ar, "cc", "nobody"))
            .await;
        assert!(matches!(result, Err(Error::DatabaseError(_))));
    }
}
