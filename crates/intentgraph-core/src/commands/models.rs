//! Model registry commands

use sqlx::SqlitePool;

use crate::domain::{Language, ModelRecord, ModelRegistry};
use crate::error::Result;
use crate::infrastructure::SqliteModelRegistry;

/// Registered encoding artifacts, newest first
pub async fn list_models(pool: &SqlitePool, language: Option<Language>) -> Result<Vec<ModelRecord>> {
    SqliteModelRegistry::new(pool.clone()).list(language).await
}
