//! SQLite implementation of the ContextGraphRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{
    Context, ContextGraphRepository, ContextRef, Contribution, ContributionStatus, GraphStats,
    LabelledPattern, Language, Localized, LocalizedText, NewContribution,
};
use crate::error::{Error, Result};

/// Tables holding language-tagged texts owned by a context
#[derive(Debug, Clone, Copy)]
enum TextTable {
    Patterns,
    Responses,
}

impl TextTable {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Patterns => "patterns",
            Self::Responses => "responses",
        }
    }
}

fn label_column(language: Language) -> &'static str {
    match language {
        Language::En => "label_en",
        Language::Fr => "label_fr",
        Language::Ar => "label_ar",
    }
}

/// SQLite implementation of the context graph repository
#[derive(Clone)]
pub struct SqliteContextGraphRepository {
    pool: SqlitePool,
}

impl SqliteContextGraphRepository {
    /// Create a new SQLite context graph repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn load_texts(&self, table: TextTable, context_id: &str) -> Result<Vec<LocalizedText>> {
        let sql = format!(
            "SELECT language, label FROM {} WHERE context_id = ? ORDER BY position",
            table.as_str()
        );
        let rows: Vec<(String, String)> = sqlx::query_as(&sql)
            .bind(context_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|(language, text)| {
                let language = Language::parse(&language)
                    .ok_or_else(|| Error::Other(format!("Invalid language: {}", language)))?;
                Ok(LocalizedText { language, text })
            })
            .collect()
    }

    async fn load_related(&self, context_id: &str) -> Result<Vec<ContextRef>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT c.id, c.code FROM related_contexts r
            JOIN contexts c ON c.id = r.related_context_id
            WHERE r.main_context_id = ?
            ORDER BY r.position
            "#,
        )
        .bind(context_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, code)| ContextRef { id, code })
            .collect())
    }

    async fn count(&self, table: &str) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

async fn insert_texts(
    conn: &mut SqliteConnection,
    table: TextTable,
    context_id: &str,
    texts: &[LocalizedText],
) -> Result<()> {
    let sql = format!(
        "INSERT INTO {} (id, context_id, language, label, position) VALUES (?, ?, ?, ?, ?)",
        table.as_str()
    );
    for (position, text) in texts.iter().enumerate() {
        sqlx::query(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(context_id)
            .bind(text.language.as_str())
            .bind(&text.text)
            .bind(position as i64)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

async fn insert_edges(
    conn: &mut SqliteConnection,
    context_id: &str,
    related: &[ContextRef],
) -> Result<usize> {
    let (next_position,): (i64,) = sqlx::query_as(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM related_contexts WHERE main_context_id = ?",
    )
    .bind(context_id)
    .fetch_one(&mut *conn)
    .await?;

    let mut created = 0;
    for (offset, target) in related.iter().enumerate() {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO related_contexts (main_context_id, related_context_id, position)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(context_id)
        .bind(&target.id)
        .bind(next_position + offset as i64)
        .execute(&mut *conn)
        .await?;
        created += result.rows_affected() as usize;
    }
    Ok(created)
}

#[async_trait]
impl ContextGraphRepository for SqliteContextGraphRepository {
    // ========== Write Operations ==========

    async fn insert_contribution(&self, contribution: &NewContribution) -> Result<ContextRef> {
        let context = &contribution.context;
        let contribution_id = Uuid::new_v4().to_string();
        let context_id = Uuid::new_v4().to_string();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO contributions (
                id, title, description, status, contributor_id, validator_id,
                created_at, validated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&contribution_id)
        .bind(&contribution.title)
        .bind(&contribution.description)
        .bind(contribution.status.as_str())
        .bind(&contribution.contributor_id)
        .bind(&contribution.validator_id)
        .bind(contribution.created_at.to_rfc3339())
        .bind(contribution.validated_at.map(|at| at.to_rfc3339()))
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO contexts (
                id, code, label_en, label_fr, label_ar,
                proposition_en, proposition_fr, proposition_ar, contribution_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&context_id)
        .bind(&context.code)
        .bind(&context.labels.en)
        .bind(&context.labels.fr)
        .bind(&context.labels.ar)
        .bind(&context.propositions.en)
        .bind(&context.propositions.fr)
        .bind(&context.propositions.ar)
        .bind(&contribution_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::from_insert(e, &context.code))?;

        insert_texts(&mut tx, TextTable::Patterns, &context_id, &context.patterns).await?;
        insert_texts(&mut tx, TextTable::Responses, &context_id, &context.responses).await?;
        insert_edges(&mut tx, &context_id, &context.related).await?;

        tx.commit().await?;

        debug!(
            code = %context.code,
            context_id = %context_id,
            patterns = context.patterns.len(),
            responses = context.responses.len(),
            related = context.related.len(),
            "Contribution inserted"
        );

        Ok(ContextRef {
            id: context_id,
            code: context.code.clone(),
        })
    }

    async fn link_related(&self, context_id: &str, related: &[ContextRef]) -> Result<usize> {
        if related.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let created = insert_edges(&mut tx, context_id, related).await?;
        tx.commit().await?;

        debug!(context_id = %context_id, created, "Relations linked");
        Ok(created)
    }

    async fn delete_contribution(&self, contribution_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM contributions WHERE id = ?")
            .bind(contribution_id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(contribution_id = %contribution_id, "Contribution deleted");
        }
        Ok(deleted)
    }

    // ========== Lookups ==========

    async fn find_context_by_code(&self, code: &str) -> Result<Option<ContextRef>> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT id, code FROM contexts WHERE code = ?")
                .bind(code)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(id, code)| ContextRef { id, code }))
    }

    async fn get_context(&self, code: &str) -> Result<Option<Context>> {
        let row: Option<ContextRow> = sqlx::query_as("SELECT * FROM contexts WHERE code = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let patterns = self.load_texts(TextTable::Patterns, &row.id).await?;
        let responses = self.load_texts(TextTable::Responses, &row.id).await?;
        let related = self.load_related(&row.id).await?;

        Ok(Some(row.into_context(patterns, responses, related)))
    }

    async fn get_contribution(&self, id: &str) -> Result<Option<Contribution>> {
        let row: Option<ContributionRow> = sqlx::query_as("SELECT * FROM contributions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_contribution()).transpose()
    }

    async fn count_contexts(&self) -> Result<u64> {
        self.count("contexts").await
    }

    async fn count_contributions(&self) -> Result<u64> {
        self.count("contributions").await
    }

    async fn get_stats(&self) -> Result<GraphStats> {
        Ok(GraphStats {
            contexts: self.count("contexts").await?,
            contributions: self.count("contributions").await?,
            patterns: self.count("patterns").await?,
            responses: self.count("responses").await?,
            relations: self.count("related_contexts").await?,
        })
    }

    // ========== Language Projections ==========

    async fn list_labels(&self, language: Language) -> Result<Vec<String>> {
        let column = label_column(language);
        let sql = format!(
            "SELECT {column} FROM contexts WHERE {column} IS NOT NULL ORDER BY rowid"
        );
        let rows: Vec<(String,)> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(label,)| label).collect())
    }

    async fn list_patterns(&self, language: Language) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT label FROM patterns WHERE language = ? ORDER BY rowid")
                .bind(language.as_str())
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(text,)| text).collect())
    }

    async fn list_labelled_patterns(&self, language: Language) -> Result<Vec<LabelledPattern>> {
        let sql = format!(
            r#"
            SELECT c.code, c.{column}, p.label FROM patterns p
            JOIN contexts c ON c.id = p.context_id
            WHERE p.language = ?
            ORDER BY c.rowid, p.position
            "#,
            column = label_column(language)
        );
        let rows: Vec<(String, Option<String>, String)> = sqlx::query_as(&sql)
            .bind(language.as_str())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(context_code, label, text)| LabelledPattern {
                context_code,
                label,
                text,
            })
            .collect())
    }
}

// ========== Row Types ==========

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Other(format!("Invalid timestamp '{}': {}", value, e)))
}

#[derive(Debug, FromRow)]
struct ContextRow {
    id: String,
    code: String,
    label_en: Option<String>,
    label_fr: Option<String>,
    label_ar: Option<String>,
    proposition_en: Option<String>,
    proposition_fr: Option<String>,
    proposition_ar: Option<String>,
    contribution_id: String,
}

impl ContextRow {
    fn into_context(
        self,
        patterns: Vec<LocalizedText>,
        responses: Vec<LocalizedText>,
        related: Vec<ContextRef>,
    ) -> Context {
        Context {
            id: self.id,
            code: self.code,
            labels: Localized {
                en: self.label_en,
                fr: self.label_fr,
                ar: self.label_ar,
            },
            propositions: Localized {
                en: self.proposition_en,
                fr: self.proposition_fr,
                ar: self.proposition_ar,
            },
            contribution_id: self.contribution_id,
            patterns,
            responses,
            related,
        }
    }
}

#[derive(Debug, FromRow)]
struct ContributionRow {
    id: String,
    title: String,
    description: Option<String>,
    status: String,
    contributor_id: String,
    validator_id: Option<String>,
    created_at: String,
    validated_at: Option<String>,
}

impl ContributionRow {
    fn into_contribution(self) -> Result<Contribution> {
        let status = ContributionStatus::parse(&self.status)
            .ok_or_else(|| Error::Other(format!("Invalid contribution status: {}", self.status)))?;

        Ok(Contribution {
            id: self.id,
            title: self.title,
            description: self.description,
            status,
            contributor_id: self.contributor_id,
            validator_id: self.validator_id,
            created_at: parse_timestamp(&self.created_at)?,
            validated_at: self.validated_at.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}
