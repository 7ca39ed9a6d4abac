//! Database migrations
//!
//! This module manages SQLite schema migrations for intentgraph.
//! Migrations are versioned and applied automatically on database connection.

use sqlx::SqlitePool;

/// Current schema version
pub const CURRENT_VERSION: i32 = 3;

/// SQL for creating the migrations tracking table
const CREATE_MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        version INTEGER PRIMARY KEY NOT NULL,
        applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

/// Migration 1: Identities used for provenance
const MIGRATION_V1: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY NOT NULL,
        username TEXT NOT NULL UNIQUE,
        first_name TEXT,
        last_name TEXT,
        role TEXT NOT NULL DEFAULT 'administrator',
        status TEXT NOT NULL DEFAULT 'valid' CHECK (status IN ('valid', 'pending', 'invalid')),
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

/// Migration 2: Context graph
const MIGRATION_V2: &str = r#"
    CREATE TABLE IF NOT EXISTS contributions (
        id TEXT PRIMARY KEY NOT NULL,
        title TEXT NOT NULL,
        description TEXT,
        status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'valid', 'invalid')),
        contributor_id TEXT NOT NULL REFERENCES users(id),
        validator_id TEXT REFERENCES users(id),
        created_at TEXT NOT NULL,
        validated_at TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_contributions_status ON contributions(status);
    CREATE INDEX IF NOT EXISTS idx_contributions_contributor_id ON contributions(contributor_id);

    CREATE TABLE IF NOT EXISTS contexts (
        id TEXT PRIMARY KEY NOT NULL,
        code TEXT NOT NULL UNIQUE,
        label_en TEXT,
        label_fr TEXT,
        label_ar TEXT,
        proposition_en TEXT,
        proposition_fr TEXT,
        proposition_ar TEXT,
        contribution_id TEXT NOT NULL UNIQUE REFERENCES contributions(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS patterns (
        id TEXT PRIMARY KEY NOT NULL,
        context_id TEXT NOT NULL REFERENCES contexts(id) ON DELETE CASCADE,
        language TEXT NOT NULL CHECK (language IN ('en', 'fr', 'ar')),
        label TEXT NOT NULL,
        position INTEGER NOT NULL DEFAULT 0
    );

    CREATE INDEX IF NOT EXISTS idx_patterns_context_id ON patterns(context_id);
    CREATE INDEX IF NOT EXISTS idx_patterns_language ON patterns(language);

    CREATE TABLE IF NOT EXISTS responses (
        id TEXT PRIMARY KEY NOT NULL,
        context_id TEXT NOT NULL REFERENCES contexts(id) ON DELETE CASCADE,
        language TEXT NOT NULL CHECK (language IN ('en', 'fr', 'ar')),
        label TEXT NOT NULL,
        position INTEGER NOT NULL DEFAULT 0
    );

    CREATE INDEX IF NOT EXISTS idx_responses_context_id ON responses(context_id);

    -- Directed follow-up edges; deleting either end removes the edge only
    CREATE TABLE IF NOT EXISTS related_contexts (
        main_context_id TEXT NOT NULL REFERENCES contexts(id) ON DELETE CASCADE,
        related_context_id TEXT NOT NULL REFERENCES contexts(id) ON DELETE CASCADE,
        position INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (main_context_id, related_context_id)
    );

    CREATE INDEX IF NOT EXISTS idx_related_contexts_related ON related_contexts(related_context_id);
"#;

/// Migration 3: Model registry
const MIGRATION_V3: &str = r#"
    CREATE TABLE IF NOT EXISTS models (
        id TEXT PRIMARY KEY NOT NULL,
        path TEXT NOT NULL,
        language TEXT NOT NULL CHECK (language IN ('en', 'fr', 'ar')),
        fingerprint TEXT NOT NULL,
        state TEXT NOT NULL DEFAULT 'disabled' CHECK (state IN ('enabled', 'disabled')),
        tag TEXT NOT NULL DEFAULT 'none' CHECK (tag IN ('dev', 'prod', 'none')),
        user_id TEXT NOT NULL REFERENCES users(id),
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_models_language ON models(language);
"#;

/// Get the current schema version from the database
async fn get_current_version(pool: &SqlitePool) -> anyhow::Result<i32> {
    sqlx::raw_sql(CREATE_MIGRATIONS_TABLE).execute(pool).await?;

    // MAX over an empty table yields a single NULL row
    let version: Option<(Option<i32>,)> = sqlx::query_as("SELECT MAX(version) FROM _migrations")
        .fetch_optional(pool)
        .await?;

    Ok(version.and_then(|(v,)| v).unwrap_or(0))
}

/// Record that a migration has been applied
async fn record_migration(pool: &SqlitePool, version: i32) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO _migrations (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;
    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    let current_version = get_current_version(pool).await?;

    tracing::info!(
        current_version = current_version,
        target_version = CURRENT_VERSION,
        "Checking database migrations"
    );

    if current_version >= CURRENT_VERSION {
        tracing::debug!("Database is up to date");
        return Ok(());
    }

    if current_version < 1 {
        tracing::info!("Applying migration v1: Users");
        sqlx::raw_sql(MIGRATION_V1).execute(pool).await?;
        record_migration(pool, 1).await?;
    }

    if current_version < 2 {
        tracing::info!("Applying migration v2: Context graph");
        sqlx::raw_sql(MIGRATION_V2).execute(pool).await?;
        record_migration(pool, 2).await?;
    }

    if current_version < 3 {
        tracing::info!("Applying migration v3: Model registry");
        sqlx::raw_sql(MIGRATION_V3).execute(pool).await?;
        record_migration(pool, 3).await?;
    }

    tracing::info!("Database migrations completed");
    Ok(())
}

/// Get migration status information
pub async fn migration_status(pool: &SqlitePool) -> anyhow::Result<MigrationStatus> {
    let current_version = get_current_version(pool).await?;
    Ok(MigrationStatus {
        current_version,
        target_version: CURRENT_VERSION,
        needs_migration: current_version < CURRENT_VERSION,
    })
}

/// Migration status information
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Current schema version in the database
    pub current_version: i32,
    /// Target schema version (latest)
    pub target_version: i32,
    /// Whether migrations need to be run
    pub needs_migration: bool,
}
