//! Seeding and ad-hoc ingestion commands

use std::path::{Path, PathBuf};

use sqlx::SqlitePool;
use tracing::info;

use crate::domain::{ContextGraphRepository, Language, LanguageSource};
use crate::error::Result;
use crate::infrastructure::{SqliteContextGraphRepository, SqliteIdentityRepository};
use crate::ingestion::{
    IngestReport, IngestionDriver, IngestionOptions, RecordMerger, merge_single, resolve_actor,
};

/// The three aligned seed datasets
#[derive(Debug, Clone)]
pub struct SeedSources {
    pub en: PathBuf,
    pub fr: PathBuf,
    pub ar: PathBuf,
}

/// Result of a seed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The graph already had contexts and the run was not forced
    Skipped { existing: u64 },
    Completed(IngestReport),
}

/// Seed the graph from the three language datasets.
///
/// Provenance is read from the English dataset. Nothing is written when
/// the graph already holds contexts, unless `force` is set. The ingestion
/// actor is created on first use.
pub async fn seed(
    pool: &SqlitePool,
    sources: &SeedSources,
    actor: &str,
    options: IngestionOptions,
    force: bool,
) -> Result<SeedOutcome> {
    let repo = SqliteContextGraphRepository::new(pool.clone());

    let existing = repo.count_contexts().await?;
    if existing > 0 && !force {
        info!(existing, "Graph already seeded, skipping");
        return Ok(SeedOutcome::Skipped { existing });
    }

    let sources = vec![
        LanguageSource::from_path(Language::En, &sources.en)?,
        LanguageSource::from_path(Language::Fr, &sources.fr)?,
        LanguageSource::from_path(Language::Ar, &sources.ar)?,
    ];
    let records = RecordMerger::bulk().merge(&sources)?;

    let identity = SqliteIdentityRepository::new(pool.clone());
    let actor = resolve_actor(&identity, actor, true).await?;

    let report = IngestionDriver::new(&repo, actor)
        .with_options(options)
        .ingest(&records)
        .await?;
    Ok(SeedOutcome::Completed(report))
}

/// Add the records of a single-language dataset.
///
/// Contributions are titled `NO TITLE` and stamped with the current time. The
/// ingestion actor must already exist.
pub async fn ingest_language(
    pool: &SqlitePool,
    language: Language,
    path: &Path,
    actor: &str,
    options: IngestionOptions,
) -> Result<IngestReport> {
    let records = merge_single(LanguageSource::from_path(language, path)?)?;

    let identity = SqliteIdentityRepository::new(pool.clone());
    let actor = resolve_actor(&identity, actor, false).await?;

    let repo = SqliteContextGraphRepository::new(pool.clone());
    IngestionDriver::new(&repo, actor)
        .with_options(options)
        .ingest(&records)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IdentityRepository;
    use crate::error::Error;
    use crate::ingestion::DEFAULT_TITLE;
    use crate::storage::Database;
    use std::fs;

    fn write_sources(dir: &Path) -> SeedSources {
        let en = r#"[
            {"code": "greet", "tag": "Greeting", "patterns": ["hello"], "responses": ["hi"],
             "to": ["bye"], "title": "Basics", "description": null, "date": "2021-03-14"},
            {"code": "bye", "tag": "Goodbye", "patterns": ["bye"], "responses": ["see you"],
             "to": [], "title": "Basics", "date": "2021-03-14"}
        ]"#;
        let fr = r#"[
            {"code": "greet", "tag": "Salutation", "patterns": ["bonjour"], "responses": ["salut"], "to": []},
            {"code": "bye", "tag": "Au revoir", "patterns": ["au revoir"], "responses": ["à plus"], "to": []}
        ]"#;
        let ar = r#"[
            {"code": "greet", "tag": "تحية", "patterns": ["مرحبا"], "responses": ["أهلا"], "to": []},
            {"code": "bye", "tag": "وداع", "patterns": ["وداعا"], "responses": ["إلى اللقاء"], "to": []}
        ]"#;

        let sources = SeedSources {
            en: dir.join("en.json"),
            fr: dir.join("fr.json"),
            ar: dir.join("ar.json"),
        };
        fs::write(&sources.en, en).unwrap();
        fs::write(&sources.fr, fr).unwrap();
        fs::write(&sources.ar, ar).unwrap();
        sources
    }

    #[tokio::test]
    async fn test_seed_then_skip_when_populated() {
        let dir = tempfile::tempdir().unwrap();
        let sources = write_sources(dir.path());
        let db = Database::in_memory().await.unwrap();

        let first = seed(db.pool(), &sources, "system", IngestionOptions::default(), false)
            .await
            .unwrap();
        match first {
            SeedOutcome::Completed(report) => {
                assert_eq!(report.inserted, 2);
                assert_eq!(report.links_created, 1);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let second = seed(db.pool(), &sources, "system", IngestionOptions::default(), false)
            .await
            .unwrap();
        assert_eq!(second, SeedOutcome::Skipped { existing: 2 });
    }

    #[tokio::test]
    async fn test_forced_reseed_hits_duplicate_codes() {
        let dir = tempfile::tempdir().unwrap();
        let sources = write_sources(dir.path());
        let db = Database::in_memory().await.unwrap();

        seed(db.pool(), &sources, "system", IngestionOptions::default(), false)
            .await
            .unwrap();
        let result = seed(db.pool(), &sources, "system", IngestionOptions::default(), true).await;

        assert!(matches!(result, Err(Error::DuplicateCode(_))));
    }

    #[tokio::test]
    async fn test_ingest_language_requires_existing_actor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fr.json");
        fs::write(
            &path,
            r#"[{"code": "merci", "tag": "Remerciement", "patterns": ["merci"], "responses": ["de rien"], "to": []}]"#,
        )
        .unwrap();
        let db = Database::in_memory().await.unwrap();

        let result =
            ingest_language(db.pool(), Language::Fr, &path, "system", IngestionOptions::default())
                .await;
        assert!(matches!(result, Err(Error::UserNotFound(_))));

        SqliteIdentityRepository::new(db.pool().clone())
            .ensure_user("system")
            .await
            .unwrap();

        let report =
            ingest_language(db.pool(), Language::Fr, &path, "system", IngestionOptions::default())
                .await
                .unwrap();
        assert_eq!(report.inserted, 1);

        let repo = SqliteContextGraphRepository::new(db.pool().clone());
        let context = repo.get_context("merci").await.unwrap().unwrap();
        let contribution = repo
            .get_contribution(&context.contribution_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(contribution.title, DEFAULT_TITLE);
        assert_eq!(context.labels.get(Language::En), None);
    }
}
