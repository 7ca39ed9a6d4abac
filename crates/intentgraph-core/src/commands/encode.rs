//! Feature-encoding commands

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::domain::{IdentityRepository, Language, ModelRecord, ModelRegistry};
use crate::encoding::{EncodingArtifact, TrainingSet, TrainingSetAssembler, Vectorizer};
use crate::error::{Error, Result};
use crate::infrastructure::{
    SqliteContextGraphRepository, SqliteIdentityRepository, SqliteModelRegistry,
};

/// Parameters of an encoding run
#[derive(Debug, Clone)]
pub struct EncodeRequest {
    pub language: Language,
    pub output_dir: PathBuf,
    /// Shuffle seed; entropy when `None`
    pub seed: Option<u64>,
    /// Also write the training set as JSON
    pub export: bool,
    /// Encode with the artifact already in `output_dir` instead of deriving a
    /// new vocabulary and label set
    pub reuse_artifact: bool,
    /// Username credited for the registered model
    pub actor: String,
}

impl EncodeRequest {
    pub fn new(language: Language, output_dir: impl Into<PathBuf>, actor: impl Into<String>) -> Self {
        Self {
            language,
            output_dir: output_dir.into(),
            seed: None,
            export: false,
            reuse_artifact: false,
            actor: actor.into(),
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_export(mut self, export: bool) -> Self {
        self.export = export;
        self
    }

    pub fn reusing_artifact(mut self, reuse: bool) -> Self {
        self.reuse_artifact = reuse;
        self
    }
}

/// What an encoding run produced
#[derive(Debug, Clone, Serialize)]
pub struct EncodeOutcome {
    pub language: Language,
    pub examples: usize,
    pub vocabulary: usize,
    pub labels: usize,
    pub fingerprint: String,
    pub artifact_path: PathBuf,
    pub training_set_path: Option<PathBuf>,
    pub model_id: String,
}

/// File name of an exported training set
pub fn training_set_file_name(language: Language) -> String {
    format!("training_{}.json", language.as_str())
}

/// Build the training set of a language, save its artifact and register it
pub async fn encode(pool: &SqlitePool, request: &EncodeRequest) -> Result<EncodeOutcome> {
    let identity = SqliteIdentityRepository::new(pool.clone());
    let user = identity
        .find_by_username(&request.actor)
        .await?
        .ok_or_else(|| Error::UserNotFound(request.actor.clone()))?;

    let repo = SqliteContextGraphRepository::new(pool.clone());
    let assembler = TrainingSetAssembler::new(&repo).with_seed(request.seed);

    let (set, artifact) = if request.reuse_artifact {
        let artifact = EncodingArtifact::load_from_dir(&request.output_dir, request.language)?;
        let set = assembler
            .assemble_with(&Vectorizer::from_artifact(&artifact))
            .await?;
        (set, artifact)
    } else {
        let set = assembler.assemble(request.language).await?;
        let artifact = set.artifact();
        (set, artifact)
    };

    let artifact_path = artifact.save(&request.output_dir)?;
    let training_set_path = if request.export {
        Some(export_training_set(&set, &request.output_dir)?)
    } else {
        None
    };

    let record = ModelRecord::new(
        artifact_path.display().to_string(),
        request.language,
        artifact.fingerprint.clone(),
        user.id,
    );
    SqliteModelRegistry::new(pool.clone()).register(&record).await?;

    info!(
        language = %request.language,
        examples = set.len(),
        model_id = %record.id,
        "Encoding complete"
    );

    Ok(EncodeOutcome {
        language: request.language,
        examples: set.len(),
        vocabulary: set.vocabulary.len(),
        labels: set.labels.len(),
        fingerprint: artifact.fingerprint,
        artifact_path,
        training_set_path,
        model_id: record.id,
    })
}

/// Write a training set as JSON into `dir`
pub fn export_training_set(set: &TrainingSet, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(training_set_file_name(set.language));
    fs::write(&path, serde_json::to_string(set)?)?;
    Ok(path)
}

/// Encode one utterance with the saved artifact of its language
pub fn vectorize(output_dir: &Path, language: Language, utterance: &str) -> Result<Vec<f32>> {
    let artifact = EncodingArtifact::load_from_dir(output_dir, language)?;
    Ok(Vectorizer::from_artifact(&artifact).encode_input(utterance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContextGraphRepository, NewContext, NewContribution, Pattern};
    use crate::storage::Database;

    async fn seeded_db() -> Database {
        let db = Database::in_memory().await.unwrap();
        let user = SqliteIdentityRepository::new(db.pool().clone())
            .ensure_user("system")
            .await
            .unwrap();
        let repo = SqliteContextGraphRepository::new(db.pool().clone());

        let mut mood = NewContext::new("mood");
        mood.labels.en = Some("Mood".into());
        mood.patterns = vec![
            Pattern::new(Language::En, "I am happy"),
            Pattern::new(Language::En, "I feel great"),
        ];
        let mut greet = NewContext::new("greet");
        greet.labels.en = Some("Greeting".into());
        greet.patterns = vec![Pattern::new(Language::En, "hello")];

        for context in [mood, greet] {
            repo.insert_contribution(&NewContribution::new("T", &user.id, context))
                .await
                .unwrap();
        }
        db
    }

    #[tokio::test]
    async fn test_encode_saves_exports_and_registers() {
        let db = seeded_db().await;
        let dir = tempfile::tempdir().unwrap();

        let request = EncodeRequest::new(Language::En, dir.path(), "system")
            .with_seed(Some(1))
            .with_export(true);
        let outcome = encode(db.pool(), &request).await.unwrap();

        assert_eq!(outcome.examples, 3);
        assert_eq!(outcome.vocabulary, 6);
        assert_eq!(outcome.labels, 2);
        assert!(outcome.artifact_path.exists());

        let exported = outcome.training_set_path.unwrap();
        let set: TrainingSet = serde_json::from_str(&fs::read_to_string(exported).unwrap()).unwrap();
        assert_eq!(set.len(), 3);

        let models = SqliteModelRegistry::new(db.pool().clone())
            .list(Some(Language::En))
            .await
            .unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].fingerprint, outcome.fingerprint);
    }

    #[tokio::test]
    async fn test_reuse_artifact_keeps_index_assignment() {
        let db = seeded_db().await;
        let dir = tempfile::tempdir().unwrap();
        let request = EncodeRequest::new(Language::En, dir.path(), "system").with_seed(Some(1));
        let first = encode(db.pool(), &request).await.unwrap();

        // A new pattern adds a token the saved vocabulary does not know
        let repo = SqliteContextGraphRepository::new(db.pool().clone());
        let user = SqliteIdentityRepository::new(db.pool().clone())
            .ensure_user("system")
            .await
            .unwrap();
        let mut extra = NewContext::new("thanks");
        extra.labels.en = Some("Greeting".into());
        extra.patterns = vec![Pattern::new(Language::En, "cheers")];
        repo.insert_contribution(&NewContribution::new("T", &user.id, extra))
            .await
            .unwrap();

        let reused = encode(db.pool(), &request.clone().reusing_artifact(true))
            .await
            .unwrap();
        assert_eq!(reused.fingerprint, first.fingerprint);
        assert_eq!(reused.vocabulary, first.vocabulary);
        assert_eq!(reused.examples, 4);

        let rebuilt = encode(db.pool(), &request).await.unwrap();
        assert_ne!(rebuilt.fingerprint, first.fingerprint);
    }

    #[tokio::test]
    async fn test_encode_requires_known_actor() {
        let db = seeded_db().await;
        let dir = tempfile::tempdir().unwrap();

        let request = EncodeRequest::new(Language::En, dir.path(), "ghost");
        assert!(matches!(
            encode(db.pool(), &request).await,
            Err(Error::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_vectorize_with_saved_artifact() {
        let db = seeded_db().await;
        let dir = tempfile::tempdir().unwrap();
        encode(db.pool(), &EncodeRequest::new(Language::En, dir.path(), "system"))
            .await
            .unwrap();

        // [I, am, feel, great, happy, hello]
        let vector = vectorize(dir.path(), Language::En, "I am great").unwrap();
        assert_eq!(vector, vec![1.0, 1.0, 0.0, 1.0, 0.0, 0.0]);

        assert!(vectorize(dir.path(), Language::Fr, "bonjour").is_err());
    }
}
