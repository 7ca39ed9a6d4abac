//! Encoding artifact
//!
//! The vocabulary and label set a classifier was trained against, saved next
//! to the model so later utterances are encoded with the same index
//! assignment.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::domain::Language;
use crate::error::{Error, Result};

use super::vocabulary::{LabelSet, Vocabulary};

/// Current on-disk format
pub const FORMAT_VERSION: u32 = 1;

/// Persisted vocabulary and label set of one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingArtifact {
    pub format_version: u32,
    pub language: Language,
    pub vocabulary: Vocabulary,
    pub labels: LabelSet,
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
}

impl EncodingArtifact {
    pub fn new(language: Language, vocabulary: Vocabulary, labels: LabelSet) -> Self {
        let fingerprint = compute_fingerprint(language, &vocabulary, &labels);
        Self {
            format_version: FORMAT_VERSION,
            language,
            vocabulary,
            labels,
            fingerprint,
            created_at: Utc::now(),
        }
    }

    /// File name used inside an output directory
    pub fn file_name(language: Language) -> String {
        format!("artifact_{}.json", language.as_str())
    }

    /// Path of the artifact for `language` inside `dir`
    pub fn path_in(dir: &Path, language: Language) -> PathBuf {
        dir.join(Self::file_name(language))
    }

    /// Write the artifact into `dir`, creating it if needed
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = Self::path_in(dir, self.language);
        fs::write(&path, serde_json::to_string_pretty(self)?)?;

        info!(
            path = %path.display(),
            language = %self.language,
            tokens = self.vocabulary.len(),
            labels = self.labels.len(),
            "Encoding artifact saved"
        );
        Ok(path)
    }

    /// Read and verify an artifact file
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let artifact: Self = serde_json::from_str(&json)?;
        artifact.verify()?;
        Ok(artifact)
    }

    /// Read and verify the artifact for `language` inside `dir`
    pub fn load_from_dir(dir: &Path, language: Language) -> Result<Self> {
        Self::load(&Self::path_in(dir, language))
    }

    /// Check the format version and that the fingerprint matches the content
    pub fn verify(&self) -> Result<()> {
        if self.format_version != FORMAT_VERSION {
            return Err(Error::ArtifactMismatch(format!(
                "unsupported format version {} (expected {})",
                self.format_version, FORMAT_VERSION
            )));
        }

        let expected = compute_fingerprint(self.language, &self.vocabulary, &self.labels);
        if expected != self.fingerprint {
            return Err(Error::ArtifactMismatch(format!(
                "fingerprint {} does not match content ({})",
                self.fingerprint, expected
            )));
        }
        Ok(())
    }
}

/// SHA-256 over the language, vocabulary and labels
pub fn compute_fingerprint(language: Language, vocabulary: &Vocabulary, labels: &LabelSet) -> String {
    let mut hasher = Sha256::new();
    hasher.update(language.as_str().as_bytes());
    // Unit and record separators keep ["ab"] and ["a", "b"] distinct
    hasher.update([0x1e]);
    for token in vocabulary.tokens() {
        hasher.update(token.as_bytes());
        hasher.update([0x1f]);
    }
    hasher.update([0x1e]);
    for label in labels.labels() {
        hasher.update(label.as_bytes());
        hasher.update([0x1f]);
    }
    hex::encode(hasher.finalize())
}
