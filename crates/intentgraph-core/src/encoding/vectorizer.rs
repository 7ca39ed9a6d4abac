//! Bag-of-words and one-hot encoding

use crate::domain::Language;
use crate::error::{Error, Result};

use super::artifact::EncodingArtifact;
use super::normalizer::Normalizer;
use super::vocabulary::{LabelSet, Vocabulary};

/// Encodes utterances and labels against a fixed vocabulary and label set
#[derive(Debug)]
pub struct Vectorizer {
    normalizer: Normalizer,
    vocabulary: Vocabulary,
    labels: LabelSet,
}

impl Vectorizer {
    pub fn new(language: Language, vocabulary: Vocabulary, labels: LabelSet) -> Self {
        Self {
            normalizer: Normalizer::for_language(language),
            vocabulary,
            labels,
        }
    }

    /// Vectorizer with the exact index assignment of a saved artifact
    pub fn from_artifact(artifact: &EncodingArtifact) -> Self {
        Self::new(
            artifact.language,
            artifact.vocabulary.clone(),
            artifact.labels.clone(),
        )
    }

    pub fn language(&self) -> Language {
        self.normalizer.language()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Presence vector over the vocabulary; unknown tokens are ignored
    pub fn encode_input(&self, utterance: &str) -> Vec<f32> {
        self.encode_tokens(&self.normalizer.normalize(utterance))
    }

    /// Presence vector for already normalized tokens
    pub fn encode_tokens(&self, tokens: &[String]) -> Vec<f32> {
        let mut vector = vec![0.0; self.vocabulary.len()];
        for token in tokens {
            if let Some(index) = self.vocabulary.index_of(token) {
                vector[index] = 1.0;
            }
        }
        vector
    }

    /// One-hot vector of `label`
    pub fn encode_label(&self, label: &str) -> Result<Vec<f32>> {
        let index = self
            .labels
            .index_of(label)
            .ok_or_else(|| Error::UnknownLabel {
                label: label.to_string(),
                language: self.language().to_string(),
            })?;

        let mut vector = vec![0.0; self.labels.len()];
        vector[index] = 1.0;
        Ok(vector)
    }

    /// Label of the highest-scoring position in a classifier output
    pub fn decode_label(&self, scores: &[f32]) -> Option<&str> {
        scores
            .iter()
            .enumerate()
            .filter(|(_, score)| !score.is_nan())
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .and_then(|(index, _)| self.labels.label_at(index))
    }
}
