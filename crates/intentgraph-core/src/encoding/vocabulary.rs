//! Vocabulary and label set
//!
//! Both are sorted, deduplicated sequences; a value's position is its vector
//! index. Strings sort by Unicode scalar value, so the order is stable across
//! platforms and runs.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{ContextGraphRepository, Language};
use crate::error::Result;

use super::normalizer::Normalizer;

/// An ordered set of strings with constant-time index lookup
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct IndexedSet {
    items: Vec<String>,
    index: HashMap<String, usize>,
}

impl IndexedSet {
    fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items
            .into_iter()
            .map(Into::into)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let index = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.clone(), i))
            .collect();
        Self { items, index }
    }
}

/// Sorted distinct normalized tokens of one language
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary(IndexedSet);

impl Vocabulary {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(IndexedSet::new(tokens))
    }

    /// Vocabulary of every normalized token in `utterances`
    pub fn from_utterances<'a>(
        normalizer: &Normalizer,
        utterances: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self::new(utterances.into_iter().flat_map(|u| normalizer.normalize(u)))
    }

    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.0.index.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.index.contains_key(token)
    }

    pub fn tokens(&self) -> &[String] {
        &self.0.items
    }

    pub fn len(&self) -> usize {
        self.0.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.items.is_empty()
    }
}

impl From<Vec<String>> for Vocabulary {
    fn from(tokens: Vec<String>) -> Self {
        Self::new(tokens)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.0.items
    }
}

/// Sorted distinct labels of one language
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct LabelSet(IndexedSet);

impl LabelSet {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(IndexedSet::new(labels))
    }

    /// One-hot position of `label`
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.0.index.get(label).copied()
    }

    /// Label at a one-hot position
    pub fn label_at(&self, index: usize) -> Option<&str> {
        self.0.items.get(index).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.0.items
    }

    pub fn len(&self) -> usize {
        self.0.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.items.is_empty()
    }
}

impl From<Vec<String>> for LabelSet {
    fn from(labels: Vec<String>) -> Self {
        Self::new(labels)
    }
}

impl From<LabelSet> for Vec<String> {
    fn from(labels: LabelSet) -> Self {
        labels.0.items
    }
}

/// Derives the vocabulary and label set of a language from the stored graph
pub struct VocabularyBuilder<'a> {
    repository: &'a dyn ContextGraphRepository,
}

impl<'a> VocabularyBuilder<'a> {
    pub fn new(repository: &'a dyn ContextGraphRepository) -> Self {
        Self { repository }
    }

    /// Distinct labels of every context labelled in `language`
    pub async fn build_labels(&self, language: Language) -> Result<LabelSet> {
        let labels = LabelSet::new(self.repository.list_labels(language).await?);
        debug!(language = %language, labels = labels.len(), "Label set built");
        Ok(labels)
    }

    /// Distinct normalized tokens of every `language` pattern
    pub async fn build_vocabulary(
        &self,
        language: Language,
        normalizer: &Normalizer,
    ) -> Result<Vocabulary> {
        let patterns = self.repository.list_patterns(language).await?;
        let vocabulary = Vocabulary::from_utterances(normalizer, patterns.iter().map(String::as_str));
        debug!(
            language = %language,
            patterns = patterns.len(),
            tokens = vocabulary.len(),
            "Vocabulary built"
        );
        Ok(vocabulary)
    }

    /// Both, with the built-in normalizer for `language`
    pub async fn build(&self, language: Language) -> Result<(Vocabulary, LabelSet)> {
        let normalizer = Normalizer::for_language(language);
        let vocabulary = self.build_vocabulary(language, &normalizer).await?;
        let labels = self.build_labels(language).await?;
        Ok((vocabulary, labels))
    }
}
