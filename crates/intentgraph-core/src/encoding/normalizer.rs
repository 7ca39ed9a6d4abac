//! Utterance normalization: tokenize, drop punctuation, lemmatize

use crate::domain::Language;

use super::lemmatizer::{self, Lemmatizer};
use super::tokenizer::{Tokenizer, is_punctuation};

/// Turns raw utterances into sequences of normalized tokens
pub struct Normalizer {
    tokenizer: Tokenizer,
    lemmatizer: Box<dyn Lemmatizer>,
}

impl Normalizer {
    /// Normalizer using the built-in rules for `language`
    pub fn for_language(language: Language) -> Self {
        Self {
            tokenizer: Tokenizer::new(language),
            lemmatizer: lemmatizer::for_language(language),
        }
    }

    /// Normalizer with a custom lemmatizer
    pub fn with_lemmatizer(language: Language, lemmatizer: Box<dyn Lemmatizer>) -> Self {
        Self {
            tokenizer: Tokenizer::new(language),
            lemmatizer,
        }
    }

    pub fn language(&self) -> Language {
        self.tokenizer.language()
    }

    /// Normalized tokens of `text`, in order, duplicates kept
    pub fn normalize(&self, text: &str) -> Vec<String> {
        self.tokenizer
            .tokenize(text)
            .into_iter()
            .filter(|token| !is_punctuation(token))
            .map(|token| self.lemmatizer.lemmatize(&token))
            .filter(|lemma| !lemma.is_empty())
            .collect()
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("language", &self.language())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_english() {
        let normalizer = Normalizer::for_language(Language::En);
        assert_eq!(normalizer.normalize("I am happy!"), vec!["I", "am", "happy"]);
        assert_eq!(
            normalizer.normalize("Any good books, please?"),
            vec!["Any", "good", "book", "please"]
        );
    }

    #[test]
    fn test_normalize_keeps_order_and_duplicates() {
        let normalizer = Normalizer::for_language(Language::En);
        assert_eq!(
            normalizer.normalize("cats and dogs and cats"),
            vec!["cat", "and", "dog", "and", "cat"]
        );
    }

    #[test]
    fn test_normalize_french_and_arabic() {
        let fr = Normalizer::for_language(Language::Fr);
        assert_eq!(fr.normalize("Les chevaux, l'écurie."), vec!["Les", "cheval", "l'", "écurie"]);

        let ar = Normalizer::for_language(Language::Ar);
        assert_eq!(ar.normalize("أَهْلاً بِكَ؟"), vec!["اهلا", "بك"]);
    }

    #[test]
    fn test_punctuation_only_utterance_is_empty() {
        let normalizer = Normalizer::for_language(Language::En);
        assert!(normalizer.normalize("?! ...").is_empty());
    }

    struct Lowercase;

    impl Lemmatizer for Lowercase {
        fn lemmatize(&self, token: &str) -> String {
            token.to_lowercase()
        }
    }

    #[test]
    fn test_custom_lemmatizer() {
        let normalizer = Normalizer::with_lemmatizer(Language::En, Box::new(Lowercase));
        assert_eq!(normalizer.normalize("Hello World"), vec!["hello", "world"]);
    }
}
