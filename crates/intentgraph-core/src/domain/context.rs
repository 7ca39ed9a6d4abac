//! Context aggregate types
//!
//! A context is a conversational intent. It owns its patterns (example
//! utterances) and responses (canned replies) and links to related contexts
//! that model conversational follow-ups.

use serde::{Deserialize, Serialize};

use super::language::{Language, Localized};

/// A language-tagged text owned by a context
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalizedText {
    pub language: Language,
    pub text: String,
}

impl LocalizedText {
    pub fn new(language: Language, text: impl Into<String>) -> Self {
        Self {
            language,
            text: text.into(),
        }
    }
}

/// An example user utterance
pub type Pattern = LocalizedText;

/// A canned reply
pub type Response = LocalizedText;

/// Reference to a persisted context: its storage identity plus its code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextRef {
    pub id: String,
    pub code: String,
}

/// A context that has not been persisted yet
///
/// `related` holds only targets that already resolved to stored contexts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContext {
    pub code: String,
    pub labels: Localized,
    pub propositions: Localized,
    pub patterns: Vec<Pattern>,
    pub responses: Vec<Response>,
    pub related: Vec<ContextRef>,
}

impl NewContext {
    /// Create an empty context with the given code
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    /// Set the related contexts
    pub fn with_related(mut self, related: Vec<ContextRef>) -> Self {
        self.related = related;
        self
    }
}

/// A persisted context with its owned collections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub id: String,
    pub code: String,
    pub labels: Localized,
    pub propositions: Localized,
    pub contribution_id: String,
    pub patterns: Vec<Pattern>,
    pub responses: Vec<Response>,
    pub related: Vec<ContextRef>,
}

impl Context {
    /// Patterns written in one language
    pub fn patterns_in(&self, language: Language) -> impl Iterator<Item = &str> {
        self.patterns
            .iter()
            .filter(move |p| p.language == language)
            .map(|p| p.text.as_str())
    }

    /// Responses written in one language
    pub fn responses_in(&self, language: Language) -> impl Iterator<Item = &str> {
        self.responses
            .iter()
            .filter(move |r| r.language == language)
            .map(|r| r.text.as_str())
    }

    pub fn to_ref(&self) -> ContextRef {
        ContextRef {
            id: self.id.clone(),
            code: self.code.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_in_filters_by_language() {
        let context = Context {
            id: "1".into(),
            code: "greet".into(),
            labels: Localized::default(),
            propositions: Localized::default(),
            contribution_id: "c".into(),
            patterns: vec![
                Pattern::new(Language::En, "hi"),
                Pattern::new(Language::Fr, "salut"),
                Pattern::new(Language::En, "hello"),
            ],
            responses: vec![Response::new(Language::Ar, "مرحبا")],
            related: vec![],
        };

        assert_eq!(context.patterns_in(Language::En).collect::<Vec<_>>(), vec!["hi", "hello"]);
        assert_eq!(context.patterns_in(Language::Ar).count(), 0);
        assert_eq!(context.responses_in(Language::Ar).collect::<Vec<_>>(), vec!["مرحبا"]);
        assert_eq!(context.to_ref().code, "greet");
    }
}
