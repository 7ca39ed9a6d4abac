//! Supported languages and per-language fields

use serde::{Deserialize, Serialize};

/// A language the chatbot is authored in
///
/// The set is closed: every context carries one label and one proposition
/// column per variant, and training artifacts are produced per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Fr,
    Ar,
}

impl Language {
    /// Get the string representation (ISO 639-1)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
            Self::Ar => "ar",
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Self::En),
            "fr" | "french" | "français" => Some(Self::Fr),
            "ar" | "arabic" => Some(Self::Ar),
            _ => None,
        }
    }

    /// Get all languages, in seeding order
    pub fn all() -> &'static [Language] {
        &[Self::En, Self::Fr, Self::Ar]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One optional string per supported language (`label_en`, `label_fr`, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localized {
    pub en: Option<String>,
    pub fr: Option<String>,
    pub ar: Option<String>,
}

impl Localized {
    /// Get the value for a language
    pub fn get(&self, language: Language) -> Option<&str> {
        match language {
            Language::En => self.en.as_deref(),
            Language::Fr => self.fr.as_deref(),
            Language::Ar => self.ar.as_deref(),
        }
    }

    /// Set the value for a language
    pub fn set(&mut self, language: Language, value: Option<String>) {
        let slot = match language {
            Language::En => &mut self.en,
            Language::Fr => &mut self.fr,
            Language::Ar => &mut self.ar,
        };
        *slot = value;
    }

    /// Languages that have a value
    pub fn languages(&self) -> Vec<Language> {
        Language::all()
            .iter()
            .copied()
            .filter(|lang| self.get(*lang).is_some())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.en.is_none() && self.fr.is_none() && self.ar.is_none()
    }
}
