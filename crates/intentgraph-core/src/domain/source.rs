//! Raw per-language intent records, as authored in the seed datasets
//!
//! Each dataset is a JSON array with one object per intent. The three
//! language files are aligned by position: index `i` describes the same
//! intent in every language.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::language::Language;

/// One intent as written in a single language's dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceIntent {
    /// Stable cross-language key
    pub code: String,
    /// Display label in this language
    pub tag: String,
    /// Optional clarifying phrase; null, empty and missing all mean "absent"
    #[serde(default)]
    pub proposition: Option<String>,
    pub patterns: Vec<String>,
    pub responses: Vec<String>,
    /// Codes of related contexts
    pub to: Vec<String>,
    // Bulk seeding provenance, read from the first language only
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl SourceIntent {
    /// Minimal record with no patterns, responses or links
    pub fn new(code: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            tag: tag.into(),
            proposition: None,
            patterns: Vec::new(),
            responses: Vec::new(),
            to: Vec::new(),
            title: None,
            description: None,
            date: None,
        }
    }

    pub fn with_patterns(mut self, patterns: &[&str]) -> Self {
        self.patterns = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_responses(mut self, responses: &[&str]) -> Self {
        self.responses = responses.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn with_links(mut self, to: &[&str]) -> Self {
        self.to = to.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_proposition(mut self, proposition: impl Into<String>) -> Self {
        self.proposition = Some(proposition.into());
        self
    }

    pub fn with_provenance(mut self, title: &str, description: Option<&str>, date: &str) -> Self {
        self.title = Some(title.to_string());
        self.description = description.map(str::to_string);
        self.date = Some(date.to_string());
        self
    }

    /// The proposition, with blank values folded to `None`
    pub fn normalized_proposition(&self) -> Option<String> {
        self.proposition
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
    }
}

/// A whole dataset for one language
#[derive(Debug, Clone)]
pub struct LanguageSource {
    pub language: Language,
    /// Where the records came from, for error messages
    pub name: String,
    pub records: Vec<SourceIntent>,
}

impl LanguageSource {
    pub fn new(language: Language, name: impl Into<String>, records: Vec<SourceIntent>) -> Self {
        Self {
            language,
            name: name.into(),
            records,
        }
    }

    /// Parse a dataset from a JSON string
    pub fn from_json_str(language: Language, name: impl Into<String>, json: &str) -> Result<Self> {
        let name = name.into();
        let records: Vec<SourceIntent> =
            serde_json::from_str(json).map_err(|e| Error::InvalidSource {
                source_name: name.clone(),
                message: e.to_string(),
            })?;

        for (index, record) in records.iter().enumerate() {
            if record.code.trim().is_empty() {
                return Err(Error::InvalidSource {
                    source_name: name,
                    message: format!("record {} has an empty code", index),
                });
            }
        }

        Ok(Self::new(language, name, records))
    }

    /// Read a dataset from a JSON file
    pub fn from_path(language: Language, path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(language, path.display().to_string(), &json)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dataset() {
        let json = r#"[
            {"code": "greet", "tag": "Greeting", "proposition": null,
             "patterns": ["hi", "hello"], "responses": ["hey"], "to": [],
             "title": "Greetings", "description": null, "date": "2021-03-14"},
            {"code": "bye", "tag": "Goodbye",
             "patterns": ["bye"], "responses": ["see you"], "to": ["greet"]}
        ]"#;

        let source = LanguageSource::from_json_str(Language::En, "en.json", json).unwrap();
        assert_eq!(source.len(), 2);
        assert_eq!(source.records[0].title.as_deref(), Some("Greetings"));
        assert_eq!(source.records[1].proposition, None);
        assert_eq!(source.records[1].to, vec!["greet"]);
    }

    #[test]
    fn test_missing_required_field_is_invalid_source() {
        let json = r#"[{"code": "greet", "patterns": [], "responses": [], "to": []}]"#;

        let err = LanguageSource::from_json_str(Language::En, "en.json", json).unwrap_err();
        match err {
            Error::InvalidSource { source_name, message } => {
                assert_eq!(source_name, "en.json");
                assert!(message.contains("tag"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_code_is_invalid_source() {
        let json = r#"[{"code": " ", "tag": "x", "patterns": [], "responses": [], "to": []}]"#;
        assert!(matches!(
            LanguageSource::from_json_str(Language::Fr, "fr.json", json),
            Err(Error::InvalidSource { .. })
        ));
    }

    #[test]
    fn test_normalized_proposition() {
        let record = SourceIntent::new("a", "A");
        assert_eq!(record.normalized_proposition(), None);
        assert_eq!(record.clone().with_proposition("   ").normalized_proposition(), None);
        assert_eq!(
            record.with_proposition(" Do you want more? ").normalized_proposition(),
            Some("Do you want more?".to_string())
        );
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ar.json");
        std::fs::write(
            &path,
            r#"[{"code": "greet", "tag": "تحية", "patterns": ["مرحبا"], "responses": ["أهلا"], "to": []}]"#,
        )
        .unwrap();

        let source = LanguageSource::from_path(Language::Ar, &path).unwrap();
        assert_eq!(source.language, Language::Ar);
        assert_eq!(source.records[0].tag, "تحية");
    }
}
