//! Record merger
//!
//! Folds position-aligned per-language datasets into one multilingual record
//! per intent.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::domain::{LanguageSource, Localized, NewContext, Pattern, Response, SourceIntent};
use crate::error::{Error, Result};

/// Title given to contributions created without bulk provenance
pub const DEFAULT_TITLE: &str = "NO TITLE";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// How provenance is obtained for merged records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// Seed datasets: title and date are required on the first language
    #[default]
    Bulk,
    /// Ad-hoc additions: no provenance, default title, current time
    AdHoc,
}

/// Contribution metadata carried by bulk seed datasets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
}

impl Provenance {
    /// Midnight UTC on the provenance date
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.date.and_time(chrono::NaiveTime::MIN).and_utc()
    }
}

/// One intent merged across every supplied language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedRecord {
    pub code: String,
    pub labels: Localized,
    pub propositions: Localized,
    pub patterns: Vec<Pattern>,
    pub responses: Vec<Response>,
    /// Related codes in first-seen order, not yet resolved
    pub to_codes: Vec<String>,
    pub provenance: Option<Provenance>,
}

impl UnifiedRecord {
    /// Contribution title
    pub fn title(&self) -> &str {
        self.provenance
            .as_ref()
            .map(|p| p.title.as_str())
            .unwrap_or(DEFAULT_TITLE)
    }

    /// Contribution description
    pub fn description(&self) -> Option<String> {
        self.provenance.as_ref().and_then(|p| p.description.clone())
    }

    /// Contribution timestamp: the provenance date, or now when there is none
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.provenance
            .as_ref()
            .map(Provenance::timestamp)
            .unwrap_or_else(Utc::now)
    }

    /// The context aggregate, without relations
    pub fn to_new_context(&self) -> NewContext {
        NewContext {
            code: self.code.clone(),
            labels: self.labels.clone(),
            propositions: self.propositions.clone(),
            patterns: self.patterns.clone(),
            responses: self.responses.clone(),
            related: Vec::new(),
        }
    }
}

/// Merges aligned language datasets into unified records
#[derive(Debug, Clone, Default)]
pub struct RecordMerger {
    mode: MergeMode,
}

impl RecordMerger {
    pub fn new(mode: MergeMode) -> Self {
        Self { mode }
    }

    /// Merger for seed datasets
    pub fn bulk() -> Self {
        Self::new(MergeMode::Bulk)
    }

    /// Merger for ad-hoc additions
    pub fn ad_hoc() -> Self {
        Self::new(MergeMode::AdHoc)
    }

    pub fn mode(&self) -> MergeMode {
        self.mode
    }

    /// Merge the sources index by index.
    ///
    /// Provenance comes from the first source. When codes disagree at an index
    /// the last source's code is kept. All sources must have the same length.
    pub fn merge(&self, sources: &[LanguageSource]) -> Result<Vec<UnifiedRecord>> {
        let Some(primary) = sources.first() else {
            return Err(Error::InvalidInput("at least one language source is required".into()));
        };

        let mut seen = HashSet::new();
        for source in sources {
            if !seen.insert(source.language) {
                return Err(Error::InvalidInput(format!(
                    "language '{}' was supplied more than once",
                    source.language
                )));
            }
            if source.len() != primary.len() {
                return Err(Error::MisalignedSources {
                    language: source.language.to_string(),
                    expected: primary.len(),
                    actual: source.len(),
                });
            }
        }

        (0..primary.len())
            .map(|index| self.merge_at(sources, index))
            .collect()
    }

    fn merge_at(&self, sources: &[LanguageSource], index: usize) -> Result<UnifiedRecord> {
        let primary = &sources[0];
        let head = &primary.records[index];

        let mut record = UnifiedRecord {
            code: head.code.trim().to_string(),
            labels: Localized::default(),
            propositions: Localized::default(),
            patterns: Vec::new(),
            responses: Vec::new(),
            to_codes: Vec::new(),
            provenance: match self.mode {
                MergeMode::Bulk => Some(read_provenance(primary, index, head)?),
                MergeMode::AdHoc => None,
            },
        };

        let mut seen_texts = HashSet::new();
        let mut seen_codes = HashSet::new();

        for source in sources {
            let language = source.language;
            let entry = &source.records[index];

            let code = entry.code.trim();
            if code != record.code {
                warn!(
                    index,
                    language = %language,
                    previous = %record.code,
                    found = %code,
                    "Code differs across languages, keeping the later one"
                );
                record.code = code.to_string();
            }

            record.labels.set(language, Some(entry.tag.clone()));
            record
                .propositions
                .set(language, entry.normalized_proposition());

            for text in &entry.patterns {
                if seen_texts.insert((TextKind::Pattern, language, text.as_str())) {
                    record.patterns.push(Pattern::new(language, text.clone()));
                }
            }
            for text in &entry.responses {
                if seen_texts.insert((TextKind::Response, language, text.as_str())) {
                    record.responses.push(Response::new(language, text.clone()));
                }
            }
            for code in &entry.to {
                let code = code.trim();
                if !code.is_empty() && seen_codes.insert(code.to_string()) {
                    record.to_codes.push(code.to_string());
                }
            }
        }

        debug!(
            code = %record.code,
            patterns = record.patterns.len(),
            responses = record.responses.len(),
            links = record.to_codes.len(),
            "Merged record"
        );

        Ok(record)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TextKind {
    Pattern,
    Response,
}

fn read_provenance(source: &LanguageSource, index: usize, entry: &SourceIntent) -> Result<Provenance> {
    let invalid = |message: String| Error::InvalidSource {
        source_name: source.name.clone(),
        message,
    };

    let title = entry
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| invalid(format!("record {} ('{}') has no title", index, entry.code)))?;

    let raw_date = entry
        .date
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| invalid(format!("record {} ('{}') has no date", index, entry.code)))?;

    let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|e| {
        invalid(format!(
            "record {} ('{}') has an invalid date '{}': {}",
            index, entry.code, raw_date, e
        ))
    })?;

    Ok(Provenance {
        title: title.to_string(),
        description: entry
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        date,
    })
}

/// Convenience for a single-language ad-hoc merge
pub fn merge_single(source: LanguageSource) -> Result<Vec<UnifiedRecord>> {
    RecordMerger::ad_hoc().merge(std::slice::from_ref(&source))
}
