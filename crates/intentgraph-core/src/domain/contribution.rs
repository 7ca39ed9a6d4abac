//! Contribution: the provenance record that owns exactly one context

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::context::NewContext;

/// Review status of a contribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionStatus {
    #[default]
    Pending,
    Valid,
    Invalid,
}

impl ContributionStatus {
    /// Convert to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        }
    }

    /// Parse from database string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "valid" => Some(Self::Valid),
            "invalid" => Some(Self::Invalid),
            _ => None,
        }
    }
}

/// A contribution about to be inserted together with its context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContribution {
    pub title: String,
    pub description: Option<String>,
    pub status: ContributionStatus,
    pub contributor_id: String,
    pub validator_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub validated_at: Option<DateTime<Utc>>,
    pub context: NewContext,
}

impl NewContribution {
    /// Create a pending contribution for a context
    pub fn new(title: impl Into<String>, contributor_id: impl Into<String>, context: NewContext) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: ContributionStatus::Pending,
            contributor_id: contributor_id.into(),
            validator_id: None,
            created_at: Utc::now(),
            validated_at: None,
            context,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Set the creation time
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    /// Mark the contribution valid, reviewed by `validator_id` at `at`
    pub fn validated_by(mut self, validator_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        self.status = ContributionStatus::Valid;
        self.validator_id = Some(validator_id.into());
        self.validated_at = Some(at);
        self
    }
}

/// A persisted contribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: ContributionStatus,
    pub contributor_id: String,
    pub validator_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub validated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_contribution_is_pending() {
        let contribution = NewContribution::new("Greetings", "u1", NewContext::new("greet"));
        assert_eq!(contribution.status, ContributionStatus::Pending);
        assert!(contribution.validator_id.is_none());
        assert!(contribution.validated_at.is_none());
    }

    #[test]
    fn test_validated_by_stamps_validator() {
        let at = Utc.with_ymd_and_hms(2021, 3, 14, 0, 0, 0).unwrap();
        let contribution = NewContribution::new("Greetings", "u1", NewContext::new("greet"))
            .created_at(at)
            .validated_by("u1", at);

        assert_eq!(contribution.status, ContributionStatus::Valid);
        assert_eq!(contribution.validator_id.as_deref(), Some("u1"));
        assert_eq!(contribution.validated_at, Some(at));
        assert_eq!(contribution.created_at, at);
    }

    #[test]
    fn test_status_parsing() {
        for status in [
            ContributionStatus::Pending,
            ContributionStatus::Valid,
            ContributionStatus::Invalid,
        ] {
            assert_eq!(ContributionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ContributionStatus::parse("approved"), None);
    }
}
