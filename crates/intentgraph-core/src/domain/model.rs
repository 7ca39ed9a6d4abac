//! Registry of persisted encoding artifacts and the models trained on them

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

use super::language::Language;

/// Whether a model may be served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelState {
    Enabled,
    #[default]
    Disabled,
}

impl ModelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "enabled" => Some(Self::Enabled),
            "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }
}

/// Deployment tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTag {
    Dev,
    Prod,
    #[default]
    None,
}

impl ModelTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Prod => "prod",
            Self::None => "none",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dev" => Some(Self::Dev),
            "prod" => Some(Self::Prod),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// One registered artifact directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub id: String,
    /// Path of the saved encoding artifact
    pub path: String,
    pub language: Language,
    /// Fingerprint of the vocabulary and label set the model was trained on
    pub fingerprint: String,
    pub state: ModelState,
    pub tag: ModelTag,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl ModelRecord {
    /// A disabled, untagged record created now
    pub fn new(
        path: impl Into<String>,
        language: Language,
        fingerprint: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            path: path.into(),
            language,
            fingerprint: fingerprint.into(),
            state: ModelState::default(),
            tag: ModelTag::default(),
            user_id: user_id.into(),
            created_at: Utc::now(),
        }
    }
}

/// Persistence for model records
#[async_trait]
pub trait ModelRegistry: Send + Sync {
    /// Record a saved artifact
    async fn register(&self, record: &ModelRecord) -> Result<()>;

    /// List records, newest first, optionally for one language
    async fn list(&self, language: Option<Language>) -> Result<Vec<ModelRecord>>;
}
