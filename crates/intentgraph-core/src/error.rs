//! Error types for intentgraph

use thiserror::Error;

/// Result type alias using intentgraph's Error
pub type Result<T> = std::result::Result<T, Error>;

/// intentgraph error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Graph errors (E001-E099)
    #[error("Context '{0}' not found.")]
    ContextNotFound(String),

    #[error("A context with code '{0}' already exists.")]
    DuplicateCode(String),

    #[error("User '{0}' not found. Check `ingestion.actor` with `intentgraph config get ingestion.actor`.")]
    UserNotFound(String),

    // Source errors (E100-E199)
    #[error("Invalid source data in {source_name}: {message}")]
    InvalidSource {
        source_name: String,
        message: String,
    },

    #[error("Source lists are not aligned: '{language}' has {actual} records, expected {expected}")]
    MisalignedSources {
        language: String,
        expected: usize,
        actual: usize,
    },

    // Encoding errors (E200-E299)
    #[error("Label '{label}' is not part of the {language} label set")]
    UnknownLabel { label: String, language: String },

    #[error("Context '{code}' has {language} patterns but no {language} label")]
    UnlabeledContext { code: String, language: String },

    #[error("Encoding artifact mismatch: {0}")]
    ArtifactMismatch(String),

    // Database errors (E400-E499)
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::ContextNotFound(_) => "E001",
            Self::DuplicateCode(_) => "E002",
            Self::UserNotFound(_) => "E003",
            Self::InvalidSource { .. } => "E100",
            Self::MisalignedSources { .. } => "E101",
            Self::UnknownLabel { .. } => "E200",
            Self::UnlabeledContext { .. } => "E201",
            Self::ArtifactMismatch(_) => "E202",
            Self::DatabaseError(_) => "E400",
            Self::ConfigError(_) => "E600",
            Self::InvalidInput(_) => "E800",
            Self::Serialization(_) => "E801",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::DuplicateCode(_) => {
                Some("intentgraph seed --force --on-conflict skip".to_string())
            }
            Self::UserNotFound(name) => {
                Some(format!("intentgraph config set ingestion.actor {}", name))
            }
            Self::ArtifactMismatch(_) => Some("intentgraph encode --lang <lang>".to_string()),
            Self::UnknownLabel { language, .. } | Self::UnlabeledContext { language, .. } => {
                Some(format!("intentgraph encode --lang {}", language))
            }
            _ => None,
        }
    }

    /// Map a sqlx error raised while inserting `code`, turning unique
    /// violations into `DuplicateCode`
    pub fn from_insert(err: sqlx::Error, code: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::DuplicateCode(code.to_string())
            }
            _ => Self::DatabaseError(err),
        }
    }
}
