//! intentgraph core library
//!
//! This crate provides the core functionality for intentgraph, including:
//! - Storage (SQLite, versioned migrations)
//! - The multilingual context graph and its repositories
//! - Graph ingestion (record merging, relation resolution, attribution)
//! - Feature encoding (normalization, vocabulary, vectorization, training sets)
//! - Commands used by the CLI

pub mod commands;
pub mod config;
pub mod domain;
pub mod encoding;
pub mod error;
pub mod infrastructure;
pub mod ingestion;
pub mod storage;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::{ContextGraphRepository, Language};
    pub use crate::error::{Error, Result};
    pub use crate::ingestion::{ConflictPolicy, IngestionOptions, ResolutionStrategy};
    pub use crate::storage::Database;
}
