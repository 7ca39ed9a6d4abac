//! Graph ingestion
//!
//! Reads per-language intent datasets, merges them into multilingual records,
//! resolves relation codes and persists everything as attributed
//! contributions.
//!
//! ## Pipeline
//!
//! 1. [`RecordMerger`] folds aligned language lists into [`UnifiedRecord`]s
//! 2. [`IngestionDriver`] inserts each record in its own transaction
//! 3. [`RelationResolver`] turns `to` codes into stored context references

pub mod driver;
pub mod merger;
pub mod resolver;

pub use driver::{
    ConflictPolicy, IngestReport, IngestionDriver, IngestionOptions, ResolutionStrategy,
    resolve_actor,
};
pub use merger::{DEFAULT_TITLE, MergeMode, Provenance, RecordMerger, UnifiedRecord, merge_single};
pub use resolver::{DroppedLink, RelationResolver, Resolution};
