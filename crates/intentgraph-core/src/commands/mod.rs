//! Commands module - all operations as library functions
//!
//! These commands are used by the CLI.

pub mod encode;
pub mod models;
pub mod seed;
pub mod stats;

pub use encode::{EncodeOutcome, EncodeRequest, encode, vectorize};
pub use models::list_models;
pub use seed::{SeedOutcome, SeedSources, ingest_language, seed};
pub use stats::{StatsReport, get_stats};
