//! Infrastructure layer
//!
//! Contains SQLite implementations of the domain repository traits.

pub mod graph;
pub mod identity;
pub mod models;

pub use graph::SqliteContextGraphRepository;
pub use identity::SqliteIdentityRepository;
pub use models::SqliteModelRegistry;
