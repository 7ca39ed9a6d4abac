//! Model registry infrastructure implementations

mod repository;

pub use repository::SqliteModelRegistry;
