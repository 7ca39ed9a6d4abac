//! Identity infrastructure implementations

mod repository;

pub use repository::SqliteIdentityRepository;
