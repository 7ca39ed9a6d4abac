//! Context graph infrastructure implementations
//!
//! This module contains the SQLite implementation of the context graph
//! repository trait.

mod repository;

pub use repository::SqliteContextGraphRepository;
