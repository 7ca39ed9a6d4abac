//! Domain layer
//!
//! Contains the context graph model and the storage seams.
//!
//! ## Data Model
//!
//! - **Context**: a conversational intent, keyed by a unique `code`
//! - **Pattern / Response**: language-tagged texts owned by a context
//! - **Contribution**: provenance record owning exactly one context
//! - **User**: identity credited as contributor and validator
//! - **ModelRecord**: a persisted encoding artifact

pub mod context;
pub mod contribution;
pub mod identity;
pub mod language;
pub mod model;
pub mod repository;
pub mod source;

pub use context::{Context, ContextRef, LocalizedText, NewContext, Pattern, Response};
pub use contribution::{Contribution, ContributionStatus, NewContribution};
pub use identity::{IdentityRepository, IngestionActor, User, UserStatus};
pub use language::{Language, Localized};
pub use model::{ModelRecord, ModelRegistry, ModelState, ModelTag};
pub use repository::{ContextGraphRepository, GraphStats, LabelledPattern};
pub use source::{LanguageSource, SourceIntent};
