//! Repository trait for context graph persistence
//!
//! The trait abstracts over storage backends. Every write method is a single
//! transaction: a context aggregate is inserted whole or not at all, and a
//! batch of relation edges is attached whole or not at all.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::context::{Context, ContextRef};
use super::contribution::{Contribution, NewContribution};
use super::language::Language;

/// Repository trait for context graph persistence
#[async_trait]
pub trait ContextGraphRepository: Send + Sync {
    // ========== Write Operations ==========

    /// Insert a contribution together with its context, patterns, responses
    /// and relation edges. Fails with `DuplicateCode` if the code is taken.
    async fn insert_contribution(&self, contribution: &NewContribution) -> Result<ContextRef>;

    /// Attach relation edges from an existing context. Edges that already
    /// exist are left untouched. Returns the number of edges created.
    async fn link_related(&self, context_id: &str, related: &[ContextRef]) -> Result<usize>;

    /// Delete a contribution; cascades to its context and everything it owns
    async fn delete_contribution(&self, contribution_id: &str) -> Result<bool>;

    // ========== Lookups ==========

    /// Exact-match lookup of a context by code
    async fn find_context_by_code(&self, code: &str) -> Result<Option<ContextRef>>;

    /// Load a full context aggregate by code
    async fn get_context(&self, code: &str) -> Result<Option<Context>>;

    /// Load a contribution by ID
    async fn get_contribution(&self, id: &str) -> Result<Option<Contribution>>;

    /// Count contexts
    async fn count_contexts(&self) -> Result<u64>;

    /// Count contributions
    async fn count_contributions(&self) -> Result<u64>;

    /// Aggregate counts across the graph
    async fn get_stats(&self) -> Result<GraphStats>;

    // ========== Language Projections ==========

    /// Labels of every context labelled in `language`, in storage order
    async fn list_labels(&self, language: Language) -> Result<Vec<String>>;

    /// Texts of every pattern tagged with `language`
    async fn list_patterns(&self, language: Language) -> Result<Vec<String>>;

    /// Every `language` pattern paired with its context's `language` label
    async fn list_labelled_patterns(&self, language: Language) -> Result<Vec<LabelledPattern>>;
}

/// A pattern with the label of the context that owns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelledPattern {
    pub context_code: String,
    /// `None` when the context has no label in the requested language
    pub label: Option<String>,
    pub text: String,
}

/// Statistics about the context graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub contexts: u64,
    pub contributions: u64,
    pub patterns: u64,
    pub responses: u64,
    pub relations: u64,
}
