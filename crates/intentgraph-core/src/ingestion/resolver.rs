//! Relation resolver
//!
//! Turns the `to` codes of a record into references to persisted contexts.
//! Only contexts already in storage can be linked; anything else is dropped
//! and reported.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{ContextGraphRepository, ContextRef};
use crate::error::Result;

/// A relation that could not be created because its target is not stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedLink {
    pub from: String,
    pub to: String,
}

/// Outcome of resolving one record's relation codes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Distinct targets in first-seen order
    pub targets: Vec<ContextRef>,
    pub dropped: Vec<DroppedLink>,
}

/// Resolves relation codes against the context graph
pub struct RelationResolver<'a> {
    repository: &'a dyn ContextGraphRepository,
}

impl<'a> RelationResolver<'a> {
    pub fn new(repository: &'a dyn ContextGraphRepository) -> Self {
        Self { repository }
    }

    /// Resolve the codes referenced by the context `from`
    pub async fn resolve(&self, from: &str, codes: &[String]) -> Result<Resolution> {
        let mut resolution = Resolution::default();
        let mut seen = HashSet::new();

        for code in codes {
            match self.repository.find_context_by_code(code).await? {
                Some(target) => {
                    if seen.insert(target.id.clone()) {
                        resolution.targets.push(target);
                    }
                }
                None => {
                    warn!(from = %from, to = %code, "Dropping link to unknown context");
                    resolution.dropped.push(DroppedLink {
                        from: from.to_string(),
                        to: code.clone(),
                    });
                }
            }
        }

        Ok(resolution)
    }
}
