//! Graph ingestion driver
//!
//! Persists unified records as attributed contributions and links their
//! relations. Each record is committed in its own transaction; a failure
//! aborts the rest of the run and keeps everything committed before it.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{
    ContextGraphRepository, ContextRef, IdentityRepository, IngestionActor, NewContribution,
};
use crate::error::{Error, Result};

use super::merger::UnifiedRecord;
use super::resolver::{DroppedLink, RelationResolver};

/// When relations are resolved relative to insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Resolve while inserting each record, in reverse input order.
    /// A link to a record that comes earlier in the input is dropped.
    Sequential,
    /// Insert every record first, then link relations
    #[default]
    TwoPhase,
}

impl ResolutionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::TwoPhase => "two_phase",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sequential" => Some(Self::Sequential),
            "two_phase" | "two-phase" => Some(Self::TwoPhase),
            _ => None,
        }
    }
}

/// What to do with a record whose code is already stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Abort the run with `DuplicateCode`
    #[default]
    Fail,
    /// Leave the stored record alone, but still attach its relations
    Skip,
}

impl ConflictPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::Skip => "skip",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fail" => Some(Self::Fail),
            "skip" => Some(Self::Skip),
            _ => None,
        }
    }
}

/// Ingestion run options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestionOptions {
    pub strategy: ResolutionStrategy,
    pub on_conflict: ConflictPolicy,
}

impl IngestionOptions {
    pub fn with_strategy(mut self, strategy: ResolutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_conflict_policy(mut self, on_conflict: ConflictPolicy) -> Self {
        self.on_conflict = on_conflict;
        self
    }
}

/// Summary of an ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub inserted: usize,
    pub skipped: usize,
    pub links_created: usize,
    pub dropped_links: Vec<DroppedLink>,
}

/// Look up the configured ingestion actor.
///
/// With `create_if_missing` the user is created on first use; otherwise an
/// unknown username is `UserNotFound`.
pub async fn resolve_actor(
    identity: &dyn IdentityRepository,
    username: &str,
    create_if_missing: bool,
) -> Result<IngestionActor> {
    let user = if create_if_missing {
        identity.ensure_user(username).await?
    } else {
        identity
            .find_by_username(username)
            .await?
            .ok_or_else(|| Error::UserNotFound(username.to_string()))?
    };
    Ok(IngestionActor::from(&user))
}

/// Writes unified records into the context graph
pub struct IngestionDriver<'a> {
    repository: &'a dyn ContextGraphRepository,
    actor: IngestionActor,
    options: IngestionOptions,
}

impl<'a> IngestionDriver<'a> {
    pub fn new(repository: &'a dyn ContextGraphRepository, actor: IngestionActor) -> Self {
        Self {
            repository,
            actor,
            options: IngestionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: IngestionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> IngestionOptions {
        self.options
    }

    /// Ingest records, processing them from last to first
    pub async fn ingest(&self, records: &[UnifiedRecord]) -> Result<IngestReport> {
        info!(
            records = records.len(),
            strategy = self.options.strategy.as_str(),
            on_conflict = self.options.on_conflict.as_str(),
            actor = %self.actor.username,
            "Starting ingestion"
        );

        let report = match self.options.strategy {
            ResolutionStrategy::Sequential => self.ingest_sequential(records).await?,
            ResolutionStrategy::TwoPhase => self.ingest_two_phase(records).await?,
        };

        info!(
            inserted = report.inserted,
            skipped = report.skipped,
            links_created = report.links_created,
            dropped_links = report.dropped_links.len(),
            "Ingestion complete"
        );

        Ok(report)
    }

    async fn ingest_sequential(&self, records: &[UnifiedRecord]) -> Result<IngestReport> {
        let resolver = RelationResolver::new(self.repository);
        let mut report = IngestReport::default();

        for record in records.iter().rev() {
            let resolution = resolver.resolve(&record.code, &record.to_codes).await?;

            match self.insert(record, resolution.targets.clone()).await? {
                Some(_) => {
                    report.inserted += 1;
                    report.links_created += resolution.targets.len();
                }
                None => {
                    report.skipped += 1;
                    let context = self.existing(&record.code).await?;
                    report.links_created += self
                        .repository
                        .link_related(&context.id, &resolution.targets)
                        .await?;
                }
            }
            report.dropped_links.extend(resolution.dropped);
        }

        Ok(report)
    }

    async fn ingest_two_phase(&self, records: &[UnifiedRecord]) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        // Skipped records are linked too, so a re-run completes the edges of
        // contexts committed by an earlier run that failed before phase 2
        let mut to_link: Vec<(ContextRef, &UnifiedRecord)> = Vec::with_capacity(records.len());

        for record in records.iter().rev() {
            match self.insert(record, Vec::new()).await? {
                Some(context) => {
                    report.inserted += 1;
                    to_link.push((context, record));
                }
                None => {
                    report.skipped += 1;
                    to_link.push((self.existing(&record.code).await?, record));
                }
            }
        }
        info!(inserted = report.inserted, skipped = report.skipped, "Contexts inserted");

        let resolver = RelationResolver::new(self.repository);
        for (context, record) in &to_link {
            let resolution = resolver.resolve(&record.code, &record.to_codes).await?;
            report.links_created += self
                .repository
                .link_related(&context.id, &resolution.targets)
                .await?;
            report.dropped_links.extend(resolution.dropped);
        }
        info!(links_created = report.links_created, "Relations linked");

        Ok(report)
    }

    /// The stored context of a skipped record
    async fn existing(&self, code: &str) -> Result<ContextRef> {
        self.repository
            .find_context_by_code(code)
            .await?
            .ok_or_else(|| Error::ContextNotFound(code.to_string()))
    }

    /// Insert one record; `None` when it was skipped as a duplicate
    async fn insert(
        &self,
        record: &UnifiedRecord,
        related: Vec<ContextRef>,
    ) -> Result<Option<ContextRef>> {
        let contribution = self.contribution_for(record, related);

        match self.repository.insert_contribution(&contribution).await {
            Ok(context) => Ok(Some(context)),
            Err(Error::DuplicateCode(code)) if self.options.on_conflict == ConflictPolicy::Skip => {
                debug!(code = %code, "Skipping existing context");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn contribution_for(&self, record: &UnifiedRecord, related: Vec<ContextRef>) -> NewContribution {
        let at = record.timestamp();
        let context = record.to_new_context().with_related(related);

        NewContribution::new(record.title(), &self.actor.user_id, context)
            .with_description(record.description())
            .created_at(at)
            .validated_by(&self.actor.user_id, at)
    }
}
