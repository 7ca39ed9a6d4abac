//! Graph statistics command

use serde::Serialize;
use sqlx::SqlitePool;

use crate::domain::{ContextGraphRepository, GraphStats, IdentityRepository, Language, ModelRegistry};
use crate::error::Result;
use crate::infrastructure::{
    SqliteContextGraphRepository, SqliteIdentityRepository, SqliteModelRegistry,
};

/// Counts across the graph, per-language coverage and the model registry
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub graph: GraphStats,
    pub users: u64,
    pub models: usize,
    /// Contexts labelled in each language
    pub labelled: Vec<(Language, usize)>,
}

/// Gather graph statistics
pub async fn get_stats(pool: &SqlitePool) -> Result<StatsReport> {
    let repo = SqliteContextGraphRepository::new(pool.clone());

    let mut labelled = Vec::with_capacity(Language::all().len());
    for language in Language::all() {
        labelled.push((*language, repo.list_labels(*language).await?.len()));
    }

    Ok(StatsReport {
        graph: repo.get_stats().await?,
        users: SqliteIdentityRepository::new(pool.clone()).count_users().await?,
        models: SqliteModelRegistry::new(pool.clone()).list(None).await?.len(),
        labelled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewContext, NewContribution};
    use crate::storage::Database;

    #[tokio::test]
    async fn test_stats_on_empty_graph() {
        let db = Database::in_memory().await.unwrap();
        let stats = get_stats(db.pool()).await.unwrap();

        assert_eq!(stats.graph, GraphStats::default());
        assert_eq!(stats.users, 0);
        assert_eq!(stats.models, 0);
        assert!(stats.labelled.iter().all(|(_, count)| *count == 0));
    }

    #[tokio::test]
    async fn test_stats_counts_labels_per_language() {
        let db = Database::in_memory().await.unwrap();
        let user = SqliteIdentityRepository::new(db.pool().clone())
            .ensure_user("system")
            .await
            .unwrap();
        let mut context = NewContext::new("greet");
        context.labels.en = Some("Greeting".into());
        context.labels.ar = Some("تحية".into());
        SqliteContextGraphRepository::new(db.pool().clone())
            .insert_contribution(&NewContribution::new("T", &user.id, context))
            .await
            .unwrap();

        let stats = get_stats(db.pool()).await.unwrap();
        assert_eq!(stats.graph.contexts, 1);
        assert_eq!(stats.users, 1);
        assert_eq!(
            stats.labelled,
            vec![(Language::En, 1), (Language::Fr, 0), (Language::Ar, 1)]
        );
    }
}
