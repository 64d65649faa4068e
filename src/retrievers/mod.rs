//! Retriever adapters over the three external stores
//!
//! ## Layers
//!
//! - **Store traits** (`TabularStore`, `GraphStore`, `DocumentStore`): one
//!   implementation per backend. Stores return `Result` and never mask errors.
//! - **Adapters** (`TabularRetriever`, `GraphRetriever`, `DocumentRetriever`):
//!   wrap a store, normalise ordering, and on any `BackendError` log it and
//!   substitute the canned dataset from [`fallback`], flagged `degraded`.
//!
//! The orchestrator only ever talks to adapters, so it always receives a
//! `RecordBatch` and never observes a backend failure.
//!
//! ## Backends
//!
//! | Store     | Backend                         | Module        |
//! |-----------|---------------------------------|---------------|
//! | Tabular   | PostgreSQL (`postgres` feature) | `postgres`    |
//! | Graph     | Neo4j HTTP transactional API    | `neo4j`       |
//! | Document  | Qdrant HTTP API                 | `qdrant`      |
//!
//! A store with no configured endpoint is an [`UnconfiguredStore`], which
//! fails every call with `BackendError::NotConfigured`.

pub mod document;
pub mod fallback;
pub mod graph;
pub mod neo4j;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod qdrant;
pub mod tabular;

pub use document::DocumentRetriever;
pub use graph::GraphRetriever;
pub use tabular::TabularRetriever;

use crate::config::{AppConfig, RetrievalConfig};
use crate::types::{RetrievalRecord, RetrieverKind};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

// ============================================================================
// Errors
// ============================================================================

/// A retriever's underlying store is unreachable or returned an error.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("{0} backend is not configured")]
    NotConfigured(RetrieverKind),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[cfg(feature = "postgres")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type BackendResult<T> = Result<T, BackendError>;

// ============================================================================
// Store traits
// ============================================================================

/// Production time-series and maintenance store.
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// Newest-first production rows for `rig`, at most `limit` rows, each with
    /// a trailing moving average over `window` preceding rows.
    async fn production_trends(
        &self,
        rig: &str,
        limit: u32,
        window: u32,
    ) -> BackendResult<Vec<RetrievalRecord>>;

    /// Wells in `basin` whose latest rate is below their own average over the
    /// last `days` days.
    async fn wells_below_average(&self, basin: &str, days: u32)
        -> BackendResult<Vec<RetrievalRecord>>;

    /// Equipment whose next maintenance date has passed.
    async fn maintenance_overdue(&self) -> BackendResult<Vec<RetrievalRecord>>;

    async fn ping(&self) -> BackendResult<()>;

    fn backend_name(&self) -> &'static str;
}

/// Asset relationship graph.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Sensors under `rig` flagged faulty or with an anomalous last reading.
    async fn faulty_equipment(&self, rig: &str) -> BackendResult<Vec<RetrievalRecord>>;

    /// Rigs, wells and pumps reachable from `equipment_id` within `max_hops`.
    async fn affected_assets(
        &self,
        equipment_id: &str,
        max_hops: u32,
    ) -> BackendResult<Vec<RetrievalRecord>>;

    async fn equipment_by_basin(&self, basin: &str) -> BackendResult<Vec<RetrievalRecord>>;

    /// Incidents occurring within `window_hours` before a sensor anomaly on
    /// the same well.
    async fn incident_correlations(&self, window_hours: u32)
        -> BackendResult<Vec<RetrievalRecord>>;

    async fn ping(&self) -> BackendResult<()>;

    fn backend_name(&self) -> &'static str;
}

/// Unstructured HSE report store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn search_reports(&self, text: &str, limit: u32) -> BackendResult<Vec<RetrievalRecord>>;

    async fn ping(&self) -> BackendResult<()>;

    fn backend_name(&self) -> &'static str;
}

// ============================================================================
// Unconfigured backend
// ============================================================================

/// Placeholder for a store with no configured endpoint.
#[derive(Debug, Clone, Copy)]
pub struct UnconfiguredStore {
    kind: RetrieverKind,
}

impl UnconfiguredStore {
    pub const fn new(kind: RetrieverKind) -> Self {
        Self { kind }
    }

    fn fail<T>(&self) -> BackendResult<T> {
        Err(BackendError::NotConfigured(self.kind))
    }
}

#[async_trait]
impl TabularStore for UnconfiguredStore {
    async fn production_trends(&self, _: &str, _: u32, _: u32) -> BackendResult<Vec<RetrievalRecord>> {
        self.fail()
    }
    async fn wells_below_average(&self, _: &str, _: u32) -> BackendResult<Vec<RetrievalRecord>> {
        self.fail()
    }
    async fn maintenance_overdue(&self) -> BackendResult<Vec<RetrievalRecord>> {
        self.fail()
    }
    async fn ping(&self) -> BackendResult<()> {
        self.fail()
    }
    fn backend_name(&self) -> &'static str {
        "unconfigured"
    }
}

#[async_trait]
impl GraphStore for UnconfiguredStore {
    async fn faulty_equipment(&self, _: &str) -> BackendResult<Vec<RetrievalRecord>> {
        self.fail()
    }
    async fn affected_assets(&self, _: &str, _: u32) -> BackendResult<Vec<RetrievalRecord>> {
        self.fail()
    }
    async fn equipment_by_basin(&self, _: &str) -> BackendResult<Vec<RetrievalRecord>> {
        self.fail()
    }
    async fn incident_correlations(&self, _: u32) -> BackendResult<Vec<RetrievalRecord>> {
        self.fail()
    }
    async fn ping(&self) -> BackendResult<()> {
        self.fail()
    }
    fn backend_name(&self) -> &'static str {
        "unconfigured"
    }
}

#[async_trait]
impl DocumentStore for UnconfiguredStore {
    async fn search_reports(&self, _: &str, _: u32) -> BackendResult<Vec<RetrievalRecord>> {
        self.fail()
    }
    async fn ping(&self) -> BackendResult<()> {
        self.fail()
    }
    fn backend_name(&self) -> &'static str {
        "unconfigured"
    }
}

// ============================================================================
// Bundle
// ============================================================================

/// The three adapters, built once at startup and shared by every query.
#[derive(Clone)]
pub struct Retrievers {
    pub tabular: TabularRetriever,
    pub graph: GraphRetriever,
    pub document: DocumentRetriever,
}

impl Retrievers {
    /// Build adapters for whichever backends the config names.
    pub fn from_config(config: &AppConfig) -> BackendResult<Self> {
        let timeout = Duration::from_secs(config.retrieval.backend_timeout_secs);

        let tabular_store = tabular_store_from_config(config);

        let graph_store: Arc<dyn GraphStore> = match &config.neo4j.uri {
            Some(uri) => {
                info!(uri = %uri, "Graph store: Neo4j");
                Arc::new(neo4j::Neo4jGraphStore::new(uri, &config.neo4j, timeout)?)
            }
            None => {
                info!("NEO4J_URI not set — graph retriever runs in degraded mode");
                Arc::new(UnconfiguredStore::new(RetrieverKind::Graph))
            }
        };

        let document_store: Arc<dyn DocumentStore> = match &config.qdrant.url {
            Some(url) => {
                info!(url = %url, collection = %config.qdrant.collection, "Document store: Qdrant");
                Arc::new(qdrant::QdrantDocumentStore::new(
                    url,
                    &config.qdrant.collection,
                    timeout,
                )?)
            }
            None => {
                info!("Qdrant not configured — document retriever runs in degraded mode");
                Arc::new(UnconfiguredStore::new(RetrieverKind::Document))
            }
        };

        Ok(Self {
            tabular: TabularRetriever::new(tabular_store, &config.retrieval),
            graph: GraphRetriever::new(graph_store, &config.retrieval),
            document: DocumentRetriever::new(document_store, &config.retrieval),
        })
    }

    /// Adapters over explicit stores.
    pub fn from_stores(
        tabular: Arc<dyn TabularStore>,
        graph: Arc<dyn GraphStore>,
        document: Arc<dyn DocumentStore>,
        settings: &RetrievalConfig,
    ) -> Self {
        Self {
            tabular: TabularRetriever::new(tabular, settings),
            graph: GraphRetriever::new(graph, settings),
            document: DocumentRetriever::new(document, settings),
        }
    }

    /// Adapters over stores that always fail, so every call returns canned data.
    pub fn degraded(config: &AppConfig) -> Self {
        Self::from_stores(
            Arc::new(UnconfiguredStore::new(RetrieverKind::Tabular)),
            Arc::new(UnconfiguredStore::new(RetrieverKind::Graph)),
            Arc::new(UnconfiguredStore::new(RetrieverKind::Document)),
            &config.retrieval,
        )
    }
}

#[cfg(feature = "postgres")]
fn tabular_store_from_config(config: &AppConfig) -> Arc<dyn TabularStore> {
    match config.postgres.connection_url() {
        Some(url) => {
            info!(
                database = %config.postgres.database,
                "Tabular store: PostgreSQL"
            );
            Arc::new(postgres::PostgresTabularStore::new(url))
        }
        None => {
            info!("PostgreSQL not configured — tabular retriever runs in degraded mode");
            Arc::new(UnconfiguredStore::new(RetrieverKind::Tabular))
        }
    }
}

#[cfg(not(feature = "postgres"))]
fn tabular_store_from_config(config: &AppConfig) -> Arc<dyn TabularStore> {
    if config.postgres.connection_url().is_some() {
        tracing::warn!("PostgreSQL configured but the `postgres` feature is disabled — tabular retriever runs in degraded mode");
    }
    Arc::new(UnconfiguredStore::new(RetrieverKind::Tabular))
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Stable sort of records by a numeric field. Records missing the field sort last.
pub(crate) fn sort_by_numeric(records: &mut [RetrievalRecord], field: &str, ascending: bool) {
    records.sort_by(|a, b| match (a.get_f64(field), b.get_f64(field)) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        }
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_by_numeric_missing_last() {
        let mut records = vec![
            RetrievalRecord::new().with("hops", 3),
            RetrievalRecord::new(),
            RetrievalRecord::new().with("hops", 1),
        ];
        sort_by_numeric(&mut records, "hops", true);
        assert_eq!(records[0].get_f64("hops"), Some(1.0));
        assert_eq!(records[1].get_f64("hops"), Some(3.0));
        assert!(records[2].is_empty());

        sort_by_numeric(&mut records, "hops", false);
        assert_eq!(records[0].get_f64("hops"), Some(3.0));
    }

    #[tokio::test]
    async fn test_unconfigured_store_always_fails() {
        let store = UnconfiguredStore::new(RetrieverKind::Graph);
        let err = GraphStore::faulty_equipment(&store, "Rig Alpha").await.unwrap_err();
        assert!(matches!(err, BackendError::NotConfigured(RetrieverKind::Graph)));
        assert!(GraphStore::ping(&store).await.is_err());
    }

    #[test]
    fn test_from_default_config_builds_degraded_adapters() {
        let retrievers = Retrievers::from_config(&AppConfig::default()).unwrap();
        assert_eq!(retrievers.graph.backend_name(), "unconfigured");
        assert_eq!(retrievers.document.backend_name(), "unconfigured");
        assert_eq!(retrievers.tabular.backend_name(), "unconfigured");
    }
}
