//! Graph retriever - asset relationships, multi-hop impact and incident correlation
//!
//! Wraps a [`GraphStore`]. Cycle and duplicate-path handling belong to the
//! store; this adapter only bounds the hop count and orders results.

use super::{fallback, sort_by_numeric, BackendResult, GraphStore};
use crate::config::RetrievalConfig;
use crate::types::{RecordBatch, RetrievalRecord, RetrieverKind};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
pub struct GraphRetriever {
    store: Arc<dyn GraphStore>,
    max_hops: u32,
    correlation_window_hours: u32,
}

impl GraphRetriever {
    pub fn new(store: Arc<dyn GraphStore>, settings: &RetrievalConfig) -> Self {
        Self {
            store,
            max_hops: settings.max_hops,
            correlation_window_hours: settings.correlation_window_hours,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Faulty or anomalous equipment linked to `rig`.
    pub async fn faulty_equipment(&self, rig: &str) -> RecordBatch {
        info!(rig = %rig, "Finding faulty equipment");
        let result = self.store.faulty_equipment(rig).await;
        self.finish("faulty_equipment", result, |records| records)
            .unwrap_or_else(|| {
                RecordBatch::degraded(RetrieverKind::Graph, fallback::faulty_equipment(rig))
            })
    }

    /// Assets reachable from `equipment_id` within the configured hop bound,
    /// nearest first.
    pub async fn affected_assets(&self, equipment_id: &str) -> RecordBatch {
        self.affected_assets_within(equipment_id, self.max_hops).await
    }

    pub async fn affected_assets_within(&self, equipment_id: &str, max_hops: u32) -> RecordBatch {
        let max_hops = max_hops.max(1);
        info!(equipment = %equipment_id, max_hops, "Finding affected assets");
        let result = self.store.affected_assets(equipment_id, max_hops).await;
        self.finish("affected_assets", result, |mut records| {
            records.retain(|r| r.get_f64("hops").map_or(true, |h| h <= f64::from(max_hops)));
            sort_by_numeric(&mut records, "hops", true);
            records
        })
        .unwrap_or_else(|| {
            RecordBatch::degraded(RetrieverKind::Graph, fallback::affected_assets(equipment_id))
        })
    }

    /// Equipment located in `basin`.
    pub async fn equipment_by_basin(&self, basin: &str) -> RecordBatch {
        info!(basin = %basin, "Finding equipment by basin");
        let result = self.store.equipment_by_basin(basin).await;
        self.finish("equipment_by_basin", result, |records| records)
            .unwrap_or_else(|| {
                RecordBatch::degraded(RetrieverKind::Graph, fallback::equipment_by_basin(basin))
            })
    }

    /// Safety incidents preceding sensor anomalies, most severe first.
    pub async fn incident_correlations(&self) -> RecordBatch {
        info!(window_hours = self.correlation_window_hours, "Finding incident-equipment correlations");
        let result = self
            .store
            .incident_correlations(self.correlation_window_hours)
            .await;
        self.finish("incident_correlations", result, |mut records| {
            records.sort_by_key(|r| std::cmp::Reverse(severity_rank(r)));
            records
        })
        .unwrap_or_else(|| {
            RecordBatch::degraded(RetrieverKind::Graph, fallback::incident_correlations())
        })
    }

    pub async fn ping(&self) -> BackendResult<()> {
        self.store.ping().await
    }

    fn finish<F>(
        &self,
        operation: &'static str,
        result: BackendResult<Vec<RetrievalRecord>>,
        normalise: F,
    ) -> Option<RecordBatch>
    where
        F: FnOnce(Vec<RetrievalRecord>) -> Vec<RetrievalRecord>,
    {
        match result {
            Ok(records) => {
                let records = normalise(records);
                info!(operation, records = records.len(), "Graph retrieval complete");
                Some(RecordBatch::live(RetrieverKind::Graph, records))
            }
            Err(e) => {
                error!(
                    operation,
                    backend = self.store.backend_name(),
                    error = %e,
                    "Graph retrieval failed — serving fallback data"
                );
                None
            }
        }
    }
}

/// Ordinal for incident severity. Numeric severities are used as-is.
fn severity_rank(record: &RetrievalRecord) -> u8 {
    if let Some(n) = record.get("severity").and_then(serde_json::Value::as_u64) {
        return u8::try_from(n).unwrap_or(u8::MAX);
    }
    match record
        .get_str("severity")
        .map(|s| s.to_ascii_uppercase())
        .as_deref()
    {
        Some("CRITICAL") => 4,
        Some("HIGH") => 3,
        Some("MEDIUM") => 2,
        Some("LOW") => 1,
        _ => 0,
    }
}
