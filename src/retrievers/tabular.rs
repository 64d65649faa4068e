//! Tabular retriever - production time series and maintenance schedule
//!
//! Wraps a [`TabularStore`]. Every operation returns a `RecordBatch`; backend
//! failures are logged and replaced with the canned dataset for that operation.

use super::{fallback, sort_by_numeric, BackendResult, TabularStore};
use crate::config::RetrievalConfig;
use crate::types::{RecordBatch, RetrievalRecord, RetrieverKind};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
pub struct TabularRetriever {
    store: Arc<dyn TabularStore>,
    trend_days: u32,
    samples_per_day: u32,
    moving_average_window: u32,
    underperformance_days: u32,
}

impl TabularRetriever {
    pub fn new(store: Arc<dyn TabularStore>, settings: &RetrievalConfig) -> Self {
        Self {
            store,
            trend_days: settings.trend_days,
            samples_per_day: settings.samples_per_day,
            moving_average_window: settings.moving_average_window,
            underperformance_days: settings.underperformance_days,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Recent production trend for `rig` over the configured number of days.
    pub async fn production_trends(&self, rig: &str) -> RecordBatch {
        self.production_trends_over(rig, self.trend_days).await
    }

    /// Newest-first production rows for `rig` over `days` days of hourly
    /// samples, each annotated with a trailing moving average.
    pub async fn production_trends_over(&self, rig: &str, days: u32) -> RecordBatch {
        info!(rig = %rig, days, "Querying production trends");
        let limit = days.saturating_mul(self.samples_per_day);
        let result = self
            .store
            .production_trends(rig, limit, self.moving_average_window)
            .await;

        self.finish("production_trends", result, |mut records| {
            records.truncate(limit as usize);
            records
        })
        .unwrap_or_else(|| {
            RecordBatch::degraded(RetrieverKind::Tabular, fallback::production_trends(rig))
        })
    }

    /// Wells in `basin` currently below their own average, most deviant first.
    pub async fn wells_below_average(&self, basin: &str) -> RecordBatch {
        info!(basin = %basin, days = self.underperformance_days, "Querying underperforming wells");
        let result = self
            .store
            .wells_below_average(basin, self.underperformance_days)
            .await;

        self.finish("wells_below_average", result, |mut records| {
            records.retain(is_below_average);
            sort_by_numeric(&mut records, "deviation_pct", true);
            records
        })
        .unwrap_or_else(|| {
            RecordBatch::degraded(RetrieverKind::Tabular, fallback::wells_below_average(basin))
        })
    }

    /// Overdue maintenance items, most overdue first.
    pub async fn maintenance_overdue(&self) -> RecordBatch {
        info!("Querying overdue maintenance");
        let result = self.store.maintenance_overdue().await;

        self.finish("maintenance_overdue", result, |mut records| {
            sort_by_numeric(&mut records, "days_overdue", false);
            records
        })
        .unwrap_or_else(|| {
            RecordBatch::degraded(RetrieverKind::Tabular, fallback::maintenance_overdue())
        })
    }

    pub async fn ping(&self) -> BackendResult<()> {
        self.store.ping().await
    }

    /// Normalise a live result, or log the failure and return `None` so the
    /// caller substitutes its fallback.
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
                info!(operation, records = records.len(), "Tabular retrieval complete");
                Some(RecordBatch::live(RetrieverKind::Tabular, records))
            }
            Err(e) => {
                error!(
                    operation,
                    backend = self.store.backend_name(),
                    error = %e,
                    "Tabular retrieval failed — serving fallback data"
                );
                None
            }
        }
    }
}

fn is_below_average(record: &RetrievalRecord) -> bool {
    match (record.get_f64("current_rate"), record.get_f64("avg_rate")) {
        (Some(current), Some(avg)) => current < avg,
        _ => true,
    }
}
