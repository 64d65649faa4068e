//! Document retriever - free-text search over HSE reports.
//!
//! Planned for safety queries but not invoked by the default orchestration
//! policy. Degraded searches return an empty batch.

use super::{fallback, BackendResult, DocumentStore};
use crate::config::RetrievalConfig;
use crate::types::{RecordBatch, RetrieverKind};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
pub struct DocumentRetriever {
    store: Arc<dyn DocumentStore>,
    limit: u32,
}

impl DocumentRetriever {
    pub fn new(store: Arc<dyn DocumentStore>, settings: &RetrievalConfig) -> Self {
        Self {
            store,
            limit: settings.document_search_limit,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub async fn search_reports(&self, text: &str) -> RecordBatch {
        info!(limit = self.limit, "Searching HSE reports");
        match self.store.search_reports(text, self.limit).await {
            Ok(mut records) => {
                records.truncate(self.limit as usize);
                info!(records = records.len(), "Document retrieval complete");
                RecordBatch::live(RetrieverKind::Document, records)
            }
            Err(e) => {
                error!(
                    backend = self.store.backend_name(),
                    error = %e,
                    "Document retrieval failed — serving fallback data"
                );
                RecordBatch::degraded(RetrieverKind::Document, fallback::search_reports(text))
            }
        }
    }

    pub async fn ping(&self) -> BackendResult<()> {
        self.store.ping().await
    }
}
