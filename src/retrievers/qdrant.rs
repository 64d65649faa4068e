//! Qdrant document store for HSE reports
//!
//! Uses the points scroll API with a full-text payload filter on `text`, so no
//! embedding model is needed. Results are ranked in store order.

use super::{BackendError, BackendResult, DocumentStore};
use crate::types::RetrievalRecord;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ScrollResponse {
    result: ScrollResult,
}

#[derive(Debug, Deserialize)]
struct ScrollResult {
    #[serde(default)]
    points: Vec<Point>,
}

#[derive(Debug, Deserialize)]
struct Point {
    id: Value,
    #[serde(default)]
    payload: Option<serde_json::Map<String, Value>>,
}

fn records_from_points(points: Vec<Point>) -> Vec<RetrievalRecord> {
    points
        .into_iter()
        .enumerate()
        .map(|(rank, point)| {
            let payload = point.payload.unwrap_or_default();
            RetrievalRecord::new()
                .with("id", point.id)
                .with("rank", rank + 1)
                .with("text", payload.get("text").cloned().unwrap_or(Value::Null))
                .with("source", payload.get("source").cloned().unwrap_or(Value::Null))
        })
        .collect()
}

pub struct QdrantDocumentStore {
    http: reqwest::Client,
    base_url: String,
    collection: String,
}

impl QdrantDocumentStore {
    pub fn new(url: &str, collection: &str, timeout: Duration) -> BackendResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(Self {
            http,
            base_url: url.trim_end_matches('/').to_string(),
            collection: collection.to_string(),
        })
    }
}

#[async_trait]
impl DocumentStore for QdrantDocumentStore {
    async fn search_reports(&self, text: &str, limit: u32) -> BackendResult<Vec<RetrievalRecord>> {
        let body = json!({
            "filter": { "must": [{ "key": "text", "match": { "text": text } }] },
            "limit": limit,
            "with_payload": true,
            "with_vector": false
        });

        let resp = self
            .http
            .post(format!(
                "{}/collections/{}/points/scroll",
                self.base_url, self.collection
            ))
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BackendError::Query(format!("HTTP {status}")));
        }

        let parsed: ScrollResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(records_from_points(parsed.result.points))
    }

    async fn ping(&self) -> BackendResult<()> {
        let resp = self
            .http
            .get(format!("{}/collections", self.base_url))
            .send()
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(BackendError::Query(format!("HTTP {}", resp.status())))
        }
    }

    fn backend_name(&self) -> &'static str {
        "qdrant"
    }
}
