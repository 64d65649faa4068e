//! Neo4j graph store over the HTTP transactional endpoint
//!
//! Every call is a single auto-commit request to `/db/{database}/tx/commit`.
//! Idle HTTP connections are not kept, so nothing is reused between calls.
//!
//! Graph model:
//!
//! ```text
//! (:Basin)-[:CONTAINS]->(:Rig)-[:HAS_WELL]->(:Well)-[:HAS_SENSOR]->(:Sensor)
//! (:Incident)-[:OCCURRED_AT]->(:Well)
//! (:Equipment)-[*]-(:Rig|:Well|:Pump)
//! ```

use super::{BackendError, BackendResult, GraphStore};
use crate::config::Neo4jConfig;
use crate::types::RetrievalRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::debug;

const FAULTY_EQUIPMENT_CYPHER: &str = r#"
    MATCH (r:Rig {name: $rig_name})-[:HAS_WELL]->(w:Well)-[:HAS_SENSOR]->(s:Sensor)
    WHERE toLower(s.status) = 'faulty' OR s.last_reading_anomaly = true
    RETURN r.name AS rig, w.name AS well, s.sensor_id AS sensor,
           s.sensor_type AS type, s.last_reading AS reading,
           toUpper(s.status) AS status"#;

const EQUIPMENT_BY_BASIN_CYPHER: &str = r#"
    MATCH (b:Basin {name: $basin})-[:CONTAINS]->(r:Rig)
          -[:HAS_WELL]->(w:Well)-[:HAS_SENSOR]->(s:Sensor)
    RETURN r.name AS rig, w.name AS well, s.sensor_id AS sensor,
           s.sensor_type AS type, s.status AS status"#;

const INCIDENT_CORRELATION_CYPHER: &str = r#"
    MATCH (i:Incident)-[:OCCURRED_AT]->(w:Well)-[:HAS_SENSOR]->(s:Sensor)
    WHERE s.last_reading_anomaly = true
      AND datetime(i.timestamp) >= datetime(s.anomaly_detected_at) - duration({hours: $window_hours})
      AND datetime(i.timestamp) <= datetime(s.anomaly_detected_at)
    RETURN i.incident_id AS incident, i.severity AS severity,
           w.name AS well, s.sensor_id AS sensor, s.sensor_type AS type,
           toString(i.timestamp) AS incident_time,
           toString(s.anomaly_detected_at) AS anomaly_time
    ORDER BY i.severity DESC"#;

/// Variable-length bounds cannot be parameters in Cypher, so the hop count is
/// inlined.
fn affected_assets_cypher(max_hops: u32) -> String {
    format!(
        r#"MATCH path = (e:Equipment {{id: $equipment_id}})-[*1..{max_hops}]-(affected)
           WHERE affected:Rig OR affected:Well OR affected:Pump
           RETURN affected.name AS asset_name,
                  labels(affected)[0] AS asset_type,
                  length(path) AS hops,
                  [node IN nodes(path) | coalesce(node.name, node.id)] AS path_nodes
           ORDER BY hops ASC"#
    )
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct TxRequest<'a> {
    statements: [Statement<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Statement<'a> {
    statement: &'a str,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct TxResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    errors: Vec<Neo4jError>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<ResultRow>,
}

#[derive(Debug, Deserialize)]
struct ResultRow {
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Neo4jError {
    code: String,
    message: String,
}

/// Zip column names with each row's values.
fn records_from_response(response: TxResponse) -> BackendResult<Vec<RetrievalRecord>> {
    if let Some(err) = response.errors.first() {
        return Err(BackendError::Query(format!("{}: {}", err.code, err.message)));
    }
    let result = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| BackendError::Decode("response contained no statement result".into()))?;

    Ok(result
        .data
        .into_iter()
        .map(|row| -> RetrievalRecord {
            result
                .columns
                .iter()
                .cloned()
                .zip(row.row)
                .collect::<Map<String, Value>>()
                .into()
        })
        .collect())
}

// ============================================================================
// Store
// ============================================================================

pub struct Neo4jGraphStore {
    http: reqwest::Client,
    commit_url: String,
    user: String,
    password: Option<String>,
}

impl Neo4jGraphStore {
    pub fn new(uri: &str, config: &Neo4jConfig, timeout: Duration) -> BackendResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self {
            http,
            commit_url: format!(
                "{}/db/{}/tx/commit",
                uri.trim_end_matches('/'),
                config.database
            ),
            user: config.user.clone(),
            password: config.password.clone(),
        })
    }

    async fn run(&self, statement: &str, parameters: Value) -> BackendResult<Vec<RetrievalRecord>> {
        let body = TxRequest {
            statements: [Statement {
                statement,
                parameters,
            }],
        };

        let resp = self
            .http
            .post(&self.commit_url)
            .basic_auth(&self.user, self.password.as_deref())
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(BackendError::Query(format!("HTTP {status}: {text}")));
        }

        let parsed: TxResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        let records = records_from_response(parsed)?;
        debug!(records = records.len(), "Cypher statement complete");
        Ok(records)
    }
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    async fn faulty_equipment(&self, rig: &str) -> BackendResult<Vec<RetrievalRecord>> {
        self.run(FAULTY_EQUIPMENT_CYPHER, json!({ "rig_name": rig })).await
    }

    async fn affected_assets(
        &self,
        equipment_id: &str,
        max_hops: u32,
    ) -> BackendResult<Vec<RetrievalRecord>> {
        self.run(
            &affected_assets_cypher(max_hops),
            json!({ "equipment_id": equipment_id }),
        )
        .await
    }

    async fn equipment_by_basin(&self, basin: &str) -> BackendResult<Vec<RetrievalRecord>> {
        self.run(EQUIPMENT_BY_BASIN_CYPHER, json!({ "basin": basin })).await
    }

    async fn incident_correlations(
        &self,
        window_hours: u32,
    ) -> BackendResult<Vec<RetrievalRecord>> {
        self.run(
            INCIDENT_CORRELATION_CYPHER,
            json!({ "window_hours": window_hours }),
        )
        .await
    }

    async fn ping(&self) -> BackendResult<()> {
        self.run("RETURN 1 AS test", json!({})).await.map(|_| ())
    }

    fn backend_name(&self) -> &'static str {
        "neo4j"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};

    fn parse(v: Value) -> BackendResult<Vec<RetrievalRecord>> {
        records_from_response(serde_json::from_value(v).unwrap())
    }

    #[test]
    fn test_rows_zipped_with_columns() {
        let records = parse(json!({
            "results": [{
                "columns": ["rig", "well", "sensor"],
                "data": [
                    {"row": ["Rig Alpha", "Well W-12", "G-40"], "meta": [null, null, null]},
                    {"row": ["Rig Alpha", "Well W-13", "T-2"], "meta": [null, null, null]}
                ]
            }],
            "errors": []
        }))
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get_str("well").as_deref(), Some("Well W-13"));
        assert_eq!(records[0].get_str("sensor").as_deref(), Some("G-40"));
    }

    #[test]
    fn test_server_error_is_query_error() {
        let err = parse(json!({
            "results": [],
            "errors": [{"code": "Neo.ClientError.Statement.SyntaxError", "message": "bad"}]
        }))
        .unwrap_err();
        assert!(matches!(err, BackendError::Query(m) if m.contains("SyntaxError")));
    }

    #[test]
    fn test_hop_bound_inlined() {
        let cypher = affected_assets_cypher(3);
        assert!(cypher.contains("-[*1..3]-"));
        assert!(cypher.contains("{id: $equipment_id}"));
    }

    #[tokio::test]
    async fn test_round_trip_against_local_endpoint() {
        async fn commit(Json(body): Json<Value>) -> Json<Value> {
            let rig = body["statements"][0]["parameters"]["rig_name"].clone();
            Json(json!({
                "results": [{"columns": ["rig", "well", "sensor"], "data": [{"row": [rig, "Well W-1", "S-1"]}]}],
                "errors": []
            }))
        }

        let app = Router::new().route("/db/neo4j/tx/commit", post(commit));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let store = Neo4jGraphStore::new(
            &format!("http://{addr}/"),
            &Neo4jConfig::default(),
            Duration::from_secs(5),
        )
        .unwrap();

        let records = store.faulty_equipment("Rig Delta").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get_str("rig").as_deref(), Some("Rig Delta"));
    }
}
