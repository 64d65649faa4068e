//! API request handlers
//!
//! Handlers are thin: they validate input, hand the query to the shared
//! [`Orchestrator`], and map failures onto the error envelope.

use super::envelope::ApiErrorResponse;
use crate::agents::Orchestrator;
use crate::types::SynthesisMethod;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Service name reported by `/health` and `/`.
pub const SERVICE_NAME: &str = "Intelligent Oilfield Insights Platform";

/// Shared state for all handlers. Cloned per request; the orchestrator is
/// built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

// ============================================================================
// Query
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// POST /api/query
pub async fn process_query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return ApiErrorResponse::payload_too_large(rejection.body_text());
        }
        Err(rejection) => {
            warn!(error = %rejection, "Rejected malformed query request");
            return ApiErrorResponse::bad_request(rejection.body_text());
        }
    };

    let query = request.query.trim();
    if query.is_empty() {
        return ApiErrorResponse::bad_request("query must not be empty");
    }

    match state.orchestrator.run(query).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            error!(error = %e, "Query processing failed");
            ApiErrorResponse::internal(e.to_string())
        }
    }
}

// ============================================================================
// Health and status
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
    pub health: String,
    pub query: String,
    pub status: String,
}

/// GET /
pub async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: format!("Welcome to {SERVICE_NAME}"),
        health: "/health".to_string(),
        query: "/api/query".to_string(),
        status: "/api/status/databases".to_string(),
    })
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseStatus {
    pub postgres: bool,
    pub neo4j: bool,
    pub qdrant: bool,
    /// Generative synthesis selected at startup
    pub llm: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseStatusResponse {
    pub databases: DatabaseStatus,
    /// All three data stores reachable. The LLM is optional and not counted.
    pub all_healthy: bool,
    pub message: String,
}

fn reachable(backend: &str, result: crate::retrievers::BackendResult<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            debug!(backend, error = %e, "Connectivity check failed");
            false
        }
    }
}

/// GET /api/status/databases
pub async fn database_status(State(state): State<AppState>) -> Json<DatabaseStatusResponse> {
    let retrievers = state.orchestrator.retrievers();

    let postgres = reachable("postgres", retrievers.tabular.ping().await);
    let neo4j = reachable("neo4j", retrievers.graph.ping().await);
    let qdrant = reachable("qdrant", retrievers.document.ping().await);
    let llm = state.orchestrator.synthesizer().preferred_method() == SynthesisMethod::Generative;

    Json(DatabaseStatusResponse {
        databases: DatabaseStatus {
            postgres,
            neo4j,
            qdrant,
            llm,
        },
        all_healthy: postgres && neo4j && qdrant,
        message: "Database connectivity check complete".to_string(),
    })
}

/// Fallback for unmatched routes.
pub async fn not_found() -> Response {
    ApiErrorResponse::not_found("no such endpoint")
}
