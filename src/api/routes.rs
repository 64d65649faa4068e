//! API route table
//!
//! - `POST /api/query` - natural-language query
//! - `GET /api/status/databases` - per-backend connectivity
//! - `GET /health` - liveness
//! - `GET /` - welcome message

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, AppState};

/// Routes under `/api`.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/query", post(handlers::process_query))
        .route("/status/databases", get(handlers::database_status))
        .with_state(state)
}

/// Root-level routes.
pub fn root_routes() -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
}
