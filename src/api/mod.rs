//! REST API module using Axum
//!
//! Exposes the query pipeline over HTTP. Error responses share the envelope
//! in [`envelope`]; successful responses are the resource JSON.

pub mod envelope;
pub mod handlers;
mod routes;

pub use handlers::AppState;

use crate::config::{defaults, ServerConfig};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// `server.cors_origins` (or `OILFIELD_CORS_ORIGINS`, comma-separated) lists
/// the origins allowed to call the API from a browser.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() {
        return base;
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| o.trim().parse().ok())
        .collect();
    tracing::info!(origins = ?origins, "CORS: allowing configured origins");
    base.allow_origin(allowed)
}

/// Create the complete application router.
pub fn create_app(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .nest("/api", routes::api_routes(state))
        .merge(routes::root_routes())
        .fallback(handlers::not_found)
        // Middleware
        // Body cap is enforced by the extractors so oversized bodies reach
        // the handler as a rejection and get the error envelope.
        .layer(DefaultBodyLimit::max(defaults::MAX_REQUEST_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&server.cors_origins))
}
