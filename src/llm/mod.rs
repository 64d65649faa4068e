//! LLM Backend Module
//!
//! Provides a unified interface for the optional generative-text backend.
//!
//! ## Capability probe
//!
//! On startup [`probe_backend`] decides once whether generative synthesis is
//! available:
//! - no API key configured → `None` (rule-based synthesis)
//! - key configured but the endpoint does not answer → `None`
//! - otherwise → `Some(backend)`
//!
//! The result is never re-probed; per-call failures fall back to rule-based
//! synthesis for that call only.

mod openai;

pub use openai::OpenAiCompatibleBackend;

use crate::config::{defaults, LlmConfig};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Errors from the generative backend
#[derive(Debug, thiserror::Error)]
pub enum GenerativeError {
    /// Transport failure reaching the endpoint
    #[error("HTTP error: {0}")]
    Http(String),

    /// Endpoint answered with a non-success status
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response did not contain generated text
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Request exceeded the configured timeout
    #[error("generation timeout after {0} seconds")]
    Timeout(u64),
}

/// Unified trait for generative backends
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a response given a prompt
    async fn generate(&self, prompt: &str) -> Result<String, GenerativeError>;

    /// Cheap reachability check used by the startup probe
    async fn probe(&self) -> Result<(), GenerativeError>;

    /// Get the backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Build and probe the configured backend.
///
/// Returns `None` when generative synthesis should not be used.
pub async fn probe_backend(config: &LlmConfig) -> Option<Arc<dyn LlmBackend>> {
    let Some(api_key) = config.api_key.as_deref() else {
        info!("OPENAI_API_KEY not set — using rule-based synthesis");
        return None;
    };

    let backend = match OpenAiCompatibleBackend::new(config, api_key) {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, "Failed to build LLM client — using rule-based synthesis");
            return None;
        }
    };

    let probe_timeout = Duration::from_secs(defaults::LLM_PROBE_TIMEOUT_SECS);
    match tokio::time::timeout(probe_timeout, backend.probe()).await {
        Ok(Ok(())) => {
            info!(
                endpoint = %config.endpoint,
                model = %config.model,
                "LLM backend reachable — using generative synthesis"
            );
            Some(Arc::new(backend))
        }
        Ok(Err(e)) => {
            warn!(error = %e, "LLM probe failed — using rule-based synthesis");
            None
        }
        Err(_) => {
            warn!(
                timeout_secs = defaults::LLM_PROBE_TIMEOUT_SECS,
                "LLM probe timed out — using rule-based synthesis"
            );
            None
        }
    }
}
