//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Server
// ============================================================================

/// Default HTTP bind address.
pub const BIND_ADDRESS: &str = "0.0.0.0:8000";

/// Maximum accepted request body (bytes).
pub const MAX_REQUEST_BYTES: usize = 64 * 1024;

// ============================================================================
// Retrieval
// ============================================================================

/// Days of production history requested for trend queries.
pub const TREND_DAYS: u32 = 30;

/// Production samples per day (hourly telemetry).
pub const SAMPLES_PER_DAY: u32 = 24;

/// Trailing rows in the production moving average (current row excluded).
pub const MOVING_AVERAGE_WINDOW: u32 = 30;

/// Look-back for per-well average when ranking under-performers (days).
pub const UNDERPERFORMANCE_DAYS: u32 = 30;

/// Hop bound for affected-asset graph traversal.
pub const MAX_HOPS: u32 = 3;

/// An incident correlates with a sensor anomaly detected at most this many
/// hours after it.
pub const CORRELATION_WINDOW_HOURS: u32 = 24;

/// Snippets returned by HSE report search.
pub const DOCUMENT_SEARCH_LIMIT: u32 = 5;

// ============================================================================
// Backends
// ============================================================================

pub const POSTGRES_HOST: &str = "localhost";
pub const POSTGRES_PORT: u16 = 5432;
pub const POSTGRES_DB: &str = "oilfield_production";
pub const POSTGRES_USER: &str = "oilfield_user";

pub const NEO4J_USER: &str = "neo4j";
pub const NEO4J_DATABASE: &str = "neo4j";

/// Neo4j HTTP ports, used when a Bolt URI has to be mapped to HTTP.
pub const NEO4J_HTTP_PORT: u16 = 7474;
pub const NEO4J_HTTPS_PORT: u16 = 7473;

pub const QDRANT_COLLECTION: &str = "hse_reports";

/// HTTP timeout for graph/vector store calls (seconds).
pub const BACKEND_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Generative backend
// ============================================================================

pub const LLM_ENDPOINT: &str = "https://api.openai.com/v1";
pub const LLM_MODEL: &str = "gpt-4";

/// HTTP timeout for generation requests (seconds).
pub const LLM_TIMEOUT_SECS: u64 = 60;

/// Timeout for the one-shot startup probe (seconds).
pub const LLM_PROBE_TIMEOUT_SECS: u64 = 5;
