//! Oilfield Insights: natural-language query routing and synthesis
//!
//! Answers operator questions about rigs, wells and equipment by combining
//! three data stores behind one query pipeline.
//!
//! ## Architecture
//!
//! - **Agents**: intent classification, entity extraction, plan building,
//!   orchestration and answer synthesis
//! - **Retrievers**: adapters over the tabular (PostgreSQL), graph (Neo4j)
//!   and document (Qdrant) stores, with degraded-mode fallback data
//! - **LLM Module**: optional OpenAI-compatible backend for generative synthesis
//! - **API**: axum HTTP surface over the orchestrator

pub mod agents;
pub mod api;
pub mod config;
pub mod llm;
pub mod retrievers;
pub mod types;

// Re-export configuration
pub use config::AppConfig;

// Re-export commonly used types
pub use types::{
    EntityMap, Intent, ParseResult, QueryResponse, ReasoningStep, RecordBatch, RetrievalRecord,
    RetrieverKind, StepTag, SynthesisMethod, SynthesisResult,
};

// Re-export agents
pub use agents::{OrchestrationError, Orchestrator, QueryParser, Synthesizer};

// Re-export retrievers
pub use retrievers::{BackendError, Retrievers};

// Re-export LLM components
pub use llm::{GenerativeError, LlmBackend};
