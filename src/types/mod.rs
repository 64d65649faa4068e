//! Shared data structures for oilfield query routing and synthesis
//!
//! This module defines the core types for the query pipeline:
//! - Parse: Intent, EntityMap, StepTag, ParseResult (parser outputs)
//! - Retrieval: RetrievalRecord, RecordBatch (retriever outputs)
//! - Synthesis: SynthesisResult, SupportingData (synthesizer output)
//! - Response: ReasoningStep, QueryResponse (externally visible result)

mod query;
mod records;
mod response;

pub use query::*;
pub use records::*;
pub use response::*;
