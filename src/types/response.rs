//! Synthesis and response types returned to the caller.

use super::{Intent, RecordBatch, RetrievalRecord, StepTag};
use serde::{Deserialize, Serialize};

// ============================================================================
// Reasoning trace
// ============================================================================

/// One entry in the append-only reasoning trace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReasoningStep {
    /// 1-based position in the trace
    pub step: u32,
    /// Component that produced this step
    pub agent: String,
    pub action: String,
    /// One-line summary of what the component found
    pub result: String,
}

/// Ordered reasoning trace. Steps can only be appended; sequence numbers are
/// assigned on append.
#[derive(Debug, Clone, Default)]
pub struct ReasoningTrace {
    steps: Vec<ReasoningStep>,
}

impl ReasoningTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, agent: &str, action: impl Into<String>, result: impl Into<String>) {
        let step = u32::try_from(self.steps.len() + 1).unwrap_or(u32::MAX);
        self.steps.push(ReasoningStep {
            step,
            agent: agent.to_string(),
            action: action.into(),
            result: result.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn into_steps(self) -> Vec<ReasoningStep> {
        self.steps
    }
}

// ============================================================================
// Synthesis
// ============================================================================

/// Which synthesis strategy produced an answer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SynthesisMethod {
    #[serde(rename = "generative")]
    Generative,
    #[serde(rename = "rule_based_synthesis")]
    RuleBased,
}

impl SynthesisMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generative => "generative",
            Self::RuleBased => "rule_based_synthesis",
        }
    }
}

impl std::fmt::Display for SynthesisMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one retriever's contribution to a synthesis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SnapshotEntry {
    /// Raw records as received
    Records(Vec<RetrievalRecord>),
    /// Prompt rendering of the records, or a placeholder when none were available
    Rendered(String),
}

/// The data a synthesis was derived from, one entry per retriever.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupportingData {
    pub tabular: SnapshotEntry,
    pub graph: SnapshotEntry,
    pub document: SnapshotEntry,
}

/// Synthesizer output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynthesisResult {
    pub answer: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
    pub method: SynthesisMethod,
    pub supporting_data: SupportingData,
}

// ============================================================================
// Query response
// ============================================================================

/// Raw data attached to a response for traceability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseData {
    pub intent: Intent,
    /// Plan as built by the parser
    pub plan: Vec<StepTag>,
    /// Retrieval steps that actually ran, in order
    pub executed_steps: Vec<StepTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tabular_results: Option<RecordBatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_results: Option<RecordBatch>,
    pub synthesis_method: SynthesisMethod,
    /// What the synthesizer actually saw: raw lists for rule-based answers,
    /// the rendered prompt context for generated ones
    pub supporting_data: SupportingData,
}

/// Final externally visible answer for one query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResponse {
    pub answer: String,
    pub reasoning_trace: Vec<ReasoningStep>,
    /// rig → well → sensor chain from the first graph record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_path: Option<Vec<String>>,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}
